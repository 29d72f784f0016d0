//! ESC/POS command builder
//!
//! Translates directives into the ESC/POS byte stream understood by
//! thermal receipt printers.

use crate::directive::{Alignment, Directive};
use crate::encoding::{TextEncoding, convert_to_gbk};

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers.
/// Text is accumulated as UTF-8 and converted at [`build`](Self::build)
/// according to the configured [`TextEncoding`].
pub(crate) struct EscPosBuilder {
    buf: Vec<u8>,
    encoding: TextEncoding,
}

impl EscPosBuilder {
    pub fn new(encoding: TextEncoding) -> Self {
        let mut buf = Vec::with_capacity(4096);
        // Initialize printer (ESC @)
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self { buf, encoding }
    }

    // === Text Output ===

    /// Write text followed by newline
    ///
    /// Control characters are dropped so payload text cannot inject commands.
    pub fn line(&mut self, s: &str) -> &mut Self {
        for c in s.chars().filter(|c| !c.is_control()) {
            let mut utf8 = [0u8; 4];
            self.buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        }
        self.buf.push(b'\n');
        self
    }

    /// Print and feed n lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        // ESC d n
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Alignment ===

    pub fn align(&mut self, alignment: Alignment) -> &mut Self {
        let n = match alignment {
            Alignment::Left => 0x00,
            Alignment::Center => 0x01,
        };
        // ESC a n
        self.buf.extend_from_slice(&[0x1B, 0x61, n]);
        self
    }

    // === Text Style ===

    pub fn bold(&mut self, on: bool) -> &mut Self {
        // ESC E n
        self.buf.extend_from_slice(&[0x1B, 0x45, u8::from(on)]);
        self
    }

    /// Set character size, 1 = normal, up to 8x in both directions
    pub fn size(&mut self, scale: u8) -> &mut Self {
        let m = scale.clamp(1, 8) - 1;
        // GS ! n - high nibble width, low nibble height
        self.buf.extend_from_slice(&[0x1D, 0x21, (m << 4) | m]);
        self
    }

    // === Paper Control ===

    /// Cut paper (full cut)
    pub fn cut(&mut self) -> &mut Self {
        // GS V 0
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    /// Append the bytes for one directive
    ///
    /// `Close` has no byte representation; the sink handles it.
    pub fn apply(&mut self, directive: &Directive) -> &mut Self {
        match directive {
            Directive::Align(alignment) => self.align(*alignment),
            Directive::Emphasis(on) => self.bold(*on),
            Directive::Size(scale) => self.size(*scale),
            Directive::Text(text) => self.line(text),
            Directive::Feed(lines) => self.feed(*lines),
            Directive::Cut => self.cut(),
            Directive::Close => self,
        }
    }

    // === Build ===

    /// Build the final byte buffer in the configured encoding
    pub fn build(self) -> Vec<u8> {
        match self.encoding {
            TextEncoding::Gbk => convert_to_gbk(&self.buf),
            TextEncoding::Utf8 => self.buf,
        }
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(TextEncoding::default())
    }
}

/// Encode a directive sequence up to (not including) the first `Close`
pub fn encode(directives: &[Directive], encoding: TextEncoding) -> Vec<u8> {
    let mut builder = EscPosBuilder::new(encoding);
    for directive in directives
        .iter()
        .take_while(|d| !matches!(d, Directive::Close))
    {
        builder.apply(directive);
    }
    builder.build()
}
