//! Printer directives
//!
//! A `Directive` is one atomic printer instruction. Renderers assemble an
//! ordered `Vec<Directive>` with [`DirectiveBuilder`]; device sinks interpret
//! that sequence against a live transport.

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

/// One atomic printer instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Set alignment for subsequent lines
    Align(Alignment),
    /// Turn emphasis (bold) on or off
    Emphasis(bool),
    /// Character scale, 1 = normal, 2 = double width and height
    Size(u8),
    /// A single line of text
    Text(String),
    /// Feed n blank lines
    Feed(u8),
    /// Full paper cut
    Cut,
    /// End of the print stream; the sink closes the device here
    Close,
}

/// Builder that appends directives in order
///
/// Produces immutable values instead of bytes; [`crate::encode`] turns
/// them into ESC/POS for a device.
#[derive(Debug, Clone)]
pub struct DirectiveBuilder {
    directives: Vec<Directive>,
    width: usize,
}

impl DirectiveBuilder {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        Self {
            directives: Vec::with_capacity(64),
            width,
        }
    }

    fn push(&mut self, directive: Directive) -> &mut Self {
        self.directives.push(directive);
        self
    }

    // === Text Output ===

    /// Emit one line of text
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.push(Directive::Text(s.to_string()))
    }

    /// Feed n lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.push(Directive::Feed(lines))
    }

    // === Alignment ===

    pub fn center(&mut self) -> &mut Self {
        self.push(Directive::Align(Alignment::Center))
    }

    pub fn left(&mut self) -> &mut Self {
        self.push(Directive::Align(Alignment::Left))
    }

    // === Text Style ===

    pub fn bold(&mut self) -> &mut Self {
        self.push(Directive::Emphasis(true))
    }

    pub fn bold_off(&mut self) -> &mut Self {
        self.push(Directive::Emphasis(false))
    }

    /// Set character scale (1-8)
    pub fn size(&mut self, scale: u8) -> &mut Self {
        self.push(Directive::Size(scale.clamp(1, 8)))
    }

    /// Double width and height
    pub fn double_size(&mut self) -> &mut Self {
        self.size(2)
    }

    /// Reset to normal size
    pub fn reset_size(&mut self) -> &mut Self {
        self.size(1)
    }

    // === Separators ===

    /// Print a line of '-' characters
    pub fn sep_single(&mut self) -> &mut Self {
        let rule = "-".repeat(self.width);
        self.push(Directive::Text(rule))
    }

    // === Paper Control ===

    pub fn cut(&mut self) -> &mut Self {
        self.push(Directive::Cut)
    }

    pub fn close(&mut self) -> &mut Self {
        self.push(Directive::Close)
    }

    // === Build ===

    pub fn build(self) -> Vec<Directive> {
        self.directives
    }
}

impl Default for DirectiveBuilder {
    fn default() -> Self {
        Self::new(48)
    }
}
