//! Text encoding and column utilities
//!
//! Most thermal printers sold with Chinese firmware expect GBK text.
//! This module provides utilities for:
//! - Selecting the text encoding sent to the device
//! - Converting UTF-8 to GBK while preserving ESC/POS commands
//! - Padding/truncating strings to fixed character columns

use std::str::FromStr;

use tracing::instrument;

use crate::error::PrintError;

/// Text encoding used for the bytes sent to the printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// GBK with Chinese mode enabled
    #[default]
    Gbk,
    /// Raw UTF-8, for printers with a UTF-8 code page
    Utf8,
}

impl FromStr for TextEncoding {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gbk" | "gb18030" => Ok(Self::Gbk),
            "utf8" | "utf-8" => Ok(Self::Utf8),
            other => Err(PrintError::InvalidConfig(format!(
                "Unknown text encoding: {}",
                other
            ))),
        }
    }
}

/// Truncate a string to at most `width` characters
fn truncate_column(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Pad a string with trailing spaces to exactly `width` characters
///
/// If the string is at or beyond the width, it is truncated; it never wraps.
pub fn pad_column(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return truncate_column(s, width);
    }
    format!("{}{}", s, " ".repeat(width - len))
}

/// Convert mixed UTF-8 content (with ESC/POS commands) to GBK
///
/// This function preserves ASCII bytes (0x00-0x7F) exactly as is,
/// which protects ESC/POS commands from being corrupted.
/// Only bytes >= 0x80 are treated as UTF-8 sequences and converted to GBK.
///
/// Chinese mode is re-enabled after every INIT command (ESC @).
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub(crate) fn convert_to_gbk(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len() * 2);

    // FS & - Enable Chinese mode, FS C 1 - Select GBK code page
    result.extend_from_slice(&[0x1C, 0x26, 0x1C, 0x43, 0x01]);

    let mut buffer = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b == 0x1B && i + 1 < bytes.len() && bytes[i + 1] == 0x40 {
            flush_buffer(&mut buffer, &mut result);

            result.extend_from_slice(&[0x1B, 0x40]);
            result.extend_from_slice(&[0x1C, 0x26]);

            i += 2;
            continue;
        }

        if b < 128 {
            flush_buffer(&mut buffer, &mut result);
            result.push(b);
        } else {
            buffer.push(b);
        }
        i += 1;
    }

    flush_buffer(&mut buffer, &mut result);

    // FS . - Exit Chinese mode
    result.extend_from_slice(&[0x1C, 0x2E]);

    result
}

/// Flush the non-ASCII buffer, converting UTF-8 to GBK
fn flush_buffer(buffer: &mut Vec<u8>, result: &mut Vec<u8>) {
    if buffer.is_empty() {
        return;
    }

    let s = String::from_utf8_lossy(buffer);
    let (gbk, _, _) = encoding_rs::GBK.encode(&s);
    result.extend_from_slice(&gbk);
    buffer.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_column_short() {
        let padded = pad_column("Apple", 18);
        assert_eq!(padded.chars().count(), 18);
        assert_eq!(padded, "Apple             ");
    }

    #[test]
    fn test_pad_column_truncates() {
        let name = "A very long product name!";
        assert_eq!(name.len(), 25);

        let padded = pad_column(name, 18);
        assert_eq!(padded, "A very long produc");
        assert_eq!(padded.chars().count(), 18);
    }

    #[test]
    fn test_pad_column_exact() {
        assert_eq!(pad_column("1234", 4), "1234");
    }

    #[test]
    fn test_pad_column_counts_chars() {
        assert_eq!(pad_column("茶", 3), "茶  ");
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("GBK".parse::<TextEncoding>().unwrap(), TextEncoding::Gbk);
        assert_eq!("utf-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert!("latin1".parse::<TextEncoding>().is_err());
    }

    #[test]
    fn test_convert_to_gbk_keeps_ascii() {
        let out = convert_to_gbk(b"\x1B\x40Tea\n");
        // Chinese mode prefix, INIT, re-enable, text, exit
        assert_eq!(&out[..5], &[0x1C, 0x26, 0x1C, 0x43, 0x01]);
        assert_eq!(&out[5..9], &[0x1B, 0x40, 0x1C, 0x26]);
        assert_eq!(&out[9..13], b"Tea\n");
        assert_eq!(&out[13..], &[0x1C, 0x2E]);
    }

    #[test]
    fn test_convert_to_gbk_encodes_chinese() {
        let out = convert_to_gbk("茶".as_bytes());
        let (expected, _, _) = encoding_rs::GBK.encode("茶");
        assert_eq!(&out[5..5 + expected.len()], expected.as_ref());
    }
}
