//! # spool-printer
//!
//! ESC/POS receipt printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - `Directive` values and a builder for assembling them
//! - ESC/POS byte encoding of a directive sequence
//! - GBK encoding for Chinese printers
//! - USB (device node), network (TCP port 9100) and serial transports
//!
//! Business logic (WHAT to print) stays in application code:
//! - Invoice rendering → spool-agent
//!
//! ## Example
//!
//! ```ignore
//! use spool_printer::{DeviceSink, DirectiveBuilder, NetworkPrinter};
//!
//! let mut builder = DirectiveBuilder::new(48);
//! builder.center();
//! builder.double_size();
//! builder.line("RECEIPT");
//! builder.reset_size();
//! builder.sep_single();
//! builder.cut();
//! builder.close();
//!
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.submit(&builder.build()).await?;
//! ```

mod directive;
mod encoding;
mod error;
mod escpos;
mod printer;

// Re-exports
pub use directive::{Alignment, Directive, DirectiveBuilder};
pub use encoding::{TextEncoding, pad_column};
pub use error::{PrintError, PrintResult};
pub use escpos::encode;
pub use printer::{
    DeviceConnection, DeviceSink, NetworkPrinter, PrinterConnection, PrinterDevice,
    SerialConnection, SerialPrinter, StreamConnection, UsbPrinter,
};
