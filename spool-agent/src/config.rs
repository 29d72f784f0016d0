//! Agent configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | PRINTER_ID | required | printer identifier the queue assigns jobs to |
//! | QUEUE_BASE_URL | required | queue base URL |
//! | PRINTER_KEY | required | static credential sent as `X-Printer-Key` |
//! | POLL_INTERVAL_MS | 5000 | poll cadence |
//! | MAX_RETRIES | 3 | print attempts per job |
//! | RETRY_DELAY_MS | 2000 | delay between attempts |
//! | RETRY_BACKOFF | fixed | `fixed` or `exponential` |
//! | RETRY_MAX_DELAY_MS | 30000 | cap for exponential backoff |
//! | REQUEST_TIMEOUT_MS | 10000 | timeout for queue requests |
//! | PRINTER_DEVICE | usb | `usb`, `network` or `serial` |
//! | PRINTER_USB_PATH | /dev/usb/lp0 | USB printer device node |
//! | PRINTER_ADDR | - | `host:port`, required for `network` |
//! | PRINTER_SERIAL_PATH | /dev/ttyUSB0 | serial port |
//! | PRINTER_SERIAL_BAUD | 9600 | serial baud rate |
//! | PRINTER_ENCODING | gbk | `gbk` or `utf8` |
//! | PRINTER_PAPER_WIDTH | 48 | separator width in characters |
//! | LOG_LEVEL | info | default log level (`RUST_LOG` overrides) |
//! | LOG_JSON | false | JSON log lines instead of plain text |
//! | LOG_DIR | - | directory for the info/error log files |
//!
//! # Example
//!
//! ```ignore
//! PRINTER_ID=front-desk QUEUE_BASE_URL=https://erp.example.com/api PRINTER_KEY=secret spool-agent
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use spool_printer::{NetworkPrinter, PrinterDevice, SerialPrinter, TextEncoding, UsbPrinter};

use crate::error::ConfigError;
use crate::printing::{Backoff, RetryPolicy};

const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10000;
const DEFAULT_USB_PATH: &str = "/dev/usb/lp0";
const DEFAULT_SERIAL_PATH: &str = "/dev/ttyUSB0";
const DEFAULT_SERIAL_BAUD: u32 = 9600;
const DEFAULT_PAPER_WIDTH: usize = 48;

/// Delay growth between print attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffMode {
    #[default]
    Fixed,
    Exponential,
}

/// Which transport the printer is attached through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceConfig {
    Usb { path: PathBuf },
    Network { addr: String },
    Serial { path: PathBuf, baud: u32 },
}

/// Agent configuration, built once at startup and passed to each component
#[derive(Clone)]
pub struct AgentConfig {
    pub printer_id: String,
    pub base_url: String,
    pub credential: String,
    pub poll_interval_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub retry_backoff: BackoffMode,
    pub retry_max_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub device: DeviceConfig,
    pub encoding: TextEncoding,
    pub paper_width: usize,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let max_retries = parse_or(get("MAX_RETRIES"), "MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        if max_retries == 0 {
            return Err(invalid("MAX_RETRIES", "0"));
        }

        let poll_interval_ms = parse_or(
            get("POLL_INTERVAL_MS"),
            "POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        if poll_interval_ms == 0 {
            return Err(invalid("POLL_INTERVAL_MS", "0"));
        }

        let paper_width = parse_or(
            get("PRINTER_PAPER_WIDTH"),
            "PRINTER_PAPER_WIDTH",
            DEFAULT_PAPER_WIDTH,
        )?;
        if paper_width == 0 {
            return Err(invalid("PRINTER_PAPER_WIDTH", "0"));
        }

        let retry_backoff = match get("RETRY_BACKOFF").as_deref() {
            None | Some("fixed") => BackoffMode::Fixed,
            Some("exponential") => BackoffMode::Exponential,
            Some(other) => return Err(invalid("RETRY_BACKOFF", other)),
        };

        let device = match get("PRINTER_DEVICE").as_deref() {
            None | Some("usb") => DeviceConfig::Usb {
                path: get("PRINTER_USB_PATH")
                    .unwrap_or_else(|| DEFAULT_USB_PATH.into())
                    .into(),
            },
            Some("network") => DeviceConfig::Network {
                addr: required("PRINTER_ADDR")?,
            },
            Some("serial") => DeviceConfig::Serial {
                path: get("PRINTER_SERIAL_PATH")
                    .unwrap_or_else(|| DEFAULT_SERIAL_PATH.into())
                    .into(),
                baud: parse_or(
                    get("PRINTER_SERIAL_BAUD"),
                    "PRINTER_SERIAL_BAUD",
                    DEFAULT_SERIAL_BAUD,
                )?,
            },
            Some(other) => return Err(invalid("PRINTER_DEVICE", other)),
        };

        let encoding = match get("PRINTER_ENCODING") {
            Some(value) => value
                .parse()
                .map_err(|_| invalid("PRINTER_ENCODING", &value))?,
            None => TextEncoding::default(),
        };

        Ok(Self {
            printer_id: required("PRINTER_ID")?,
            base_url: required("QUEUE_BASE_URL")?,
            credential: required("PRINTER_KEY")?,
            poll_interval_ms,
            max_retries,
            retry_delay_ms: parse_or(
                get("RETRY_DELAY_MS"),
                "RETRY_DELAY_MS",
                DEFAULT_RETRY_DELAY_MS,
            )?,
            retry_backoff,
            retry_max_delay_ms: parse_or(
                get("RETRY_MAX_DELAY_MS"),
                "RETRY_MAX_DELAY_MS",
                DEFAULT_RETRY_MAX_DELAY_MS,
            )?,
            request_timeout_ms: parse_or(
                get("REQUEST_TIMEOUT_MS"),
                "REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )?,
            device,
            encoding,
            paper_width,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parse_or(get("LOG_JSON"), "LOG_JSON", false)?,
            log_dir: get("LOG_DIR").map(PathBuf::from),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.retry_delay_ms);
        let backoff = match self.retry_backoff {
            BackoffMode::Fixed => Backoff::Fixed,
            BackoffMode::Exponential => Backoff::Exponential {
                max: Duration::from_millis(self.retry_max_delay_ms),
            },
        };
        RetryPolicy::new(self.max_retries, delay).with_backoff(backoff)
    }

    /// Build the configured printer transport
    pub fn printer_device(&self) -> Result<PrinterDevice, ConfigError> {
        let device = match &self.device {
            DeviceConfig::Usb { path } => {
                PrinterDevice::Usb(UsbPrinter::new(path).with_encoding(self.encoding))
            }
            DeviceConfig::Network { addr } => PrinterDevice::Network(
                NetworkPrinter::from_addr(addr)
                    .map_err(|_| invalid("PRINTER_ADDR", addr))?
                    .with_encoding(self.encoding),
            ),
            DeviceConfig::Serial { path, baud } => PrinterDevice::Serial(
                SerialPrinter::new(path, *baud).with_encoding(self.encoding),
            ),
        };
        Ok(device)
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("printer_id", &self.printer_id)
            .field("base_url", &self.base_url)
            .field("credential", &"<redacted>")
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("retry_backoff", &self.retry_backoff)
            .field("retry_max_delay_ms", &self.retry_max_delay_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("device", &self.device)
            .field("encoding", &self.encoding)
            .field("paper_width", &self.paper_width)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| invalid(key, &v)),
        None => Ok(default),
    }
}
