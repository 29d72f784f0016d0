//! Device sinks for sending directives to printers
//!
//! Supports:
//! - USB printers through the kernel device node (e.g. `/dev/usb/lp0`)
//! - Network printers (TCP port 9100)
//! - Serial printers
//!
//! Every sink opens a fresh connection per submission and always closes it,
//! whether the write succeeded or not.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serial2_tokio::SerialPort;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

use crate::directive::Directive;
use crate::encoding::TextEncoding;
use crate::error::{PrintError, PrintResult};
use crate::escpos::encode;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// An open handle to a printer
#[allow(async_fn_in_trait)]
pub trait DeviceConnection {
    /// Write raw ESC/POS bytes
    async fn write(&mut self, data: &[u8]) -> PrintResult<()>;

    /// Release the handle
    async fn close(self) -> PrintResult<()>;
}

/// Capability interface for a printer transport
///
/// Implementors provide `open`; `submit` drives a full directive sequence
/// through a fresh connection.
#[allow(async_fn_in_trait)]
pub trait DeviceSink {
    type Connection: DeviceConnection;

    /// Human-readable device description for logs
    fn describe(&self) -> String;

    /// Text encoding for emitted lines
    fn encoding(&self) -> TextEncoding {
        TextEncoding::default()
    }

    /// Open a connection to the device
    async fn open(&self) -> PrintResult<Self::Connection>;

    /// Encode and send a directive sequence
    ///
    /// On a write failure the connection is closed best-effort before the
    /// error is returned. A failing close after a successful write is only
    /// logged.
    async fn submit(&self, directives: &[Directive]) -> PrintResult<()> {
        let data = encode(directives, self.encoding());
        let mut conn = self.open().await?;
        debug!(device = %self.describe(), bytes = data.len(), "Device opened");

        if let Err(e) = conn.write(&data).await {
            if let Err(close_err) = conn.close().await {
                warn!(device = %self.describe(), error = %close_err, "Close after failed write also failed");
            }
            return Err(e);
        }

        if let Err(e) = conn.close().await {
            warn!(device = %self.describe(), error = %e, "Printer close failed");
        }

        info!(device = %self.describe(), bytes = data.len(), "Print data sent");
        Ok(())
    }

    /// Check if the device can currently be opened
    async fn is_online(&self) -> bool {
        match self.open().await {
            Ok(conn) => {
                if let Err(e) = conn.close().await {
                    warn!(device = %self.describe(), error = %e, "Printer close failed");
                }
                true
            }
            Err(e) => {
                warn!(device = %self.describe(), error = %e, "Printer offline");
                false
            }
        }
    }
}

/// Connection over any async byte stream (device file, TCP socket)
#[derive(Debug)]
pub struct StreamConnection<W> {
    stream: W,
}

impl<W> StreamConnection<W> {
    pub fn new(stream: W) -> Self {
        Self { stream }
    }
}

impl<W: AsyncWrite + Unpin> DeviceConnection for StreamConnection<W> {
    async fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn close(mut self) -> PrintResult<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

/// Map an open error on a local device path
fn open_error(path: &Path, e: std::io::Error) -> PrintError {
    match e.kind() {
        ErrorKind::NotFound => PrintError::NotFound(path.display().to_string()),
        _ => PrintError::Io(e),
    }
}

// ============================================================================
// USB
// ============================================================================

/// USB printer exposed by the kernel `usblp` driver
#[derive(Debug, Clone)]
pub struct UsbPrinter {
    path: PathBuf,
    timeout: Duration,
    encoding: TextEncoding,
}

impl UsbPrinter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
            encoding: TextEncoding::default(),
        }
    }

    /// Set open timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeviceSink for UsbPrinter {
    type Connection = StreamConnection<File>;

    fn describe(&self) -> String {
        format!("usb:{}", self.path.display())
    }

    fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn open(&self) -> PrintResult<Self::Connection> {
        let file = tokio::time::timeout(
            self.timeout,
            OpenOptions::new().write(true).open(&self.path),
        )
        .await
        .map_err(|_| PrintError::Timeout(format!("Open timeout: {}", self.path.display())))?
        .map_err(|e| open_error(&self.path, e))?;

        Ok(StreamConnection::new(file))
    }
}

// ============================================================================
// Network
// ============================================================================

/// Network printer (TCP port 9100)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
    encoding: TextEncoding,
}

impl NetworkPrinter {
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        Self::from_addr(&format!("{}:{}", host, port))
    }

    /// Create from a socket address string (e.g., "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {}", addr)))?;

        Ok(Self {
            addr,
            timeout: DEFAULT_TIMEOUT,
            encoding: TextEncoding::default(),
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl DeviceSink for NetworkPrinter {
    type Connection = StreamConnection<TcpStream>;

    fn describe(&self) -> String {
        format!("tcp:{}", self.addr)
    }

    fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[instrument(skip(self), fields(addr = %self.addr))]
    async fn open(&self) -> PrintResult<Self::Connection> {
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        Ok(StreamConnection::new(stream))
    }
}

// ============================================================================
// Serial
// ============================================================================

/// Serial printer (RS-232 or USB-serial adapter)
#[derive(Debug, Clone)]
pub struct SerialPrinter {
    path: PathBuf,
    baud: u32,
    encoding: TextEncoding,
}

impl SerialPrinter {
    pub fn new(path: impl Into<PathBuf>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
            encoding: TextEncoding::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Open serial port
pub struct SerialConnection {
    port: SerialPort,
}

impl DeviceConnection for SerialConnection {
    async fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        let mut written = 0;
        while written < data.len() {
            let n = self.port.write(&data[written..]).await?;
            if n == 0 {
                return Err(PrintError::Io(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "serial port accepted no data",
                )));
            }
            written += n;
        }
        Ok(())
    }

    async fn close(self) -> PrintResult<()> {
        drop(self.port);
        Ok(())
    }
}

impl DeviceSink for SerialPrinter {
    type Connection = SerialConnection;

    fn describe(&self) -> String {
        format!("serial:{}@{}", self.path.display(), self.baud)
    }

    fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[instrument(skip(self), fields(path = %self.path.display(), baud = self.baud))]
    async fn open(&self) -> PrintResult<Self::Connection> {
        let port = SerialPort::open(&self.path, self.baud).map_err(|e| open_error(&self.path, e))?;
        Ok(SerialConnection { port })
    }
}

// ============================================================================
// Selection by configuration
// ============================================================================

/// Printer transport chosen at startup
#[derive(Debug, Clone)]
pub enum PrinterDevice {
    Usb(UsbPrinter),
    Network(NetworkPrinter),
    Serial(SerialPrinter),
}

/// Connection for whichever transport [`PrinterDevice`] selected
pub enum PrinterConnection {
    Usb(StreamConnection<File>),
    Network(StreamConnection<TcpStream>),
    Serial(SerialConnection),
}

impl DeviceConnection for PrinterConnection {
    async fn write(&mut self, data: &[u8]) -> PrintResult<()> {
        match self {
            Self::Usb(conn) => conn.write(data).await,
            Self::Network(conn) => conn.write(data).await,
            Self::Serial(conn) => conn.write(data).await,
        }
    }

    async fn close(self) -> PrintResult<()> {
        match self {
            Self::Usb(conn) => conn.close().await,
            Self::Network(conn) => conn.close().await,
            Self::Serial(conn) => conn.close().await,
        }
    }
}

impl DeviceSink for PrinterDevice {
    type Connection = PrinterConnection;

    fn describe(&self) -> String {
        match self {
            Self::Usb(p) => p.describe(),
            Self::Network(p) => p.describe(),
            Self::Serial(p) => p.describe(),
        }
    }

    fn encoding(&self) -> TextEncoding {
        match self {
            Self::Usb(p) => p.encoding(),
            Self::Network(p) => p.encoding(),
            Self::Serial(p) => p.encoding(),
        }
    }

    async fn open(&self) -> PrintResult<Self::Connection> {
        match self {
            Self::Usb(p) => p.open().await.map(PrinterConnection::Usb),
            Self::Network(p) => p.open().await.map(PrinterConnection::Network),
            Self::Serial(p) => p.open().await.map(PrinterConnection::Serial),
        }
    }
}
