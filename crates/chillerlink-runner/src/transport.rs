//! Byte transports for the unit's serial and network feeds.
//!
//! The core crates never touch I/O; everything they need from the link is
//! behind [`Transport`]. A read timeout is reported as zero bytes read —
//! "nothing this tick" — not as an error.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::RunnerError;

/// A byte source and sink for one polling loop.
pub trait Transport {
    /// Read whatever is available, up to `buf.len()` bytes. Returns 0 when
    /// nothing arrived within the transport's timeout.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write the full buffer.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_available(buf)
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).send(bytes)
    }
}

/// The unit's UART link (9600 8N1 by default).
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open a serial device with the given read timeout.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self, RunnerError> {
        let port = serialport::new(path, baud).timeout(timeout).open()?;
        tracing::info!(path, baud, "serial port open");
        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }
}

/// The network status feed (a TCP stream of long-status frames).
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `host:port` with the given read timeout.
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self, RunnerError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(timeout))?;
        tracing::info!(addr, "connected");
        Ok(TcpTransport { stream })
    }
}

impl Transport for TcpTransport {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.read(buf) {
            // A TCP read of zero bytes means the peer closed the feed.
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by peer",
            )),
            Ok(n) => Ok(n),
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)
    }
}
