//! TCP collector stream adapter.
//!
//! [`StreamPort`] over `std::net::TcpStream`. The acknowledgment poll in
//! the sender needs a non-blocking availability probe, which TCP does not
//! expose portably — a non-blocking one-byte `peek` stands in for it:
//! `WouldBlock` means nothing readable yet, a zero-length peek means the
//! peer closed.
//!
//! A socket that errors on any operation is dropped on the spot; the
//! link supervisor sees `is_connected() == false` at the next cycle and
//! drives the reconnect.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use log::{info, warn};

use crate::app::ports::StreamPort;
use crate::error::StreamError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Stream adapter for the central collector.
pub struct TcpStreamAdapter {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
}

impl TcpStreamAdapter {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            stream: None,
        }
    }

    fn drop_socket(&mut self, why: &str) {
        if self.stream.take().is_some() {
            warn!("collector socket dropped: {why}");
        }
    }

    /// Non-blocking one-byte peek. `Ok(true)` = data readable now.
    fn peek_readable(stream: &TcpStream) -> std::io::Result<bool> {
        stream.set_nonblocking(true)?;
        let mut probe = [0u8; 1];
        let result = match stream.peek(&mut probe) {
            Ok(0) => Err(std::io::Error::from(ErrorKind::UnexpectedEof)),
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(e),
        };
        stream.set_nonblocking(false)?;
        result
    }
}

impl StreamPort for TcpStreamAdapter {
    fn connect(&mut self) -> bool {
        self.stream = None;
        let addrs = match std::net::ToSocketAddrs::to_socket_addrs(&(self.host.as_str(), self.port))
        {
            Ok(addrs) => addrs,
            Err(e) => {
                warn!("collector address resolution failed: {e}");
                return false;
            }
        };
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    let _ = stream.set_nodelay(true);
                    info!("connected to collector at {addr}");
                    self.stream = Some(stream);
                    return true;
                }
                Err(e) => warn!("collector connect to {addr} failed: {e}"),
            }
        }
        false
    }

    fn is_connected(&self) -> bool {
        let Some(stream) = &self.stream else {
            return false;
        };
        // A closed peer surfaces as EOF on the probe; anything pending or
        // merely quiet counts as alive.
        Self::peek_readable(stream).is_ok()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StreamError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(StreamError::NotConnected);
        };
        if let Err(e) = stream.write_all(data) {
            self.drop_socket(&format!("write failed: {e}"));
            return Err(StreamError::Io);
        }
        Ok(())
    }

    fn bytes_available(&self) -> usize {
        let Some(stream) = &self.stream else {
            return 0;
        };
        match Self::peek_readable(stream) {
            Ok(true) => 1,
            _ => 0,
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), StreamError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(StreamError::NotConnected);
        };
        if let Err(e) = stream.read_exact(buf) {
            self.drop_socket(&format!("read failed: {e}"));
            return Err(StreamError::Io);
        }
        Ok(())
    }
}
