use log::{debug, warn};
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A single accepted connection, read one byte at a time.
///
/// This mirrors the transport the portal was written against: bytes arrive
/// opportunistically with no buffering primitive, so callers poll
/// [`byte_available`](Connection::byte_available) and retry. Writes are
/// best-effort; the portal never inspects write outcomes.
pub trait Connection {
    /// Returns `true` when at least one byte can be read without blocking.
    fn byte_available(&mut self) -> bool;

    /// Read one byte if available, `None` otherwise.
    fn read_byte(&mut self) -> Option<u8>;

    /// Returns `false` once the peer has disconnected.
    fn is_connected(&self) -> bool;

    /// Write bytes to the peer, best-effort.
    fn write_all(&mut self, data: &[u8]);

    /// Release the connection.
    fn close(&mut self);
}

/// A polled accept source producing [`Connection`]s one at a time.
pub trait Listener {
    type Conn: Connection;

    /// Accept a pending connection if one is waiting, `None` otherwise.
    fn poll_accept(&mut self) -> Option<Self::Conn>;
}

// ---------------------------------------------------------------------------
// TCP adapter
// ---------------------------------------------------------------------------

/// Non-blocking TCP listener adapted to the [`Listener`] polling interface.
pub struct TcpPortalListener {
    inner: TcpListener,
}

impl TcpPortalListener {
    /// Bind a listener and switch it to non-blocking accepts.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if binding or configuring fails.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let inner = TcpListener::bind(addr)?;
        inner.set_nonblocking(true)?;
        Ok(Self { inner })
    }

    /// The local address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.inner.local_addr()
    }
}

impl Listener for TcpPortalListener {
    type Conn = TcpConnection;

    fn poll_accept(&mut self) -> Option<TcpConnection> {
        match self.inner.accept() {
            Ok((stream, peer)) => {
                debug!("accepted connection from {peer}");
                match TcpConnection::new(stream) {
                    Ok(conn) => Some(conn),
                    Err(e) => {
                        warn!("failed to configure accepted socket: {e}");
                        None
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => None,
            Err(e) => {
                warn!("accept failed: {e}");
                None
            }
        }
    }
}

/// A non-blocking TCP stream adapted to the [`Connection`] polling interface.
///
/// `byte_available` performs the actual read and stashes the byte, so a
/// subsequent `read_byte` never blocks.
pub struct TcpConnection {
    stream: TcpStream,
    stashed: Option<u8>,
    closed: bool,
}

impl TcpConnection {
    /// Wrap a stream, switching it to non-blocking reads.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the mode change fails.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self {
            stream,
            stashed: None,
            closed: false,
        })
    }
}

impl Connection for TcpConnection {
    fn byte_available(&mut self) -> bool {
        if self.stashed.is_some() {
            return true;
        }
        if self.closed {
            return false;
        }
        let mut buf = [0u8; 1];
        match self.stream.read(&mut buf) {
            Ok(0) => {
                self.closed = true;
                false
            }
            Ok(_) => {
                self.stashed = Some(buf[0]);
                true
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => false,
            Err(e) => {
                debug!("read failed, dropping connection: {e}");
                self.closed = true;
                false
            }
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.byte_available() {
            self.stashed.take()
        } else {
            None
        }
    }

    fn is_connected(&self) -> bool {
        !self.closed
    }

    fn write_all(&mut self, data: &[u8]) {
        if self.closed {
            return;
        }
        // Writes on a non-blocking socket can hit WouldBlock under
        // backpressure; the response is tiny, so retry until it drains.
        let mut offset = 0;
        while offset < data.len() {
            match self.stream.write(&data[offset..]) {
                Ok(0) => {
                    self.closed = true;
                    return;
                }
                Ok(n) => offset += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(std::time::Duration::from_millis(1));
                }
                Err(e) => {
                    warn!("write failed: {e}");
                    self.closed = true;
                    return;
                }
            }
        }
    }

    fn close(&mut self) {
        self.stream.shutdown(Shutdown::Both).ok();
        self.closed = true;
    }
}
