//! # Sockets TCP Bloqueantes
//! src/net/socket.rs
//!
//! Dos variantes de handle:
//! - [`Listener`]: socket de escucha con backlog y un timeout de recepción
//!   corto, para que `accept` no bloquee indefinidamente y el hilo que escucha
//!   pueda revisar la señal de apagado.
//! - [`Connection`]: una conexión aceptada, legible/escribible hasta `close`.
//!
//! Las lecturas son byte a byte sobre un `BufReader`, así que un request
//! nunca consume bytes del siguiente en la misma conexión (keep-alive).

use crate::buffer::Buffer;
use crate::error::{Result, ServerError};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Socket de escucha
#[derive(Debug)]
pub struct Listener {
    socket: Option<Socket>,
    addr: SocketAddr,
    backlog: i32,
    accept_timeout: Duration,
}

impl Listener {
    /// Resuelve `host:port` (IPv4), crea el socket, lo bindea y le aplica el
    /// timeout de recepción. No lo pone en modo escucha: ver [`Listener::open`].
    pub fn bind(host: &str, port: u16, backlog: i32, accept_timeout: Duration) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|_| ServerError::AddrResolve(format!("{}:{}", host, port)))?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| ServerError::AddrResolve(format!("{}:{}", host, port)))?;

        let bind_err = |source: io::Error| ServerError::Bind {
            addr: addr.to_string(),
            source,
        };

        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).map_err(bind_err)?;
        socket.set_reuse_address(true).map_err(bind_err)?;
        socket.bind(&addr.into()).map_err(bind_err)?;
        socket.set_read_timeout(Some(accept_timeout)).map_err(bind_err)?;

        Ok(Self {
            socket: Some(socket),
            addr,
            backlog,
            accept_timeout,
        })
    }

    /// Pasa el socket a modo escucha
    pub fn open(&self) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(ServerError::ConnectionClosed)?;

        socket.listen(self.backlog).map_err(|source| ServerError::Bind {
            addr: self.addr.to_string(),
            source,
        })
    }

    /// Espera una conexión hasta que venza el timeout de recepción.
    ///
    /// Un error aquí no es fatal: el llamador reintenta. `WouldBlock` y
    /// `TimedOut` solo indican que no llegó nadie a tiempo.
    pub fn accept(&self) -> io::Result<Connection> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "listener closed"))?;

        let (conn, peer) = socket.accept()?;
        Connection::from_stream(conn.into(), peer.as_socket())
    }

    /// Dirección local efectiva (útil con el puerto 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        let socket = self.socket.as_ref().ok_or(ServerError::ConnectionClosed)?;

        socket
            .local_addr()?
            .as_socket()
            .ok_or_else(|| ServerError::AddrResolve(self.addr.to_string()))
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    pub fn accept_timeout(&self) -> Duration {
        self.accept_timeout
    }

    /// Cierra el socket. Idempotente.
    pub fn close(&mut self) {
        self.socket.take();
    }
}

/// Indica si un error de `accept` es solo el timeout de recepción
pub fn is_accept_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

/// Conexión aceptada
#[derive(Debug)]
pub struct Connection {
    reader: BufReader<TcpStream>,
    peer: Option<SocketAddr>,
    closed: bool,
}

impl Connection {
    /// Envuelve un stream aceptado. Las lecturas en conexiones establecidas
    /// no tienen timeout salvo que se configure con [`Connection::set_read_timeout`].
    pub fn from_stream(stream: TcpStream, peer: Option<SocketAddr>) -> io::Result<Self> {
        stream.set_read_timeout(None)?;

        Ok(Self {
            reader: BufReader::new(stream),
            peer,
            closed: false,
        })
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn read_byte(&mut self) -> Result<u8> {
        if self.closed {
            return Err(ServerError::ConnectionClosed);
        }

        let mut byte = [0u8; 1];

        match self.reader.read_exact(&mut byte) {
            Ok(()) => Ok(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(ServerError::ConnectionClosed),
            Err(e) => Err(e.into()),
        }
    }

    /// Lee una línea hasta `delim` (o LF) hacia `dst`.
    ///
    /// Los CR se descartan sin guardarse. Al terminar se agrega un NUL a
    /// `dst` como terminador. Si `dst` se llena antes de ver el fin de línea
    /// retorna [`ServerError::LineTooLong`].
    pub fn read_line(&mut self, delim: u8, dst: &mut Buffer) -> Result<()> {
        loop {
            let byte = self.read_byte()?;

            if byte == CR {
                continue;
            }

            let pushed = if byte == delim || byte == LF {
                dst.put(0).map(|_| true)
            } else {
                dst.put(byte).map(|_| false)
            };

            match pushed {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(_) => return Err(ServerError::LineTooLong(dst.capacity())),
            }
        }
    }

    /// Lee exactamente `count` bytes hacia `dst`
    pub fn read_blob(&mut self, count: usize, dst: &mut Buffer) -> Result<()> {
        for _ in 0..count {
            let byte = self.read_byte()?;
            dst.put(byte)?;
        }

        Ok(())
    }

    /// Escribe exactamente `count` bytes desde el inicio de `src`,
    /// reintentando envíos parciales hasta terminar o fallar.
    pub fn write_blob(&mut self, count: usize, src: &Buffer) -> Result<()> {
        if self.closed {
            return Err(ServerError::ConnectionClosed);
        }

        let pending = src.as_slice().get(..count).ok_or(crate::buffer::BufferError::Insufficient)?;
        let stream = self.reader.get_mut();
        let mut sent = 0;

        while sent < pending.len() {
            match stream.write(&pending[sent..]) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero).into()),
                Ok(n) => sent += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        stream.flush()?;
        Ok(())
    }

    /// Cierra la conexión. Idempotente.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }

        let _ = self.reader.get_ref().shutdown(Shutdown::Both);
        self.closed = true;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::connected_pair;
    use std::thread;

    #[test]
    fn test_read_line_skips_cr_and_appends_nul() {
        let (mut conn, mut client) = connected_pair();
        client.write_all(b"GET /x\r\n").unwrap();

        let mut buf = Buffer::new(32);
        conn.read_line(b' ', &mut buf).unwrap();
        assert_eq!(buf.as_slice(), b"GET\0");

        buf.clear();
        conn.read_line(b' ', &mut buf).unwrap();
        // LF también termina la línea
        assert_eq!(buf.as_slice(), b"/x\0");
    }

    #[test]
    fn test_read_line_fails_on_eof() {
        let (mut conn, client) = connected_pair();
        drop(client);

        let mut buf = Buffer::new(32);
        assert!(matches!(
            conn.read_line(b'\n', &mut buf),
            Err(ServerError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_read_line_too_long() {
        let (mut conn, mut client) = connected_pair();
        client.write_all(b"abcdefgh\n").unwrap();

        let mut buf = Buffer::new(4);
        assert!(matches!(
            conn.read_line(b'\n', &mut buf),
            Err(ServerError::LineTooLong(4))
        ));
    }

    #[test]
    fn test_read_blob_exact() {
        let (mut conn, mut client) = connected_pair();
        client.write_all(b"hello!!").unwrap();

        let mut buf = Buffer::new(16);
        conn.read_blob(5, &mut buf).unwrap();
        assert_eq!(buf.as_slice(), b"hello");
    }

    #[test]
    fn test_read_blob_fails_if_peer_closes_early() {
        let (mut conn, mut client) = connected_pair();
        client.write_all(b"hi").unwrap();
        drop(client);

        let mut buf = Buffer::new(16);
        assert!(conn.read_blob(5, &mut buf).is_err());
    }

    #[test]
    fn test_write_blob_sends_prefix() {
        let (mut conn, mut client) = connected_pair();

        let mut src = Buffer::new(16);
        src.put_span(b"response").unwrap();

        let writer = thread::spawn(move || {
            conn.write_blob(4, &src).unwrap();
            conn.close();
        });

        let mut received = Vec::new();
        client.read_to_end(&mut received).unwrap();
        writer.join().unwrap();

        assert_eq!(received, b"resp");
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut conn, _client) = connected_pair();
        conn.close();
        conn.close();
        assert!(conn.is_closed());

        let src = Buffer::new(4);
        assert!(conn.write_blob(0, &src).is_err());
    }

    #[test]
    fn test_listener_accept_times_out() {
        let listener = Listener::bind("127.0.0.1", 0, 4, Duration::from_millis(5)).unwrap();
        listener.open().unwrap();

        let err = listener.accept().unwrap_err();
        assert!(is_accept_timeout(&err), "unexpected error kind: {:?}", err.kind());
    }

    #[test]
    fn test_listener_accepts_and_closes() {
        let mut listener = Listener::bind("127.0.0.1", 0, 4, Duration::from_millis(200)).unwrap();
        listener.open().unwrap();
        let addr = listener.local_addr().unwrap();

        let _client = TcpStream::connect(addr).unwrap();
        let conn = listener.accept().unwrap();
        assert!(conn.peer().is_some());

        listener.close();
        listener.close();
        assert!(listener.is_closed());
        assert!(listener.accept().is_err());
    }
}
