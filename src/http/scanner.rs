//! # Scanner de Requests HTTP/1.x
//! src/http/scanner.rs
//!
//! Parser incremental basado en una máquina de estados. Cada estado lee un
//! token de la conexión hacia un buffer interno y llena un campo del
//! [`Request`]:
//!
//! ```text
//! Start → EatMethod → EatUrl → EatSchema → EatHeader ─┬→ EatBlob → Stop
//!                                            ↺        └→ Stop
//! (cualquier falla de lectura) → Error
//! ```

use super::{Method, Request, Schema};
use crate::buffer::{Buffer, MIN_BUFFER_SIZE};
use crate::error::{Result, ServerError};
use crate::net::Connection;

const SP: u8 = b' ';
const LF: u8 = b'\n';
const NUL: u8 = 0;

/// Estados del scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Start,
    EatMethod,
    EatUrl,
    EatSchema,
    EatHeader,
    EatBlob,
    Stop,
    Error,
}

/// Scanner de requests, reutilizable entre ciclos de keep-alive
#[derive(Debug)]
pub struct Scanner {
    state: ScanState,
    header_buf: Buffer,
    body_buf: Buffer,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_capacity(MIN_BUFFER_SIZE, MIN_BUFFER_SIZE)
    }

    /// `header_capacity` limita el largo de cada línea del request
    pub fn with_capacity(header_capacity: usize, body_capacity: usize) -> Self {
        Self {
            state: ScanState::Start,
            header_buf: Buffer::new(header_capacity),
            body_buf: Buffer::new(body_capacity),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Vuelve a `Start` y limpia los buffers sin realocar
    pub fn reset(&mut self) {
        self.state = ScanState::Start;
        self.header_buf.clear();
        self.body_buf.clear();
    }

    /// Libera el almacenamiento de ambos buffers
    pub fn dispose(&mut self) {
        self.state = ScanState::Stop;
        self.header_buf.take();
        self.body_buf.take();
    }

    /// Avanza la máquina de estados hasta `Stop` o `Error`.
    ///
    /// Solo retorna `Ok` si se llegó a `Stop`.
    pub fn read_reqinfo(&mut self, conn: &mut Connection, req: &mut Request) -> Result<()> {
        while !matches!(self.state, ScanState::Stop | ScanState::Error) {
            match self.step(conn, req) {
                Ok(next) => self.state = next,
                Err(e) => {
                    self.state = ScanState::Error;
                    return Err(e);
                }
            }
        }

        match self.state {
            ScanState::Stop => Ok(()),
            _ => Err(ServerError::ConnectionClosed),
        }
    }

    fn step(&mut self, conn: &mut Connection, req: &mut Request) -> Result<ScanState> {
        match self.state {
            ScanState::Start => Ok(ScanState::EatMethod),
            ScanState::EatMethod => self.eat_method(conn, req),
            ScanState::EatUrl => self.eat_url(conn, req),
            ScanState::EatSchema => self.eat_schema(conn, req),
            ScanState::EatHeader => self.eat_header(conn, req),
            ScanState::EatBlob => self.eat_blob(conn, req),
            ScanState::Stop | ScanState::Error => Ok(self.state),
        }
    }

    /// Lee un token terminado en `delim` y lo devuelve sin el NUL final
    fn read_token(&mut self, conn: &mut Connection, delim: u8) -> Result<Vec<u8>> {
        self.header_buf.clear();
        conn.read_line(delim, &mut self.header_buf)?;

        let token = self.header_buf.read_delim(NUL).unwrap_or_default();
        self.header_buf.clear();

        Ok(token)
    }

    fn eat_method(&mut self, conn: &mut Connection, req: &mut Request) -> Result<ScanState> {
        let token = self.read_token(conn, SP)?;
        req.set_method(Method::from_token(&token));

        Ok(ScanState::EatUrl)
    }

    fn eat_url(&mut self, conn: &mut Connection, req: &mut Request) -> Result<ScanState> {
        let token = self.read_token(conn, SP)?;
        req.set_path(String::from_utf8_lossy(&token));

        Ok(ScanState::EatSchema)
    }

    fn eat_schema(&mut self, conn: &mut Connection, req: &mut Request) -> Result<ScanState> {
        let token = self.read_token(conn, LF)?;
        req.set_schema(Schema::from_token(&token));

        Ok(ScanState::EatHeader)
    }

    fn eat_header(&mut self, conn: &mut Connection, req: &mut Request) -> Result<ScanState> {
        let line = self.read_token(conn, LF)?;

        if line.is_empty() {
            return Ok(if req.content_len() > 0 {
                ScanState::EatBlob
            } else {
                ScanState::Stop
            });
        }

        let (name, value) = match line.iter().position(|&b| b == SP) {
            Some(split) => (&line[..split], &line[split + 1..]),
            None => (&line[..], &[][..]),
        };

        req.apply_header(&String::from_utf8_lossy(name), &String::from_utf8_lossy(value));

        Ok(ScanState::EatHeader)
    }

    fn eat_blob(&mut self, conn: &mut Connection, req: &mut Request) -> Result<ScanState> {
        let blob_size = req.content_len();

        if blob_size > self.body_buf.capacity() {
            self.body_buf
                .grow(blob_size)
                .map_err(|_| ServerError::BodyTooLarge(blob_size))?;
        }

        self.body_buf.clear();
        conn.read_blob(blob_size, &mut self.body_buf)?;

        let body = self.body_buf.get_span(blob_size)?;
        req.set_body(body);
        self.body_buf.clear();

        Ok(ScanState::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MAX_BUFFER_SIZE;
    use crate::http::MimeType;
    use crate::net::connected_pair;
    use std::io::Write;

    fn scan(raw: &[u8]) -> (Scanner, Request, Result<()>) {
        let (mut conn, mut client) = connected_pair();
        client.write_all(raw).unwrap();
        client.shutdown(std::net::Shutdown::Write).unwrap();

        let mut scanner = Scanner::new();
        let mut req = Request::new();
        let result = scanner.read_reqinfo(&mut conn, &mut req);

        (scanner, req, result)
    }

    #[test]
    fn test_simple_get() {
        let (scanner, req, result) = scan(b"GET /hello HTTP/1.1\r\nHost: x\r\n\r\n");

        assert!(result.is_ok());
        assert_eq!(scanner.state(), ScanState::Stop);
        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.path(), "/hello");
        assert_eq!(req.schema(), Schema::Http11);
        assert_eq!(req.host(), Some("x"));
        assert_eq!(req.content_len(), 0);
        assert_eq!(req.body(), None);
    }

    #[test]
    fn test_post_with_body() {
        let (_, req, result) = scan(
            b"POST /echo HTTP/1.0\r\nHost: x\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello",
        );

        assert!(result.is_ok());
        assert_eq!(req.method(), Method::Post);
        assert_eq!(req.mime(), MimeType::TextPlain);
        assert_eq!(req.body(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_body_larger_than_buffer_grows() {
        let body = vec![b'a'; 2000];
        let mut raw = format!("POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
        raw.extend_from_slice(&body);

        let (_, req, result) = scan(&raw);
        assert!(result.is_ok());
        assert_eq!(req.body().map(<[u8]>::len), Some(2000));
    }

    #[test]
    fn test_body_at_buffer_ceiling_is_accepted() {
        let (mut conn, mut client) = connected_pair();

        // 1 MiB no entra en el buffer del socket: se escribe desde otro hilo
        let sender = std::thread::spawn(move || {
            let head = format!("POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: {}\r\n\r\n", MAX_BUFFER_SIZE);
            client.write_all(head.as_bytes()).unwrap();
            client.write_all(&vec![b'z'; MAX_BUFFER_SIZE]).unwrap();
            client
        });

        let mut scanner = Scanner::new();
        let mut req = Request::new();
        let result = scanner.read_reqinfo(&mut conn, &mut req);
        let _client = sender.join().unwrap();

        assert!(result.is_ok());
        assert_eq!(req.body().map(<[u8]>::len), Some(MAX_BUFFER_SIZE));
    }

    #[test]
    fn test_body_over_ceiling_is_too_large() {
        let raw = format!("POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: {}\r\n\r\n", MAX_BUFFER_SIZE + 1);
        let (scanner, _, result) = scan(raw.as_bytes());

        assert!(matches!(result, Err(ServerError::BodyTooLarge(n)) if n == MAX_BUFFER_SIZE + 1));
        assert_eq!(scanner.state(), ScanState::Error);
    }

    #[test]
    fn test_query_string_stays_in_path() {
        let (_, req, _) = scan(b"GET /search?q=rust HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(req.path(), "/search?q=rust");
    }

    #[test]
    fn test_unknown_tokens() {
        let (_, req, result) = scan(b"BREW /pot HTCPCP/1.0\r\nHost: x\r\nX-Extra: 1\r\n\r\n");

        assert!(result.is_ok());
        assert_eq!(req.method(), Method::Unknown);
        assert_eq!(req.schema(), Schema::Unknown);
    }

    #[test]
    fn test_missing_host_still_parses() {
        let (_, req, result) = scan(b"GET / HTTP/1.0\r\n\r\n");
        assert!(result.is_ok());
        assert_eq!(req.host(), None);
    }

    #[test]
    fn test_truncated_request_is_error() {
        let (scanner, _, result) = scan(b"GET / HTTP/1.1\r\nHost: x\r\n");
        assert!(result.is_err());
        assert_eq!(scanner.state(), ScanState::Error);
    }

    #[test]
    fn test_short_body_is_error() {
        let (scanner, _, result) = scan(b"POST / HTTP/1.1\r\nHost: x\r\nContent-Length: 10\r\n\r\nabc");
        assert!(result.is_err());
        assert_eq!(scanner.state(), ScanState::Error);
    }

    #[test]
    fn test_header_line_too_long() {
        let mut raw = b"GET / HTTP/1.1\r\nX-Long: ".to_vec();
        raw.extend(std::iter::repeat(b'z').take(MIN_BUFFER_SIZE * 2));
        raw.extend_from_slice(b"\r\n\r\n");

        let (_, _, result) = scan(&raw);
        assert!(matches!(result, Err(ServerError::LineTooLong(_))));
    }

    #[test]
    fn test_keep_alive_cycles_on_same_connection() {
        let (mut conn, mut client) = connected_pair();
        client
            .write_all(b"GET /a HTTP/1.1\r\nHost: x\r\nConnection: keep-alive\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n")
            .unwrap();

        let mut scanner = Scanner::new();
        let mut req = Request::new();

        scanner.read_reqinfo(&mut conn, &mut req).unwrap();
        assert_eq!(req.path(), "/a");
        assert!(req.keep_alive());

        scanner.reset();
        req.clear();
        assert_eq!(scanner.state(), ScanState::Start);

        scanner.read_reqinfo(&mut conn, &mut req).unwrap();
        assert_eq!(req.path(), "/b");
        assert!(!req.keep_alive());
    }
}
