//! # Request HTTP/1.x
//! src/http/request.rs
//!
//! Registro que el scanner va llenando estado por estado. Se crea vacío al
//! iniciar un worker y se limpia con [`Request::clear`] al final de cada
//! ciclo request/respuesta, para reutilizarlo en la siguiente vuelta de
//! keep-alive.
//!
//! ## Formato que se consume
//!
//! ```text
//! GET /path HTTP/1.1\r\n
//! Host: localhost:8000\r\n
//! Connection: keep-alive\r\n
//! \r\n
//! ```

use super::MimeType;

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HEAD - Como GET pero solo headers
    Head,

    /// GET - Obtener un recurso
    Get,

    /// POST - Enviar datos a un recurso
    Post,

    /// Cualquier otro token
    Unknown,
}

impl Method {
    /// Parsea el token del método (sensible a mayúsculas)
    pub fn from_token(token: &[u8]) -> Self {
        match token {
            b"HEAD" => Method::Head,
            b"GET" => Method::Get,
            b"POST" => Method::Post,
            _ => Method::Unknown,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Head => "HEAD",
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Unknown => "UNKNOWN",
        }
    }
}

/// Versión del protocolo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Schema {
    #[default]
    Http10,
    Http11,
    Unknown,
}

impl Schema {
    pub fn from_token(token: &[u8]) -> Self {
        match token {
            b"HTTP/1.0" => Schema::Http10,
            b"HTTP/1.1" => Schema::Http11,
            _ => Schema::Unknown,
        }
    }

    /// Texto para la status line. `Unknown` responde como HTTP/1.1.
    pub fn as_str(&self) -> &'static str {
        match self {
            Schema::Http10 => "HTTP/1.0",
            Schema::Http11 | Schema::Unknown => "HTTP/1.1",
        }
    }
}

/// Representa un request HTTP/1.x parseado
#[derive(Debug, Clone)]
pub struct Request {
    schema: Schema,
    method: Method,
    path: String,
    host: Option<String>,
    keep_alive: bool,
    mime: MimeType,
    content_len: usize,
    body: Option<Vec<u8>>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Request vacío con los valores por defecto
    pub fn new() -> Self {
        Self {
            schema: Schema::Http10,
            method: Method::Unknown,
            path: String::new(),
            host: None,
            keep_alive: false,
            mime: MimeType::Any,
            content_len: 0,
            body: None,
        }
    }

    /// Libera los strings y el body, y vuelve a los valores por defecto
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path tal como llegó (el query string NO se separa)
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn mime(&self) -> MimeType {
        self.mime
    }

    pub fn content_len(&self) -> usize {
        self.content_len
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = schema;
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = Some(host.into());
    }

    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    pub fn set_mime(&mut self, mime: MimeType) {
        self.mime = mime;
    }

    pub fn set_content_len(&mut self, content_len: usize) {
        self.content_len = content_len;
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }

    /// Aplica un header reconocido. Los demás se ignoran.
    ///
    /// Los nombres incluyen los dos puntos (`Host:`), tal como llegan al
    /// separar la línea por el primer espacio.
    pub fn apply_header(&mut self, name: &str, value: &str) {
        match name {
            "Host:" => self.set_host(value),
            "Connection:" => self.keep_alive = value == "keep-alive",
            "Content-Type:" => self.mime = MimeType::from_header(value),
            "Content-Length:" => self.content_len = value.trim().parse().unwrap_or(0),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_tokens() {
        assert_eq!(Method::from_token(b"GET"), Method::Get);
        assert_eq!(Method::from_token(b"HEAD"), Method::Head);
        assert_eq!(Method::from_token(b"POST"), Method::Post);
        assert_eq!(Method::from_token(b"DELETE"), Method::Unknown);
        assert_eq!(Method::from_token(b"get"), Method::Unknown);
    }

    #[test]
    fn test_schema_tokens() {
        assert_eq!(Schema::from_token(b"HTTP/1.0"), Schema::Http10);
        assert_eq!(Schema::from_token(b"HTTP/1.1"), Schema::Http11);
        assert_eq!(Schema::from_token(b"HTTP/2"), Schema::Unknown);
        assert_eq!(Schema::Unknown.as_str(), "HTTP/1.1");
    }

    #[test]
    fn test_apply_recognized_headers() {
        let mut req = Request::new();
        req.apply_header("Host:", "localhost");
        req.apply_header("Connection:", "keep-alive");
        req.apply_header("Content-Type:", "text/plain");
        req.apply_header("Content-Length:", "42");
        req.apply_header("User-Agent:", "curl/8.0");

        assert_eq!(req.host(), Some("localhost"));
        assert!(req.keep_alive());
        assert_eq!(req.mime(), MimeType::TextPlain);
        assert_eq!(req.content_len(), 42);
    }

    #[test]
    fn test_connection_is_case_sensitive() {
        let mut req = Request::new();
        req.apply_header("Connection:", "Keep-Alive");
        assert!(!req.keep_alive());
    }

    #[test]
    fn test_bad_content_length_defaults_to_zero() {
        let mut req = Request::new();
        req.apply_header("Content-Length:", "abc");
        assert_eq!(req.content_len(), 0);

        req.apply_header("Content-Length:", "-5");
        assert_eq!(req.content_len(), 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut req = Request::new();
        req.set_method(Method::Post);
        req.set_path("/echo");
        req.set_host("h");
        req.set_keep_alive(true);
        req.set_body(b"hi".to_vec());

        req.clear();
        assert_eq!(req.method(), Method::Unknown);
        assert_eq!(req.path(), "");
        assert_eq!(req.host(), None);
        assert!(!req.keep_alive());
        assert_eq!(req.mime(), MimeType::Any);
        assert_eq!(req.body(), None);
    }
}
