//! # Respuestas HTTP
//!
//! Registro que describe la respuesta a serializar. El [`super::Writer`]
//! lo convierte en bytes con este formato:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Server: h1_server/0.1.0\r\n
//! Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! Connection: keep-alive\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>hola</h1>
//! ```
//!
//! El body es compartido (`Arc<[u8]>`): normalmente apunta a memoria de la
//! tabla de recursos y la respuesta nunca lo copia ni lo libera.

use super::{MimeType, Schema, StatusCode};
use std::sync::Arc;
use std::time::SystemTime;

/// Granularidad de [`Response::reset`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Status line, headers y payload
    All,
    /// Date, Connection y Content-Type
    Headers,
    /// Content-Length y body
    Payload,
}

/// Representa una respuesta HTTP/1.x
#[derive(Debug, Clone)]
pub struct Response {
    status_line: String,
    status: Option<StatusCode>,
    server_name: Arc<str>,
    date: SystemTime,
    keep_alive: bool,
    mime: MimeType,
    content_len: usize,
    body: Option<Arc<[u8]>>,
}

impl Response {
    /// Crea una respuesta vacía con la identidad del servidor
    pub fn new(server_name: Arc<str>) -> Self {
        Self {
            status_line: String::new(),
            status: None,
            server_name,
            date: SystemTime::now(),
            keep_alive: false,
            mime: MimeType::Unknown,
            content_len: 0,
            body: None,
        }
    }

    pub fn reset(&mut self, mode: ResetMode) {
        match mode {
            ResetMode::All => {
                self.status_line.clear();
                self.status = None;
                self.reset(ResetMode::Headers);
                self.reset(ResetMode::Payload);
            }
            ResetMode::Headers => {
                self.date = SystemTime::now();
                self.keep_alive = false;
                self.mime = MimeType::Unknown;
            }
            ResetMode::Payload => {
                self.content_len = 0;
                self.body = None;
            }
        }
    }

    /// Precalcula la status line: `SCHEMA SP STATUS SP MESSAGE CRLF`
    pub fn fill_status_line(&mut self, schema: Schema, status: StatusCode) {
        self.status_line = format!("{} {}\r\n", schema.as_str(), status);
        self.status = Some(status);
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

    /// Asigna el body (sin copiarlo)
    pub fn set_body(&mut self, body: Option<Arc<[u8]>>) {
        self.body = body;
    }

    /// Atajo: body + Content-Length + Content-Type
    pub fn with_payload(&mut self, mime: MimeType, body: Arc<[u8]>) {
        self.mime = mime;
        self.content_len = body.len();
        self.body = Some(body);
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn date(&self) -> SystemTime {
        self.date
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
}
