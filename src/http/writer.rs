//! # Writer de Respuestas
//! src/http/writer.rs
//!
//! Serializa un [`Response`] en un buffer de salida y lo envía en un solo
//! `write_blob`. Orden fijo de headers: `Server`, `Date`, `Connection`,
//! `Content-Type`, `Content-Length`.

use super::Response;
use crate::buffer::{Buffer, MAX_BUFFER_SIZE};
use crate::error::Result;
use crate::net::Connection;

/// Capacidad inicial del buffer de salida
pub const DEFAULT_REPLY_BUFSIZE: usize = 3096;

/// Margen reservado para la status line y los headers
const HEADER_ALLOWANCE: usize = 512;

#[derive(Debug)]
pub struct Writer {
    reply_buf: Buffer,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLY_BUFSIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            reply_buf: Buffer::new(capacity),
        }
    }

    /// Bytes ya serializados y aún no enviados
    pub fn pending(&self) -> &[u8] {
        self.reply_buf.as_slice()
    }

    pub fn reset(&mut self) {
        self.reply_buf.clear();
    }

    pub fn dispose(&mut self) {
        self.reply_buf.take();
    }

    /// Serializa y envía `res` por `conn`.
    ///
    /// Si algún append falla, lo que alcanzó a serializarse igual se envía
    /// y se reporta el primer error. El buffer queda limpio en todos los casos.
    pub fn put_reply(&mut self, conn: &mut Connection, res: &Response) -> Result<()> {
        let appended = self.append_reply(res);
        let flushed = self.flush(conn);
        self.reply_buf.clear();

        appended.and(flushed)
    }

    /// Serializa `res` en el buffer sin enviarlo
    pub fn append_reply(&mut self, res: &Response) -> Result<()> {
        self.reserve_for(res);

        self.put_text(res.status_line())?;
        self.put_header("Server", res.server_name())?;
        self.put_header("Date", &httpdate::fmt_http_date(res.date()))?;
        self.put_header("Connection", if res.keep_alive() { "keep-alive" } else { "close" })?;
        self.put_header("Content-Type", res.mime().as_str())?;
        self.put_header("Content-Length", &res.content_len().to_string())?;
        self.put_text("\r\n")?;

        if let Some(body) = res.body() {
            self.reply_buf.put_span(body)?;
        }

        Ok(())
    }

    fn flush(&mut self, conn: &mut Connection) -> Result<()> {
        let count = self.reply_buf.write_pos();

        if count == 0 {
            return Ok(());
        }

        conn.write_blob(count, &self.reply_buf)
    }

    /// Crece el buffer si el body no entra. Si no se puede crecer, el
    /// append del body fallará y se reportará ahí.
    fn reserve_for(&mut self, res: &Response) {
        let body_len = res.body().map_or(0, <[u8]>::len);
        let needed = self.reply_buf.write_pos()
            + HEADER_ALLOWANCE
            + res.status_line().len()
            + res.server_name().len()
            + body_len;

        if needed > self.reply_buf.capacity() {
            let _ = self.reply_buf.grow(needed.min(MAX_BUFFER_SIZE));
        }
    }

    fn put_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.put_text(name)?;
        self.put_text(": ")?;
        self.put_text(value)?;
        self.put_text("\r\n")
    }

    fn put_text(&mut self, text: &str) -> Result<()> {
        self.reply_buf.put_span(text.as_bytes())?;
        Ok(())
    }
}
