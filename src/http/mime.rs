//! # Tipos MIME
//! src/http/mime.rs
//!
//! Clasificación cerrada de contenidos que entiende el servidor, usada tanto
//! en el `Content-Type` del request como en el de la respuesta.

/// Tipo MIME de un payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MimeType {
    /// `*/*` (comodín: un handler con este tipo acepta cualquier request)
    #[default]
    Any,
    TextPlain,
    TextHtml,
    TextCss,
    TextJavascript,
    ApplicationJson,
    /// Valor de `Content-Type` no reconocido
    Unknown,
}

impl MimeType {
    /// Parsea el valor de un header `Content-Type` (comparación exacta)
    pub fn from_header(value: &str) -> Self {
        match value {
            "*/*" => MimeType::Any,
            "text/plain" => MimeType::TextPlain,
            "text/html" => MimeType::TextHtml,
            "text/css" => MimeType::TextCss,
            "text/javascript" => MimeType::TextJavascript,
            "application/json" => MimeType::ApplicationJson,
            _ => MimeType::Unknown,
        }
    }

    /// Texto a escribir en el `Content-Type` de una respuesta.
    /// `Any` y `Unknown` salen como `text/plain`.
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::TextHtml => "text/html",
            MimeType::TextCss => "text/css",
            MimeType::TextJavascript => "text/javascript",
            MimeType::ApplicationJson => "application/json",
            MimeType::TextPlain | MimeType::Any | MimeType::Unknown => "text/plain",
        }
    }
}
