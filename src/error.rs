//! # Errores del Servidor
//! src/error.rs
//!
//! Tipo de error unificado para la infraestructura del servidor: sockets,
//! buffers, configuración y registro de rutas.
//!
//! Los errores de aplicación (404, 406, 501...) NO son `ServerError`: se
//! expresan como respuestas HTTP bien formadas. Ver [`crate::router::HandleError`].

use crate::buffer::BufferError;
use std::io;
use thiserror::Error;

/// Errores de infraestructura del servidor
#[derive(Debug, Error)]
pub enum ServerError {
    /// Falla de lectura/escritura en un socket
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// Operación inválida sobre un buffer
    #[error("buffer: {0}")]
    Buffer(#[from] BufferError),

    /// El peer cerró la conexión antes de completar la operación
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// No se pudo crear/bindear el socket de escucha
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    /// El host no resolvió a ninguna dirección IPv4
    #[error("could not resolve address {0}")]
    AddrResolve(String),

    /// Configuración inválida
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Ruta registrada dos veces
    #[error("route already registered: {0}")]
    DuplicateRoute(String),

    /// Línea del request más larga que el buffer de headers
    #[error("request line exceeds {0} bytes")]
    LineTooLong(usize),

    /// Content-Length mayor al techo permitido para el body
    #[error("declared body of {0} bytes exceeds the limit")]
    BodyTooLarge(usize),
}

impl ServerError {
    /// Indica si el error es de protocolo: la conexión sigue siendo escribible
    /// y se puede responder un 400 antes de cerrarla.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ServerError::LineTooLong(_) | ServerError::BodyTooLarge(_)
        )
    }
}

/// Alias de `Result` con [`ServerError`]
pub type Result<T> = std::result::Result<T, ServerError>;
