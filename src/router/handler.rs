//! # Handlers
//! src/router/handler.rs
//!
//! Un [`Handler`] asocia un callback con el método y el tipo MIME que
//! acepta. Antes de invocar el callback se verifica que el request cumpla
//! ambas restricciones.

use crate::http::{Method, MimeType, Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use crate::resources::ResourceLookup;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Resultado fallido de un handler
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    #[error("resource not found")]
    BadPath,

    #[error("method not supported by route")]
    BadMethod,

    #[error("content type not accepted by route")]
    BadMime,

    #[error("handler failed")]
    General,
}

impl HandleError {
    /// Código de estado con el que se responde
    pub fn status(&self) -> StatusCode {
        match self {
            HandleError::BadPath => StatusCode::NotFound,
            HandleError::BadMethod => StatusCode::NotImplemented,
            HandleError::BadMime => StatusCode::NotAcceptable,
            HandleError::General => StatusCode::InternalServerError,
        }
    }
}

/// Capacidades de solo lectura que recibe cada callback
#[derive(Clone)]
pub struct HandlerContext {
    resources: Arc<dyn ResourceLookup>,
    metrics: MetricsCollector,
}

impl HandlerContext {
    pub fn new(resources: Arc<dyn ResourceLookup>, metrics: MetricsCollector) -> Self {
        Self { resources, metrics }
    }

    pub fn resources(&self) -> &dyn ResourceLookup {
        self.resources.as_ref()
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// Firma de los callbacks de aplicación
pub type HandlerFn = fn(&HandlerContext, &Request, &mut Response) -> Result<(), HandleError>;

/// Callback con sus restricciones de método y MIME
#[derive(Debug, Clone, Copy)]
pub struct Handler {
    method: Method,
    mime: MimeType,
    callback: HandlerFn,
}

impl Handler {
    pub fn new(method: Method, mime: MimeType, callback: HandlerFn) -> Self {
        Self {
            method,
            mime,
            callback,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn mime(&self) -> MimeType {
        self.mime
    }

    /// Verifica método y MIME. `MimeType::Any` en el handler acepta todo.
    pub fn check(&self, req: &Request) -> Result<(), HandleError> {
        if req.method() != self.method {
            return Err(HandleError::BadMethod);
        }

        if self.mime != MimeType::Any && req.mime() != self.mime {
            return Err(HandleError::BadMime);
        }

        Ok(())
    }

    /// Ejecuta `check` y, si pasa, el callback. El resultado del callback
    /// se devuelve tal cual.
    pub fn handle(&self, ctx: &HandlerContext, req: &Request, res: &mut Response) -> Result<(), HandleError> {
        self.check(req)?;
        (self.callback)(ctx, req, res)
    }
}
