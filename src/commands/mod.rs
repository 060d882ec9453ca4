//! # Comandos del Servidor
//! src/commands/mod.rs
//!
//! Handlers de aplicación que el binario registra al arrancar.
//!
//! Cada comando es una función [`crate::router::HandlerFn`]: recibe el
//! contexto de solo lectura, el request y la respuesta a llenar.

pub mod basic;

pub use basic::*;

use crate::error::Result;
use crate::http::{Method, MimeType};
use crate::server::Server;

/// Archivos de `--www-dir` que se cargan al arrancar
pub const WWW_FILES: &[&str] = &[INDEX_HTML, INDEX_CSS];

/// Registra todas las rutas por defecto
pub fn register_defaults(server: &mut Server) -> Result<()> {
    server.add_handler("/", Method::Get, MimeType::Any, root_handler)?;
    server.add_handler("/index.css", Method::Get, MimeType::Any, index_css_handler)?;
    server.add_handler("/status", Method::Get, MimeType::Any, status_handler)?;
    server.add_handler("/echo", Method::Post, MimeType::TextPlain, echo_handler)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_register_defaults_once() {
        let mut server = Server::new(Config::default());
        register_defaults(&mut server).unwrap();

        // registrar de nuevo choca con las rutas existentes
        assert!(register_defaults(&mut server).is_err());
    }
}
