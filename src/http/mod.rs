//! # Módulo HTTP
//!
//! Implementación mínima de HTTP/1.0 y HTTP/1.1 sobre [`crate::net`]:
//!
//! - `scanner`: máquina de estados que parsea un request desde la conexión
//! - `writer`: serialización y envío de respuestas
//! - `request` / `response`: los registros que ambos llenan y consumen
//! - `mime` / `status`: tipos de contenido y códigos de estado soportados
//!
//! ### Formato de Request
//!
//! ```text
//! POST /echo HTTP/1.1\r\n
//! Host: localhost:8000\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 4\r\n
//! \r\n
//! hola
//! ```
//!
//! No hay chunked transfer encoding ni pipelining: cada request se lee y
//! se responde antes de leer el siguiente.

pub mod mime;
pub mod request;
pub mod response;
pub mod scanner;
pub mod status;
pub mod writer;

pub use mime::MimeType;
pub use request::{Method, Request, Schema};
pub use response::{ResetMode, Response};
pub use scanner::{ScanState, Scanner};
pub use status::StatusCode;
pub use writer::Writer;
