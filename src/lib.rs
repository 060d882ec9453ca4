//! # H1 Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 y HTTP/1.1 implementado sobre sockets bloqueantes,
//! con un hilo que escucha, una cola acotada y un pool fijo de workers.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `buffer`: buffer de bytes con cursores de lectura y escritura
//! - `net`: sockets de escucha y conexiones
//! - `http`: scanner de requests, writer de respuestas y tipos del protocolo
//! - `router`: mapa de rutas y despacho a handlers
//! - `server`: cola acotada, hilo de escucha y workers
//! - `resources`: archivos estáticos cargados en memoria
//! - `commands`: handlers de la aplicación
//! - `metrics`: recolección de métricas
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use h1_server::config::Config;
//! use h1_server::server::Server;
//!
//! let mut server = Server::new(Config::default());
//! h1_server::commands::register_defaults(&mut server).unwrap();
//! server.run().unwrap();
//! ```

pub mod buffer;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod net;
pub mod resources;
pub mod router;
pub mod server;

pub use error::{Result, ServerError};
