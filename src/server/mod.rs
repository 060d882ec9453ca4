//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el núcleo concurrente:
//! 1. Un hilo escucha y acepta conexiones
//! 2. Las encola en una cola acotada (si está llena, la conexión se descarta)
//! 3. Un pool fijo de workers las saca de la cola
//! 4. Cada worker lee, despacha y responde requests con keep-alive
//!
//! El apagado es cooperativo vía [`ShutdownToken`].

pub mod listener;
pub mod queue;
pub mod shutdown;
pub mod tcp;
pub mod worker;

pub use queue::{BoundedQueue, EnqueueError};
pub use shutdown::ShutdownToken;
pub use tcp::{Server, ServerHandle};
pub use worker::{Worker, WorkerState};
