//! # Hilo de Escucha
//! src/server/listener.rs
//!
//! Acepta conexiones y las encola para los workers. Si la cola está llena
//! la conexión se cierra en el acto (load shedding) y el loop sigue.
//! Tras un error de `accept` que no sea timeout (p. ej. `EMFILE`) espera un
//! timeout de aceptación antes de reintentar.

use super::queue::{BoundedQueue, EnqueueError};
use super::shutdown::ShutdownToken;
use crate::metrics::MetricsCollector;
use crate::net::{is_accept_timeout, Connection, Listener};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

pub struct ListenerLoop {
    listener: Listener,
    queue: Arc<BoundedQueue<Connection>>,
    shutdown: ShutdownToken,
    metrics: MetricsCollector,
}

impl ListenerLoop {
    /// `listener` ya debe estar en modo escucha
    pub fn new(
        listener: Listener,
        queue: Arc<BoundedQueue<Connection>>,
        shutdown: ShutdownToken,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            listener,
            queue,
            shutdown,
            metrics,
        }
    }

    /// Corre hasta que se pida el apagado. Al salir cierra el socket y la
    /// cola, lo que despierta a los workers ociosos.
    pub fn run(mut self) {
        info!("listener started");

        while !self.shutdown.is_triggered() {
            let conn = match self.listener.accept() {
                Ok(conn) => conn,
                Err(e) if is_accept_timeout(&e) => continue,
                Err(e) => {
                    self.metrics.record_accept_failure();
                    warn!(error = %e, "accept failed");
                    thread::sleep(self.listener.accept_timeout());
                    continue;
                }
            };

            self.metrics.record_accepted();
            let peer = conn.peer();

            match self.queue.enqueue(conn) {
                Ok(()) => debug!(peer = ?peer, "connection queued"),
                Err(EnqueueError::Full(mut conn)) => {
                    self.metrics.record_shed();
                    warn!(peer = ?peer, capacity = self.queue.capacity(), "queue full, dropping connection");
                    conn.close();
                }
                Err(EnqueueError::Closed(mut conn)) => {
                    conn.close();
                    break;
                }
            }
        }

        self.listener.close();
        self.queue.close();
        info!("listener stopped");
    }
}
