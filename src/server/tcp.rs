//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Arma el servidor: registra rutas, abre el socket de escucha y lanza un
//! hilo que escucha más un pool fijo de workers conectados por una
//! [`BoundedQueue`].
//!
//! Las rutas se registran con `&mut self` y `start` consume el servidor,
//! así que ningún worker puede existir mientras el mapa de rutas todavía
//! se está escribiendo.

use super::listener::ListenerLoop;
use super::queue::BoundedQueue;
use super::shutdown::ShutdownToken;
use super::worker::{Worker, WorkerShared};
use crate::config::Config;
use crate::error::Result;
use crate::http::{Method, MimeType};
use crate::metrics::MetricsCollector;
use crate::net::{Connection, Listener};
use crate::resources::{ResourceLookup, ResourceTable};
use crate::router::{Handler, HandlerContext, HandlerFn, RouteMap};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Servidor HTTP/1.x con pool fijo de workers
pub struct Server {
    config: Config,
    routes: RouteMap,
    resources: Arc<dyn ResourceLookup>,
    metrics: MetricsCollector,
    shutdown: ShutdownToken,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            routes: RouteMap::new(),
            resources: Arc::new(ResourceTable::new()),
            metrics: MetricsCollector::new(),
            shutdown: ShutdownToken::new(),
        }
    }

    /// Reemplaza la tabla de recursos que ven los handlers
    pub fn with_resources(mut self, resources: Arc<dyn ResourceLookup>) -> Self {
        self.resources = resources;
        self
    }

    /// Registra un handler. Falla si el path ya estaba registrado.
    pub fn add_handler(
        &mut self,
        path: &'static str,
        method: Method,
        mime: MimeType,
        callback: HandlerFn,
    ) -> Result<()> {
        self.routes.put(path, Handler::new(method, mime, callback))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Token para pedir el apagado desde afuera (p. ej. Ctrl-C)
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    /// Abre el socket y lanza los hilos. Retorna apenas todo está corriendo.
    pub fn start(self) -> Result<ServerHandle> {
        let mut listener = Listener::bind(
            &self.config.host,
            self.config.port,
            self.config.backlog,
            self.config.accept_timeout(),
        )?;
        listener.open()?;

        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                listener.close();
                return Err(e);
            }
        };

        let queue = Arc::new(BoundedQueue::<Connection>::new(self.config.queue_capacity));

        let shared = WorkerShared {
            routes: Arc::new(self.routes),
            handler_ctx: HandlerContext::new(self.resources, self.metrics.clone()),
            queue: Arc::clone(&queue),
            shutdown: self.shutdown.clone(),
            metrics: self.metrics.clone(),
            server_name: Arc::from(self.config.server_name.as_str()),
            read_timeout: self.config.read_timeout(),
        };

        let mut handle = ServerHandle {
            local_addr,
            shutdown: self.shutdown.clone(),
            queue: Arc::clone(&queue),
            metrics: self.metrics.clone(),
            listener: None,
            workers: Vec::with_capacity(self.config.workers),
        };

        for id in 0..self.config.workers.max(1) {
            let worker = Worker::new(id, shared.clone());
            let spawned = thread::Builder::new()
                .name(format!("h1-worker-{}", id))
                .spawn(move || worker.run());

            match spawned {
                Ok(join) => handle.workers.push(join),
                Err(e) => {
                    handle.shutdown();
                    handle.join();
                    return Err(e.into());
                }
            }
        }

        let looper = ListenerLoop::new(listener, queue, self.shutdown.clone(), self.metrics.clone());
        let spawned = thread::Builder::new()
            .name("h1-listener".to_string())
            .spawn(move || looper.run());

        match spawned {
            Ok(join) => handle.listener = Some(join),
            Err(e) => {
                handle.shutdown();
                handle.join();
                return Err(e.into());
            }
        }

        info!(
            address = %local_addr,
            workers = self.config.workers.max(1),
            queue_capacity = handle.queue.capacity(),
            "server listening"
        );

        Ok(handle)
    }

    /// `start` + `join`: bloquea hasta que se dispare el apagado
    pub fn run(self) -> Result<()> {
        self.start()?.join();
        Ok(())
    }
}

/// Handle del servidor en ejecución
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: ShutdownToken,
    queue: Arc<BoundedQueue<Connection>>,
    metrics: MetricsCollector,
    listener: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Dirección efectiva (útil si se pidió el puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Pide el apagado cooperativo. Los workers ociosos despiertan de
    /// inmediato; los que atienden una conexión terminan su estado actual.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
        self.queue.close();
    }

    /// Espera a que terminen el hilo de escucha y todos los workers
    pub fn join(mut self) {
        if let Some(listener) = self.listener.take() {
            if listener.join().is_err() {
                warn!("listener thread panicked");
            }
        }

        // sin listener nadie más va a encolar
        self.queue.close();

        for (id, worker) in self.workers.drain(..).enumerate() {
            if worker.join().is_err() {
                warn!(worker = id, "worker thread panicked");
            }
        }

        info!("server stopped");
    }
}
