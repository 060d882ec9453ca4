//! # Worker de Conexiones
//! src/server/worker.rs
//!
//! Cada worker atiende una conexión a la vez con una máquina de estados:
//!
//! ```text
//! Consume → Recv → Process → Send → Reset ─┬→ Recv     (keep-alive)
//!             │                            └→ Consume  (close)
//!             └──────(falla de lectura)──────→ Reset
//! ```
//!
//! La señal de apagado se revisa entre estados; `End` también se alcanza
//! cuando la cola se cierra estando vacía.

use super::queue::BoundedQueue;
use super::shutdown::ShutdownToken;
use crate::error::ServerError;
use crate::http::{MimeType, Request, ResetMode, Response, Scanner, Schema, StatusCode, Writer};
use crate::metrics::MetricsCollector;
use crate::net::Connection;
use crate::router::{HandlerContext, RouteMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Estados del ciclo de vida de un worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Consume,
    Recv,
    Process,
    Send,
    Reset,
    End,
}

/// Recursos compartidos por todos los workers del pool
#[derive(Debug, Clone)]
pub struct WorkerShared {
    pub routes: Arc<RouteMap>,
    pub handler_ctx: HandlerContext,
    pub queue: Arc<BoundedQueue<Connection>>,
    pub shutdown: ShutdownToken,
    pub metrics: MetricsCollector,
    pub server_name: Arc<str>,
    pub read_timeout: Option<Duration>,
}

/// Conexión en servicio junto con su scanner y writer
#[derive(Debug)]
struct Session {
    conn: Connection,
    scanner: Scanner,
    writer: Writer,
}

impl Session {
    fn new(conn: Connection) -> Self {
        Self {
            conn,
            scanner: Scanner::new(),
            writer: Writer::new(),
        }
    }

    fn close(mut self) {
        self.conn.close();
        self.scanner.dispose();
        self.writer.dispose();
    }
}

pub struct Worker {
    id: usize,
    state: WorkerState,
    shared: WorkerShared,
    request: Request,
    response: Response,
    session: Option<Session>,
    /// El ciclo actual no puede continuar en la misma conexión
    must_close: bool,
    /// El scanner falló por un request mal formado
    protocol_error: bool,
    /// Ruta registrada que atendió el ciclo actual
    route: Option<&'static str>,
    cycle_start: Instant,
}

impl Worker {
    pub fn new(id: usize, shared: WorkerShared) -> Self {
        let response = Response::new(Arc::clone(&shared.server_name));

        Self {
            id,
            state: WorkerState::Consume,
            shared,
            request: Request::new(),
            response,
            session: None,
            must_close: false,
            protocol_error: false,
            route: None,
            cycle_start: Instant::now(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Corre la máquina de estados hasta `End`
    pub fn run(mut self) {
        info!(worker = self.id, "worker started");

        while self.state != WorkerState::End {
            if self.shared.shutdown.is_triggered() {
                self.state = WorkerState::End;
                break;
            }

            self.state = match self.state {
                WorkerState::Consume => self.consume(),
                WorkerState::Recv => self.recv(),
                WorkerState::Process => self.process(),
                WorkerState::Send => self.send(),
                WorkerState::Reset => self.reset(),
                WorkerState::End => WorkerState::End,
            };
        }

        self.release_session();
        info!(worker = self.id, "worker stopped");
    }

    fn consume(&mut self) -> WorkerState {
        let conn = match self.shared.queue.dequeue() {
            Some(conn) => conn,
            None => return WorkerState::End,
        };

        if let Err(e) = conn.set_read_timeout(self.shared.read_timeout) {
            warn!(worker = self.id, error = %e, "failed to set read timeout");
        }

        debug!(worker = self.id, peer = ?conn.peer(), "connection taken");
        self.shared.metrics.increment_busy_workers();
        self.session = Some(Session::new(conn));

        WorkerState::Recv
    }

    fn recv(&mut self) -> WorkerState {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return WorkerState::Consume,
        };

        self.cycle_start = Instant::now();

        match session.scanner.read_reqinfo(&mut session.conn, &mut self.request) {
            Ok(()) => WorkerState::Process,
            Err(e) if e.is_protocol() => {
                warn!(worker = self.id, error = %e, "malformed request");
                self.protocol_error = true;
                WorkerState::Process
            }
            Err(ServerError::ConnectionClosed) => {
                debug!(worker = self.id, "peer closed connection");
                self.must_close = true;
                WorkerState::Reset
            }
            Err(e) => {
                warn!(worker = self.id, error = %e, "read of request failed");
                self.shared.metrics.record_recv_failure();
                self.must_close = true;
                WorkerState::Reset
            }
        }
    }

    fn process(&mut self) -> WorkerState {
        if self.protocol_error || self.request.schema() == Schema::Unknown {
            self.must_close = true;
            self.respond_bad(StatusCode::BadRequest, false);
        } else if self.request.host().is_none() {
            self.respond_bad(StatusCode::BadRequest, self.request.keep_alive());
        } else {
            self.dispatch();
        }

        WorkerState::Send
    }

    /// Busca la ruta y corre su handler
    fn dispatch(&mut self) {
        let keep_alive = self.request.keep_alive();

        let handler = match self.shared.routes.lookup(self.request.path()) {
            Some((key, handler)) => {
                self.route = Some(key);
                *handler
            }
            None => return self.respond_bad(StatusCode::NotFound, keep_alive),
        };

        self.response.fill_status_line(self.request.schema(), StatusCode::Ok);
        self.response.set_keep_alive(keep_alive);

        let outcome = handler.handle(&self.shared.handler_ctx, &self.request, &mut self.response);

        if let Err(e) = outcome {
            debug!(worker = self.id, path = self.request.path(), error = %e, "handler rejected request");
            self.response.reset(ResetMode::All);
            self.respond_bad(e.status(), keep_alive);
        }
    }

    /// Respuesta de error sin body
    fn respond_bad(&mut self, status: StatusCode, keep_alive: bool) {
        self.response.fill_status_line(self.request.schema(), status);
        self.response.set_keep_alive(keep_alive);
        self.response.set_mime(MimeType::TextPlain);
        self.response.set_content_len(0);
        self.response.set_body(None);
    }

    fn send(&mut self) -> WorkerState {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return WorkerState::Reset,
        };

        let status = self.response.status().unwrap_or(StatusCode::InternalServerError);

        match session.writer.put_reply(&mut session.conn, &self.response) {
            Ok(()) => {
                self.shared
                    .metrics
                    .record_request(self.route, status, self.cycle_start.elapsed());
                info!(
                    worker = self.id,
                    method = self.request.method().as_str(),
                    path = self.request.path(),
                    status = status.as_u16(),
                    "request served"
                );
            }
            Err(e) => {
                warn!(worker = self.id, error = %e, "write of response failed");
                self.shared.metrics.record_send_failure();
                self.must_close = true;
            }
        }

        WorkerState::Reset
    }

    fn reset(&mut self) -> WorkerState {
        let persists = self.request.keep_alive() && !self.must_close;

        self.request.clear();
        self.response.reset(ResetMode::All);
        self.must_close = false;
        self.protocol_error = false;
        self.route = None;

        if let Some(session) = self.session.as_mut() {
            session.scanner.reset();
            session.writer.reset();
        }

        if persists && self.session.is_some() {
            return WorkerState::Recv;
        }

        self.release_session();
        WorkerState::Consume
    }

    fn release_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
            self.shared.metrics.decrement_busy_workers();
        }
    }
}
