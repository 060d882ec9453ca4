//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real. Los contadores
//! de conexiones son atómicos porque los toca el hilo que escucha en cada
//! `accept`; lo demás (status, rutas, latencias) va detrás de un `Mutex`.

use crate::http::StatusCode;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Máximo de latencias guardadas para calcular percentiles
const MAX_LATENCY_SAMPLES: usize = 10_000;

/// Cantidad de rutas en el top del snapshot
const TOP_PATHS: usize = 10;

/// Clave que agrupa los requests sin ruta registrada
pub const UNMATCHED_PATH: &str = "<unmatched>";

/// Collector de métricas thread-safe
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    counters: Arc<ConnectionCounters>,
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

#[derive(Debug, Default)]
struct ConnectionCounters {
    accepted: AtomicU64,
    accept_failures: AtomicU64,
    shed: AtomicU64,
    recv_failures: AtomicU64,
    send_failures: AtomicU64,
    busy_workers: AtomicU64,
}

/// Datos internos de métricas
#[derive(Debug, Default)]
struct MetricsData {
    total_requests: u64,

    /// Respuestas por código de estado
    status_codes: BTreeMap<u16, u64>,

    /// Latencias en microsegundos (ventana de las últimas N)
    latencies: VecDeque<u64>,

    /// Solo rutas registradas más [`UNMATCHED_PATH`]
    requests_per_path: HashMap<&'static str, u64>,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            counters: Arc::new(ConnectionCounters::default()),
            inner: Arc::new(Mutex::new(MetricsData {
                latencies: VecDeque::with_capacity(MAX_LATENCY_SAMPLES),
                ..MetricsData::default()
            })),
            start_time: Instant::now(),
        }
    }

    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_accepted(&self) {
        self.counters.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// `accept` falló por algo distinto del timeout
    pub fn record_accept_failure(&self) {
        self.counters.accept_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Conexión descartada porque la cola estaba llena
    pub fn record_shed(&self) {
        self.counters.shed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recv_failure(&self) {
        self.counters.recv_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.counters.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Registra una respuesta enviada. `route` es la ruta registrada que
    /// atendió el request; `None` cuenta en [`UNMATCHED_PATH`].
    pub fn record_request(&self, route: Option<&'static str>, status: StatusCode, latency: Duration) {
        let mut data = self.data();

        data.total_requests += 1;
        *data.status_codes.entry(status.as_u16()).or_insert(0) += 1;

        if data.latencies.len() >= MAX_LATENCY_SAMPLES {
            data.latencies.pop_front();
        }
        data.latencies.push_back(latency.as_micros() as u64);

        let key = route.unwrap_or(UNMATCHED_PATH);
        *data.requests_per_path.entry(key).or_insert(0) += 1;
    }

    /// Un worker tomó una conexión
    pub fn increment_busy_workers(&self) {
        self.counters.busy_workers.fetch_add(1, Ordering::Relaxed);
    }

    /// Un worker soltó su conexión. Nunca baja de cero.
    pub fn decrement_busy_workers(&self) {
        let _ = self
            .counters
            .busy_workers
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn busy_workers(&self) -> u64 {
        self.counters.busy_workers.load(Ordering::Relaxed)
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.data();
        let latency = LatencySummary::from_samples(&data.latencies);

        let mut paths: Vec<_> = data
            .requests_per_path
            .iter()
            .map(|(path, &count)| PathCount {
                path: path.to_string(),
                count,
            })
            .collect();
        paths.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
        paths.truncate(TOP_PATHS);

        MetricsSnapshot {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            connections: ConnectionSnapshot {
                accepted: self.counters.accepted.load(Ordering::Relaxed),
                accept_failures: self.counters.accept_failures.load(Ordering::Relaxed),
                shed: self.counters.shed.load(Ordering::Relaxed),
                recv_failures: self.counters.recv_failures.load(Ordering::Relaxed),
                send_failures: self.counters.send_failures.load(Ordering::Relaxed),
                busy_workers: self.busy_workers(),
            },
            requests: RequestSnapshot {
                total: data.total_requests,
                status_codes: data.status_codes.clone(),
                top_paths: paths,
            },
            latency_us: latency,
        }
    }

    /// Snapshot serializado como JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot de métricas (para uso externo)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub connections: ConnectionSnapshot,
    pub requests: RequestSnapshot,
    pub latency_us: LatencySummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionSnapshot {
    pub accepted: u64,
    pub accept_failures: u64,
    pub shed: u64,
    pub recv_failures: u64,
    pub send_failures: u64,
    pub busy_workers: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestSnapshot {
    pub total: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub top_paths: Vec<PathCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathCount {
    pub path: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LatencySummary {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub avg: u64,
    pub samples: usize,
}

impl LatencySummary {
    fn from_samples(latencies: &VecDeque<u64>) -> Self {
        if latencies.is_empty() {
            return Self::default();
        }

        let mut sorted: Vec<u64> = latencies.iter().copied().collect();
        sorted.sort_unstable();

        let len = sorted.len();
        let sum: u64 = sorted.iter().sum();

        Self {
            p50: sorted[len * 50 / 100],
            p95: sorted[len * 95 / 100],
            p99: sorted[len * 99 / 100],
            avg: sum / len as u64,
            samples: len,
        }
    }
}
