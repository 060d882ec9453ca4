//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Este módulo implementa la recolección y agregación de métricas del servidor:
//! - Conexiones aceptadas y descartadas por cola llena
//! - Fallas de lectura/escritura por conexión
//! - Respuestas por código de estado y por ruta
//! - Latencias (p50, p95, p99)
//! - Workers ocupados

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot, UNMATCHED_PATH};
