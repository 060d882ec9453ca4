//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` con un subscriber de formato y filtro por
//! `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=debug ./h1_server           # incluye conexiones encoladas/cerradas
//! RUST_LOG=h1_server=warn ./h1_server  # solo fallas
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Nivel usado si `RUST_LOG` no está definido
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Instala el subscriber global. Llamar una sola vez al arrancar.
pub fn init_logging() {
    init_logging_with_level(DEFAULT_LOG_LEVEL);
}

/// Igual que [`init_logging`] pero con otro nivel por defecto.
///
/// Si ya hay un subscriber global no hace nada.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init();
}
