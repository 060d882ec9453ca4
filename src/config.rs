//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor con soporte para
//! argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./h1_server 8080 --workers 8 --queue-capacity 32
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! H1_PORT=8080 H1_HOST=0.0.0.0 ./h1_server
//! ```

use crate::error::{Result, ServerError};
use crate::server::queue::{MAX_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Puerto por defecto
pub const DEFAULT_PORT: u16 = 8000;

/// Identidad que se envía en el header `Server`
pub const DEFAULT_SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configuración del servidor HTTP/1.x
#[derive(Debug, Clone, Parser)]
#[command(name = "h1_server")]
#[command(about = "Servidor HTTP/1.x con pool fijo de workers y cola acotada")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor (mayor a 1024)
    #[arg(default_value_t = DEFAULT_PORT, env = "H1_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "H1_HOST")]
    pub host: String,

    /// Backlog del socket de escucha
    #[arg(long, default_value_t = 4)]
    pub backlog: i32,

    // === Workers ===
    /// Número de workers que atienden conexiones
    #[arg(long, default_value_t = 4, env = "H1_WORKERS")]
    pub workers: usize,

    /// Capacidad de la cola de conexiones pendientes
    #[arg(long = "queue-capacity", default_value_t = 16)]
    pub queue_capacity: usize,

    // === Timeouts ===
    /// Timeout de `accept` en milisegundos
    #[arg(long = "accept-timeout-ms", default_value_t = 3)]
    pub accept_timeout_ms: u64,

    /// Timeout de lectura en conexiones establecidas (0 = sin límite)
    #[arg(long = "read-timeout-ms", default_value_t = 0)]
    pub read_timeout_ms: u64,

    // === Contenido ===
    /// Directorio con los archivos estáticos
    #[arg(long = "www-dir", default_value = "./www", env = "H1_WWW_DIR")]
    pub www_dir: PathBuf,

    /// Valor del header `Server`
    #[arg(long = "server-name", default_value = DEFAULT_SERVER_NAME)]
    pub server_name: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use h1_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn accept_timeout(&self) -> Duration {
        Duration::from_millis(self.accept_timeout_ms)
    }

    /// `None` si las lecturas no tienen límite
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Valida la configuración
    ///
    /// Retorna [`ServerError::Config`] con el campo inválido
    pub fn validate(&self) -> Result<()> {
        if self.port <= 1024 {
            return Err(ServerError::Config(format!(
                "port must be > 1024 (got {})",
                self.port
            )));
        }

        if self.backlog < 1 {
            return Err(ServerError::Config("backlog must be >= 1".to_string()));
        }

        if self.workers == 0 {
            return Err(ServerError::Config("workers must be >= 1".to_string()));
        }

        if !(MIN_QUEUE_CAPACITY..=MAX_QUEUE_CAPACITY).contains(&self.queue_capacity) {
            return Err(ServerError::Config(format!(
                "queue capacity must be within {}..={} (got {})",
                MIN_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY, self.queue_capacity
            )));
        }

        if self.accept_timeout_ms == 0 {
            return Err(ServerError::Config("accept timeout must be > 0".to_string()));
        }

        if self.server_name.trim().is_empty() {
            return Err(ServerError::Config("server name must not be empty".to_string()));
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        info!(address = %self.address(), backlog = self.backlog, "network");
        info!(
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            "worker pool"
        );
        info!(
            accept_timeout_ms = self.accept_timeout_ms,
            read_timeout_ms = self.read_timeout_ms,
            "timeouts"
        );
        info!(www_dir = %self.www_dir.display(), server_name = %self.server_name, "content");
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "127.0.0.1".to_string(),
            backlog: 4,
            workers: 4,
            queue_capacity: 16,
            accept_timeout_ms: 3,
            read_timeout_ms: 0,
            www_dir: PathBuf::from("./www"),
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(config: &Config, needle: &str) {
        match config.validate() {
            Err(ServerError::Config(msg)) => assert!(msg.contains(needle), "{}", msg),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.backlog, 4);
        assert_eq!(config.workers, 4);
        assert_eq!(config.queue_capacity, 16);
        assert!(config.server_name.starts_with("h1_server/"));
    }

    #[test]
    fn test_address() {
        let config = Config::default();
        assert_eq!(config.address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_reserved_port() {
        let mut config = Config::default();
        config.port = 80;
        assert_invalid(&config, "port");

        config.port = 1024;
        assert_invalid(&config, "port");

        config.port = 1025;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.workers = 0;
        assert_invalid(&config, "workers");
    }

    #[test]
    fn test_validate_queue_capacity_range() {
        let mut config = Config::default();
        config.queue_capacity = 3;
        assert_invalid(&config, "queue capacity");

        config.queue_capacity = 33;
        assert_invalid(&config, "queue capacity");

        config.queue_capacity = 4;
        assert!(config.validate().is_ok());
        config.queue_capacity = 32;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeouts() {
        let mut config = Config::default();
        config.accept_timeout_ms = 0;
        assert_invalid(&config, "accept timeout");
    }

    #[test]
    fn test_read_timeout_zero_is_unbounded() {
        let mut config = Config::default();
        assert_eq!(config.read_timeout(), None);

        config.read_timeout_ms = 250;
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.accept_timeout(), Duration::from_millis(3));
    }

    #[test]
    fn test_parse_positional_port_and_flags() {
        let config = Config::try_parse_from([
            "h1_server",
            "9090",
            "--workers",
            "2",
            "--queue-capacity",
            "8",
            "--server-name",
            "custom/1.0",
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.workers, 2);
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.server_name, "custom/1.0");
    }

    #[test]
    fn test_parse_rejects_extra_positional() {
        assert!(Config::try_parse_from(["h1_server", "9090", "9091"]).is_err());
    }

    #[test]
    fn test_config_print_summary() {
        // no debe entrar en pánico sin subscriber
        Config::default().print_summary();
    }
}
