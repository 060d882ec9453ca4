//! # Señal de Apagado
//! src/server/shutdown.rs
//!
//! Bandera compartida entre el hilo que escucha, los workers y el handler
//! de Ctrl-C. Se revisa entre estados, nunca interrumpe una lectura en curso.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pide el apagado. Idempotente.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = ShutdownToken::new();
        let clone = token.clone();
        assert!(!clone.is_triggered());

        token.trigger();
        token.trigger();
        assert!(clone.is_triggered());
    }
}
