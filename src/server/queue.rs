//! # Cola Acotada de Conexiones
//! src/server/queue.rs
//!
//! Cola FIFO thread-safe entre el hilo que escucha (productor) y los
//! workers (consumidores). Un solo `Mutex` protege el estado y un `Condvar`
//! despierta a los workers.
//!
//! `enqueue` nunca bloquea esperando espacio: si la cola está llena falla
//! de inmediato y devuelve la tarea, para que el productor la descarte y
//! siga aceptando.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Capacidad mínima permitida
pub const MIN_QUEUE_CAPACITY: usize = 4;

/// Capacidad máxima permitida
pub const MAX_QUEUE_CAPACITY: usize = 32;

/// Capacidad por defecto
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Error de `enqueue`. Devuelve la tarea rechazada.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError<T> {
    #[error("queue is full")]
    Full(T),

    #[error("queue is closed")]
    Closed(T),
}

impl<T> EnqueueError<T> {
    /// Recupera la tarea rechazada
    pub fn into_inner(self) -> T {
        match self {
            EnqueueError::Full(task) | EnqueueError::Closed(task) => task,
        }
    }
}

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Cola FIFO acotada
#[derive(Debug)]
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    signaler: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Crea una cola. La capacidad se ajusta al rango
    /// [`MIN_QUEUE_CAPACITY`]..=[`MAX_QUEUE_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY);

        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            signaler: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola al final y despierta a un worker.
    ///
    /// Falla sin bloquear si la cola está llena o cerrada.
    pub fn enqueue(&self, task: T) -> Result<(), EnqueueError<T>> {
        let mut state = self.lock();

        if state.closed {
            return Err(EnqueueError::Closed(task));
        }

        if state.items.len() >= self.capacity {
            return Err(EnqueueError::Full(task));
        }

        state.items.push_back(task);
        drop(state);

        self.signaler.notify_one();
        Ok(())
    }

    /// Saca la tarea más antigua, bloqueando mientras la cola esté vacía.
    ///
    /// Retorna `None` solo cuando la cola está cerrada y ya no quedan tareas.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.lock();

        loop {
            if let Some(task) = state.items.pop_front() {
                return Some(task);
            }

            if state.closed {
                return None;
            }

            state = self
                .signaler
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Intenta desencolar sin bloquear
    pub fn try_dequeue(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Cierra la cola y despierta a todos los que esperan
    pub fn close(&self) {
        self.lock().closed = true;
        self.signaler.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Default for BoundedQueue<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
