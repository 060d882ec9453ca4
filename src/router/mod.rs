//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo mapea paths HTTP a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → RouteMap::get(path) → Handler::handle → Response
//! ```
//!
//! El mapa es un árbol binario de búsqueda ordenado por comparación exacta
//! de strings (sin comodines ni parámetros). Solo se escribe durante el
//! arranque, antes de lanzar los workers; después se comparte detrás de un
//! `Arc` y las búsquedas concurrentes no necesitan lock.
//!
//! Si no hay handler para un path, el worker responde 404 Not Found.

pub mod handler;

pub use handler::{HandleError, Handler, HandlerContext, HandlerFn};

use crate::error::{Result, ServerError};
use std::cmp::Ordering;

/// Nodo del árbol
#[derive(Debug)]
struct RouteNode {
    path: &'static str,
    handler: Handler,
    left: Option<Box<RouteNode>>,
    right: Option<Box<RouteNode>>,
}

impl RouteNode {
    fn new(path: &'static str, handler: Handler) -> Self {
        Self {
            path,
            handler,
            left: None,
            right: None,
        }
    }
}

/// Mapa de path → handler
#[derive(Debug, Default)]
pub struct RouteMap {
    root: Option<Box<RouteNode>>,
    count: usize,
}

impl RouteMap {
    /// Crea un mapa vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una ruta.
    ///
    /// Un path repetido se rechaza con [`ServerError::DuplicateRoute`] y el
    /// árbol queda intacto.
    ///
    /// # Ejemplo
    /// ```
    /// use h1_server::http::{Method, MimeType, Request, Response};
    /// use h1_server::router::{HandleError, Handler, HandlerContext, RouteMap};
    ///
    /// fn hello(_: &HandlerContext, _: &Request, _: &mut Response) -> Result<(), HandleError> {
    ///     Ok(())
    /// }
    ///
    /// let mut routes = RouteMap::new();
    /// routes.put("/hello", Handler::new(Method::Get, MimeType::Any, hello)).unwrap();
    /// assert!(routes.put("/hello", Handler::new(Method::Post, MimeType::Any, hello)).is_err());
    /// ```
    pub fn put(&mut self, path: &'static str, handler: Handler) -> Result<()> {
        let mut cursor = &mut self.root;

        while let Some(node) = cursor {
            cursor = match path.cmp(node.path) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return Err(ServerError::DuplicateRoute(path.to_string())),
            };
        }

        *cursor = Some(Box::new(RouteNode::new(path, handler)));
        self.count += 1;

        Ok(())
    }

    /// Busca el handler de `path` (comparación exacta)
    pub fn get(&self, path: &str) -> Option<&Handler> {
        self.lookup(path).map(|(_, handler)| handler)
    }

    /// Como [`RouteMap::get`], pero también entrega la clave registrada
    pub fn lookup(&self, path: &str) -> Option<(&'static str, &Handler)> {
        let mut cursor = self.root.as_deref();

        while let Some(node) = cursor {
            cursor = match path.cmp(node.path) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some((node.path, &node.handler)),
            };
        }

        None
    }

    /// Cantidad de rutas registradas
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
