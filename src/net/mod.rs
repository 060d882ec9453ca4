//! # Módulo de Red
//! src/net/mod.rs
//!
//! Primitivas bloqueantes sobre sockets TCP: escucha/aceptación y lectura
//! por líneas o por cantidad fija de bytes, apoyadas en [`crate::buffer::Buffer`].

pub mod socket;

pub use socket::{is_accept_timeout, Connection, Listener};

/// Par de conexiones por loopback: (lado servidor envuelto, lado cliente crudo)
#[cfg(test)]
pub(crate) fn connected_pair() -> (Connection, std::net::TcpStream) {
    use std::net::{TcpListener, TcpStream};

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).unwrap();
    let (server, peer) = listener.accept().unwrap();

    (Connection::from_stream(server, Some(peer)).unwrap(), client)
}
