//! # Buffer de Bytes
//! src/buffer.rs
//!
//! Almacén de bytes con capacidad fija y dos cursores independientes:
//!
//! ```text
//!  0          read_pos        write_pos        capacity
//!  |-- leído --|-- sin leer ----|-- libre --------|
//! ```
//!
//! Invariante: `0 <= read_pos <= write_pos <= capacity`.
//!
//! Escribir nunca crece el buffer de forma implícita: si no hay espacio la
//! operación falla y el llamador decide si llamar a [`Buffer::grow`].
//! Todas las operaciones que devuelven spans entregan un `Vec<u8>` nuevo
//! cuya propiedad pasa al llamador.

use thiserror::Error;

/// Capacidad usada cuando se pide un buffer de tamaño 0
pub const MIN_BUFFER_SIZE: usize = 512;

/// Techo para [`Buffer::grow`]
pub const MAX_BUFFER_SIZE: usize = 1 << 20;

/// Errores de las operaciones del buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// No queda espacio libre suficiente para escribir
    #[error("buffer is full")]
    Full,

    /// Se pidieron más bytes de los que quedan sin leer
    #[error("not enough unread bytes")]
    Insufficient,

    /// No hay bytes sin leer
    #[error("buffer is drained")]
    Drained,

    /// Capacidad pedida menor/igual a la actual o sobre el techo
    #[error("invalid capacity {0}")]
    InvalidCapacity(usize),
}

/// Buffer con cursores de lectura y escritura
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    data: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
}

impl Buffer {
    /// Crea un buffer lleno de ceros con la capacidad pedida
    /// (o [`MIN_BUFFER_SIZE`] si se pide 0).
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity > 0 { capacity } else { MIN_BUFFER_SIZE };

        Self {
            data: vec![0; capacity],
            read_pos: 0,
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Bytes escritos y todavía no leídos
    pub fn remaining(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// `write_pos == capacity`
    pub fn is_full(&self) -> bool {
        self.write_pos >= self.data.len()
    }

    /// No quedan bytes sin leer
    pub fn is_drained(&self) -> bool {
        self.read_pos >= self.write_pos
    }

    /// Vista de los bytes escritos, desde el inicio del almacenamiento
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.write_pos]
    }

    /// Vista de los bytes sin leer
    pub fn unread(&self) -> &[u8] {
        &self.data[self.read_pos..self.write_pos]
    }

    /// Crece el almacenamiento a `new_capacity`, rellenando con ceros la
    /// región nueva. Los cursores se conservan.
    ///
    /// Nunca encoge: rechaza capacidades menores o iguales a la actual y
    /// las que superan [`MAX_BUFFER_SIZE`].
    pub fn grow(&mut self, new_capacity: usize) -> Result<(), BufferError> {
        if new_capacity <= self.data.len() || new_capacity > MAX_BUFFER_SIZE {
            return Err(BufferError::InvalidCapacity(new_capacity));
        }

        self.data.resize(new_capacity, 0);
        Ok(())
    }

    /// Pone todos los bytes en cero y reinicia ambos cursores, sin realocar
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// Desprende el almacenamiento y deja el buffer vacío (capacidad 0).
    pub fn take(&mut self) -> Vec<u8> {
        self.read_pos = 0;
        self.write_pos = 0;
        std::mem::take(&mut self.data)
    }

    /// Escribe un byte
    pub fn put(&mut self, byte: u8) -> Result<(), BufferError> {
        if self.is_full() {
            return Err(BufferError::Full);
        }

        self.data[self.write_pos] = byte;
        self.write_pos += 1;

        Ok(())
    }

    /// Escribe todos los bytes o ninguno
    pub fn put_span(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        let space_left = self.data.len() - self.write_pos;

        if bytes.len() > space_left {
            return Err(BufferError::Full);
        }

        let end = self.write_pos + bytes.len();
        self.data[self.write_pos..end].copy_from_slice(bytes);
        self.write_pos = end;

        Ok(())
    }

    /// Lee un byte
    pub fn get(&mut self) -> Result<u8, BufferError> {
        if self.is_drained() {
            return Err(BufferError::Drained);
        }

        let byte = self.data[self.read_pos];
        self.read_pos += 1;

        Ok(byte)
    }

    /// Lee exactamente `count` bytes
    pub fn get_span(&mut self, count: usize) -> Result<Vec<u8>, BufferError> {
        if count > self.remaining() {
            return Err(BufferError::Insufficient);
        }

        let end = self.read_pos + count;
        let span = self.data[self.read_pos..end].to_vec();
        self.read_pos = end;

        Ok(span)
    }

    /// Busca `delim` desde `read_pos` y devuelve los bytes anteriores,
    /// dejando el cursor justo después del delimitador.
    ///
    /// Si el delimitador no aparece antes del cursor de escritura se devuelve
    /// todo lo que queda sin leer y el buffer queda drenado. Retorna `None`
    /// solo si ya estaba drenado.
    pub fn read_delim(&mut self, delim: u8) -> Option<Vec<u8>> {
        if self.is_drained() {
            return None;
        }

        let unread = self.unread();

        match unread.iter().position(|&b| b == delim) {
            Some(count) => {
                let span = unread[..count].to_vec();
                self.read_pos += count + 1;
                Some(span)
            }
            None => {
                let span = unread.to_vec();
                self.read_pos = self.write_pos;
                Some(span)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_min_size_for_zero() {
        let buf = Buffer::new(0);
        assert_eq!(buf.capacity(), MIN_BUFFER_SIZE);
        assert!(buf.is_drained());
        assert!(!buf.is_full());
    }

    #[test]
    fn test_put_span_get_span() {
        let mut buf = Buffer::new(16);
        buf.put_span(b"hello world").unwrap();
        assert_eq!(buf.write_pos(), 11);

        assert_eq!(buf.get_span(5).unwrap(), b"hello");
        assert_eq!(buf.get().unwrap(), b' ');
        assert_eq!(buf.get_span(5).unwrap(), b"world");
        assert!(buf.is_drained());
    }

    #[test]
    fn test_put_fails_without_growing() {
        let mut buf = Buffer::new(4);
        buf.put_span(b"abcd").unwrap();
        assert!(buf.is_full());
        assert_eq!(buf.put(b'e'), Err(BufferError::Full));
        assert_eq!(buf.capacity(), 4);

        // put_span es todo-o-nada
        let mut buf = Buffer::new(4);
        buf.put(b'x').unwrap();
        assert_eq!(buf.put_span(b"abcd"), Err(BufferError::Full));
        assert_eq!(buf.write_pos(), 1);
    }

    #[test]
    fn test_get_fails_when_not_enough_bytes() {
        let mut buf = Buffer::new(8);
        assert_eq!(buf.get(), Err(BufferError::Drained));

        buf.put_span(b"ab").unwrap();
        assert_eq!(buf.get_span(3), Err(BufferError::Insufficient));
        assert_eq!(buf.read_pos(), 0);
    }

    #[test]
    fn test_read_delim_stops_after_delimiter() {
        let mut buf = Buffer::new(16);
        buf.put_span(b"foo bar\0").unwrap();

        assert_eq!(buf.read_delim(b' ').unwrap(), b"foo");
        assert_eq!(buf.read_pos(), 4);
        assert_eq!(buf.read_delim(0).unwrap(), b"bar");
        assert!(buf.is_drained());
        assert_eq!(buf.read_delim(b' '), None);
    }

    #[test]
    fn test_read_delim_without_delimiter_returns_rest() {
        // Sin delimitador no hay error distinto: se devuelve lo que queda.
        let mut buf = Buffer::new(16);
        buf.put_span(b"nodelim").unwrap();

        assert_eq!(buf.read_delim(b' ').unwrap(), b"nodelim");
        assert!(buf.is_drained());
    }

    #[test]
    fn test_grow_keeps_cursors_and_zero_fills() {
        let mut buf = Buffer::new(4);
        buf.put_span(b"abc").unwrap();
        buf.get().unwrap();

        buf.grow(8).unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.read_pos(), 1);
        assert_eq!(buf.write_pos(), 3);
        assert_eq!(buf.unread(), b"bc");

        buf.put_span(b"defgh").unwrap();
        assert!(buf.is_full());
    }

    #[test]
    fn test_grow_rejects_shrink_and_ceiling() {
        let mut buf = Buffer::new(8);
        assert_eq!(buf.grow(8), Err(BufferError::InvalidCapacity(8)));
        assert_eq!(buf.grow(2), Err(BufferError::InvalidCapacity(2)));
        assert!(buf.grow(MAX_BUFFER_SIZE + 1).is_err());
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buf = Buffer::new(8);
        buf.put_span(b"abcdef").unwrap();
        buf.get_span(2).unwrap();

        buf.clear();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.read_pos(), 0);
        assert_eq!(buf.write_pos(), 0);
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn test_take_detaches_storage() {
        let mut buf = Buffer::new(4);
        buf.put_span(b"ab").unwrap();

        let data = buf.take();
        assert_eq!(&data[..2], b"ab");
        assert_eq!(data.len(), 4);
        assert_eq!(buf.capacity(), 0);
        assert!(buf.is_full());
        assert!(buf.is_drained());
    }
}
