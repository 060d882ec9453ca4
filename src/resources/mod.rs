//! # Recursos Estáticos
//! src/resources/mod.rs
//!
//! Tabla de archivos cargados en memoria al arrancar. Los handlers la
//! consultan por nombre lógico a través de [`ResourceLookup`] y entregan los
//! bytes compartidos (`Arc<[u8]>`) sin copiarlos.

use crate::error::Result;
use crate::http::MimeType;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Búsqueda de recursos por nombre lógico, de solo lectura
pub trait ResourceLookup: Send + Sync {
    fn lookup(&self, key: &str) -> Option<&StaticResource>;
}

/// Archivo cargado en memoria
#[derive(Debug, Clone)]
pub struct StaticResource {
    key: String,
    mime: MimeType,
    data: Arc<[u8]>,
}

impl StaticResource {
    pub fn new(key: impl Into<String>, mime: MimeType, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            key: key.into(),
            mime,
            data: data.into(),
        }
    }

    /// Lee el archivo completo; el MIME se deduce de la extensión
    pub fn from_file(key: impl Into<String>, path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(Self::new(key, mime_for_path(path), data))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mime(&self) -> MimeType {
        self.mime
    }

    /// Handle compartido al contenido
    pub fn data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Deduce el MIME por extensión. Sin extensión conocida: `Any`.
pub fn mime_for_path(path: &Path) -> MimeType {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("txt") => MimeType::TextPlain,
        Some("html") => MimeType::TextHtml,
        Some("css") => MimeType::TextCss,
        Some("js") => MimeType::TextJavascript,
        Some("json") => MimeType::ApplicationJson,
        _ => MimeType::Any,
    }
}

/// Tabla de recursos indexada por nombre lógico
#[derive(Debug, Default)]
pub struct ResourceTable {
    entries: HashMap<String, StaticResource>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta un recurso. Si la clave existía, devuelve el anterior.
    pub fn insert(&mut self, resource: StaticResource) -> Option<StaticResource> {
        self.entries.insert(resource.key.clone(), resource)
    }

    pub fn load_file(&mut self, key: impl Into<String>, path: &Path) -> Result<()> {
        let resource = StaticResource::from_file(key, path)?;
        debug!(key = resource.key(), bytes = resource.len(), "resource loaded");

        self.insert(resource);
        Ok(())
    }

    /// Carga `names` desde `dir`, usando cada nombre como clave.
    ///
    /// Un archivo que falla se reporta en el log y no impide cargar el
    /// resto. Retorna cuántos se cargaron.
    pub fn load_dir(&mut self, dir: &Path, names: &[&str]) -> usize {
        let mut loaded = 0;

        for name in names {
            let path = dir.join(name);

            match self.load_file(*name, &path) {
                Ok(()) => loaded += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to load resource"),
            }
        }

        loaded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceLookup for ResourceTable {
    fn lookup(&self, key: &str) -> Option<&StaticResource> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("h1_server_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("www/index.html")), MimeType::TextHtml);
        assert_eq!(mime_for_path(Path::new("index.css")), MimeType::TextCss);
        assert_eq!(mime_for_path(Path::new("app.js")), MimeType::TextJavascript);
        assert_eq!(mime_for_path(Path::new("notes.txt")), MimeType::TextPlain);
        assert_eq!(mime_for_path(Path::new("data.json")), MimeType::ApplicationJson);
        assert_eq!(mime_for_path(Path::new("Makefile")), MimeType::Any);
        assert_eq!(mime_for_path(Path::new("image.png")), MimeType::Any);
    }

    #[test]
    fn test_insert_and_lookup_shares_data() {
        let mut table = ResourceTable::new();
        table.insert(StaticResource::new("index.html", MimeType::TextHtml, &b"<h1>hi</h1>"[..]));

        let found = table.lookup("index.html").unwrap();
        assert_eq!(found.mime(), MimeType::TextHtml);
        assert_eq!(found.len(), 11);

        let shared = found.data();
        assert_eq!(&shared[..], found.as_bytes());
        assert!(table.lookup("missing").is_none());
    }

    #[test]
    fn test_load_dir_skips_missing_files() {
        let dir = scratch_dir("load_dir");
        fs::write(dir.join("index.html"), "<p>x</p>").unwrap();
        fs::write(dir.join("index.css"), "p{}").unwrap();

        let mut table = ResourceTable::new();
        let loaded = table.load_dir(&dir, &["index.html", "missing.js", "index.css"]);

        assert_eq!(loaded, 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("index.css").map(StaticResource::mime), Some(MimeType::TextCss));
        assert!(table.lookup("missing.js").is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_file_error() {
        let mut table = ResourceTable::new();
        assert!(table.load_file("nope", Path::new("/definitely/not/here.html")).is_err());
        assert!(table.is_empty());
    }
}
