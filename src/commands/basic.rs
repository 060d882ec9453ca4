//! # Comandos Básicos
//! src/commands/basic.rs
//!
//! Implementación de los comandos del servidor:
//! - `/`: página principal (`index.html`)
//! - `/index.css`: hoja de estilos
//! - `/status`: estado y métricas del servidor en JSON
//! - `/echo`: devuelve el body del request

use crate::http::{MimeType, Request, Response};
use crate::router::{HandleError, HandlerContext};
use serde_json::json;
use std::sync::Arc;

/// Nombre lógico de la página principal
pub const INDEX_HTML: &str = "index.html";

/// Nombre lógico de la hoja de estilos
pub const INDEX_CSS: &str = "index.css";

/// Llena la respuesta con un recurso de la tabla, sin copiar sus bytes
fn serve_resource(ctx: &HandlerContext, key: &str, res: &mut Response) -> Result<(), HandleError> {
    let resource = ctx.resources().lookup(key).ok_or(HandleError::General)?;
    res.with_payload(resource.mime(), resource.data());
    Ok(())
}

/// Handler para `GET /`
pub fn root_handler(ctx: &HandlerContext, _req: &Request, res: &mut Response) -> Result<(), HandleError> {
    serve_resource(ctx, INDEX_HTML, res)
}

/// Handler para `GET /index.css`
pub fn index_css_handler(ctx: &HandlerContext, _req: &Request, res: &mut Response) -> Result<(), HandleError> {
    serve_resource(ctx, INDEX_CSS, res)
}

/// Handler para `GET /status`
///
/// # Ejemplo de response
/// ```json
/// {
///   "status": "running",
///   "server": "h1_server/0.1.0",
///   "metrics": { "uptime_seconds": 12, "connections": { ... }, ... }
/// }
/// ```
pub fn status_handler(ctx: &HandlerContext, _req: &Request, res: &mut Response) -> Result<(), HandleError> {
    let body = json!({
        "status": "running",
        "server": res.server_name(),
        "metrics": ctx.metrics().snapshot(),
    });

    let text = serde_json::to_vec_pretty(&body).map_err(|_| HandleError::General)?;
    res.with_payload(MimeType::ApplicationJson, Arc::from(text));

    Ok(())
}

/// Handler para `POST /echo`
///
/// Responde con el mismo body que recibió, como `text/plain`.
pub fn echo_handler(_ctx: &HandlerContext, req: &Request, res: &mut Response) -> Result<(), HandleError> {
    let body = req.body().unwrap_or_default();
    res.with_payload(MimeType::TextPlain, Arc::from(body));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::metrics::MetricsCollector;
    use crate::resources::{ResourceTable, StaticResource};

    fn context() -> HandlerContext {
        let mut table = ResourceTable::new();
        table.insert(StaticResource::new(INDEX_HTML, MimeType::TextHtml, &b"<h1>index</h1>"[..]));
        HandlerContext::new(Arc::new(table), MetricsCollector::new())
    }

    fn response() -> Response {
        Response::new(Arc::from("test/1.0"))
    }

    #[test]
    fn test_root_serves_index() {
        let mut res = response();
        root_handler(&context(), &Request::new(), &mut res).unwrap();

        assert_eq!(res.mime(), MimeType::TextHtml);
        assert_eq!(res.content_len(), 14);
        assert_eq!(res.body(), Some(&b"<h1>index</h1>"[..]));
    }

    #[test]
    fn test_missing_resource_is_general_error() {
        let mut res = response();
        assert_eq!(
            index_css_handler(&context(), &Request::new(), &mut res),
            Err(HandleError::General)
        );
    }

    #[test]
    fn test_status_is_json() {
        let ctx = context();
        ctx.metrics().record_accepted();

        let mut res = response();
        status_handler(&ctx, &Request::new(), &mut res).unwrap();

        assert_eq!(res.mime(), MimeType::ApplicationJson);
        let value: serde_json::Value = serde_json::from_slice(res.body().unwrap()).unwrap();
        assert_eq!(value["status"], "running");
        assert_eq!(value["server"], "test/1.0");
        assert_eq!(value["metrics"]["connections"]["accepted"], 1);
    }

    #[test]
    fn test_echo_returns_body() {
        let mut req = Request::new();
        req.set_method(Method::Post);
        req.set_body(b"ping".to_vec());

        let mut res = response();
        echo_handler(&context(), &req, &mut res).unwrap();

        assert_eq!(res.mime(), MimeType::TextPlain);
        assert_eq!(res.body(), Some(&b"ping"[..]));
    }

    #[test]
    fn test_echo_without_body() {
        let mut res = response();
        echo_handler(&context(), &Request::new(), &mut res).unwrap();
        assert_eq!(res.content_len(), 0);
    }
}
