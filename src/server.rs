//! HTTP surface for devices polling the display.
//!
//! Routing is a pure function of the request line ([`App::handle`]) so it can
//! be exercised without sockets; [`App::serve`] only moves bytes between
//! `tiny_http` and that function.

use std::sync::Arc;

use serde_json::json;
use tiny_http::{Header, Response, Server};

use crate::cache::CachedProvider;
use crate::rendering::Renderer;
use crate::{Error, Result};

/// A response ready to be written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub headers: Vec<(&'static str, String)>,
}

impl Reply {
    fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string().into_bytes(),
            headers: Vec::new(),
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.as_bytes().to_vec(),
            headers: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Shared request-handling state.
pub struct App {
    renderer: Renderer,
    provider: CachedProvider,
    refresh_interval: u64,
}

impl App {
    pub fn new(renderer: Renderer, provider: CachedProvider, refresh_interval: u64) -> Self {
        Self {
            renderer,
            provider,
            refresh_interval,
        }
    }

    /// Route one request. `if_none_match` is the raw `If-None-Match` value.
    pub fn handle(&self, method: &str, url: &str, if_none_match: Option<&str>) -> Reply {
        if !method.eq_ignore_ascii_case("GET") && !method.eq_ignore_ascii_case("HEAD") {
            return Reply::text(405, "Method Not Allowed");
        }

        let path = url.split(['?', '#']).next().unwrap_or("/");
        match path {
            "/" | "/display.bmp" => self.display(if_none_match),
            "/api/fact" => match self.provider.get() {
                Some(record) => match serde_json::to_value(&record) {
                    Ok(value) => Reply::json(200, value),
                    Err(e) => Reply::json(500, json!({ "error": e.to_string() })),
                },
                None => Reply::json(503, json!({ "error": "No Chuck Norris fact available" })),
            },
            "/health" => Reply::json(
                200,
                json!({ "status": "ok", "refresh_interval": self.refresh_interval }),
            ),
            _ => Reply::text(404, "Not Found"),
        }
    }

    fn display(&self, if_none_match: Option<&str>) -> Reply {
        let frame = self.renderer.render(self.provider.get().as_ref());
        let etag = format!("\"{}\"", frame.digest());
        let headers = vec![
            ("ETag", etag.clone()),
            ("Cache-Control", format!("max-age={}", self.refresh_interval)),
        ];

        if if_none_match.map(|v| v.trim() == etag).unwrap_or(false) {
            log::debug!("Display unchanged, answering 304");
            return Reply {
                status: 304,
                content_type: "image/bmp",
                body: Vec::new(),
                headers,
            };
        }

        Reply {
            status: 200,
            content_type: "image/bmp",
            body: frame.bmp_data,
            headers,
        }
    }

    /// Bind `addr` and answer requests on `workers` threads until the
    /// listener fails.
    pub fn serve(self: Arc<Self>, addr: &str, workers: usize) -> Result<()> {
        let server = Server::http(addr)
            .map_err(|e| Error::NetworkError(format!("Failed to bind {}: {}", addr, e)))?;
        let server = Arc::new(server);
        log::info!("Serving display on http://{}", addr);

        let handles: Vec<_> = (0..workers.max(1))
            .map(|_| {
                let server = Arc::clone(&server);
                let app = Arc::clone(&self);
                std::thread::spawn(move || app.worker(&server))
            })
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                log::error!("Server worker panicked");
            }
        }
        Ok(())
    }

    fn worker(&self, server: &Server) {
        for request in server.incoming_requests() {
            let method = request.method().to_string();
            let url = request.url().to_string();
            let if_none_match = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("If-None-Match"))
                .map(|h| h.value.as_str().to_string());

            let reply = self.handle(&method, &url, if_none_match.as_deref());
            log::debug!("{} {} -> {}", method, url, reply.status);

            let mut response = Response::from_data(reply.body).with_status_code(reply.status);
            for (name, value) in
                std::iter::once(("Content-Type", reply.content_type.to_string())).chain(reply.headers)
            {
                match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                    Ok(header) => response.add_header(header),
                    Err(()) => log::warn!("Dropping malformed header {}", name),
                }
            }
            if let Err(e) = request.respond(response) {
                log::warn!("Failed to send response for {}: {}", url, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FactId, FactRecord};
    use crate::rendering::font::BuiltinSource;
    use crate::DisplayConfig;
    use std::time::Duration;

    fn app(ok: bool) -> App {
        let provider = CachedProvider::new(
            Box::new(move || -> crate::Result<FactRecord> {
                if ok {
                    Ok(FactRecord::new(
                        "Chuck Norris counted to infinity. Twice.",
                        FactId::Text("inf".into()),
                        None,
                    ))
                } else {
                    Err(Error::NetworkError("offline".into()))
                }
            }),
            Duration::from_secs(60),
        );
        let renderer = Renderer::new(DisplayConfig::default(), Arc::new(BuiltinSource), None);
        App::new(renderer, provider, 900)
    }

    #[test]
    fn display_routes_serve_bmp() {
        let app = app(true);
        for path in ["/", "/display.bmp", "/display.bmp?t=1"] {
            let reply = app.handle("GET", path, None);
            assert_eq!(reply.status, 200);
            assert_eq!(reply.content_type, "image/bmp");
            assert_eq!(&reply.body[..2], b"BM");
            assert_eq!(reply.header("cache-control"), Some("max-age=900"));
        }
    }

    #[test]
    fn matching_etag_is_not_modified() {
        let app = app(true);
        let first = app.handle("GET", "/", None);
        let etag = first.header("ETag").unwrap().to_string();
        let second = app.handle("GET", "/", Some(&etag));
        assert_eq!(second.status, 304);
        assert!(second.body.is_empty());
    }

    #[test]
    fn fact_endpoint_reports_unavailability() {
        let reply = app(false).handle("GET", "/api/fact", None);
        assert_eq!(reply.status, 503);
        let body: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(body["error"], "No Chuck Norris fact available");

        let reply = app(true).handle("GET", "/api/fact", None);
        assert_eq!(reply.status, 200);
        let body: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(body["fact_id"], "inf");
        assert_eq!(body["status"], "ok");
    }

    #[test]
    fn provider_failure_still_serves_an_image() {
        let reply = app(false).handle("GET", "/", None);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.len(), 62 + 100 * 480);
    }

    #[test]
    fn health_and_unknown_routes() {
        let app = app(true);
        let reply = app.handle("GET", "/health", None);
        let body: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(body, serde_json::json!({"status": "ok", "refresh_interval": 900}));

        assert_eq!(app.handle("GET", "/nope", None).status, 404);
        assert_eq!(app.handle("POST", "/", None).status, 405);
    }
}
