use std::sync::Arc;

use anyhow::Context as _;
use percent_encoding::percent_decode_str;

use crate::{
    encode::sink::EncodedImage,
    foundation::error::PlumageError,
    service::thumbnail::{CACHE_CONTROL, ThumbnailService},
};

/// Path prefix the identifier follows.
pub const ROUTE_PREFIX: &str = "/thumb/";

/// What to send back when the identifier itself is malformed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadIdPolicy {
    /// `400 Bad Request` with a short text body.
    #[default]
    Status,
    /// The default image, uncached.
    DefaultImage,
}

/// Server settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServeOpts {
    /// Listen address, `host:port`.
    pub addr: String,
    /// Worker threads accepting requests.
    pub workers: usize,
    /// Populate the asset store before accepting connections.
    pub eager: bool,
    /// Response to malformed identifiers.
    pub bad_id: BadIdPolicy,
}

impl Default for ServeOpts {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            workers: std::thread::available_parallelism().map_or(4, |n| n.get()),
            eager: false,
            bad_id: BadIdPolicy::Status,
        }
    }
}

/// Transport-independent HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// Status code.
    pub status: u16,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// `Cache-Control` header value, if any.
    pub cache_control: Option<&'static str>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Reply {
    fn image(img: EncodedImage, cache_control: Option<&'static str>) -> Self {
        Self {
            status: 200,
            content_type: img.content_type(),
            cache_control,
            body: img.bytes,
        }
    }

    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            cache_control: None,
            body: body.into().into_bytes(),
        }
    }

    fn into_response(self) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
        let mut resp = tiny_http::Response::from_data(self.body).with_status_code(self.status);
        let headers = [
            ("Content-Type", Some(self.content_type)),
            ("Cache-Control", self.cache_control),
        ];
        for (name, value) in headers {
            let Some(value) = value else {
                continue;
            };
            if let Ok(h) = tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                resp.add_header(h);
            }
        }
        resp
    }
}

/// Answer one request.
///
/// The path is percent-decoded before matching. `HEAD` is answered like `GET`; the transport
/// drops the body and keeps the headers.
pub fn route(service: &ThumbnailService, policy: BadIdPolicy, method: &str, url: &str) -> Reply {
    let raw = url.split(['?', '#']).next().unwrap_or_default();
    let path = match percent_decode_str(raw).decode_utf8() {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(url, error = %err, "undecodable path");
            return Reply::text(400, "path is not valid utf-8");
        }
    };
    let Some(identifier) = path.strip_prefix(ROUTE_PREFIX) else {
        return Reply::text(404, "not found");
    };
    if !matches!(method, "GET" | "HEAD") {
        return Reply::text(405, "method not allowed");
    }

    match service.thumbnail(identifier) {
        Ok(img) => {
            tracing::debug!(identifier, bytes = img.bytes.len(), "served thumbnail");
            Reply::image(img, Some(CACHE_CONTROL))
        }
        Err(PlumageError::Decode(err)) => {
            tracing::debug!(identifier, error = %err, "bad identifier");
            match policy {
                BadIdPolicy::Status => Reply::text(400, err.to_string()),
                BadIdPolicy::DefaultImage => match service.default_thumbnail() {
                    Ok(img) => Reply::image(img, None),
                    Err(err) => {
                        tracing::error!(error = %err, "default image unavailable");
                        Reply::text(500, "internal error")
                    }
                },
            }
        }
        Err(PlumageError::Render(err)) => {
            // Variant count and identifier alphabet disagree; the assets are misconfigured.
            tracing::error!(identifier, error = %err, "refusing to serve partial thumbnail");
            Reply::text(500, "internal error")
        }
        Err(err) => {
            tracing::error!(identifier, error = %err, "thumbnail failed");
            Reply::text(500, "internal error")
        }
    }
}

/// Bind `opts.addr` and serve until the listener fails.
pub fn serve(service: Arc<ThumbnailService>, opts: &ServeOpts) -> anyhow::Result<()> {
    if opts.eager {
        service
            .loader()
            .ensure_loaded()
            .context("preload assets")?;
    }

    let server = tiny_http::Server::http(opts.addr.as_str())
        .map_err(|e| anyhow::anyhow!("bind '{}': {e}", opts.addr))?;
    let workers = opts.workers.max(1);
    tracing::info!(addr = %opts.addr, workers, prefix = ROUTE_PREFIX, "server running");

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let server = &server;
            let service = service.as_ref();
            let policy = opts.bad_id;
            scope.spawn(move || worker_loop(worker, server, service, policy));
        }
    });
    Ok(())
}

fn worker_loop(
    worker: usize,
    server: &tiny_http::Server,
    service: &ThumbnailService,
    policy: BadIdPolicy,
) {
    loop {
        let request = match server.recv() {
            Ok(rq) => rq,
            Err(err) => {
                tracing::error!(worker, error = %err, "accept failed, worker exiting");
                return;
            }
        };

        let reply = route(service, policy, request.method().as_str(), request.url());
        let status = reply.status;
        if let Err(err) = request.respond(reply.into_response()) {
            tracing::warn!(worker, status, error = %err, "failed to write response");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/http.rs"]
mod tests;
