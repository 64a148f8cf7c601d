// Passthrough relay for the FPL API.
//
// Serves `GET <route>?path=<sub-path>`, forwards it to the upstream base URL
// with a fixed User-Agent and caching disabled, and hands back the upstream's
// status, body, and content type with permissive CORS. The HTTP listener is
// `tiny_http` on a blocking thread; each request is forwarded on the tokio
// runtime so slow upstream calls don't hold up the accept loop.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fpl_live_core::config::Config;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA, USER_AGENT};
use thiserror::Error;
use tiny_http::{Header, Method, Response, Server};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Content type used when the upstream omits one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind relay on {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// A fully-buffered response, independent of the HTTP server library.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl RelayReply {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        RelayReply {
            status,
            content_type: "text/plain; charset=utf-8".to_string(),
            body: body.into().into_bytes(),
        }
    }

    /// Convert into a `tiny_http` response carrying the CORS and no-store
    /// headers.
    pub fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body).with_status_code(self.status);
        let headers = [
            ("Content-Type", self.content_type.as_str()),
            ("Access-Control-Allow-Origin", "*"),
            ("Cache-Control", "no-store"),
        ];
        for (name, value) in headers {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => response.add_header(header),
                Err(()) => warn!("Dropping unrepresentable {name} header {value:?}"),
            }
        }
        response
    }
}

/// The upstream's content type, or JSON when it sent none.
pub fn mirror_content_type(upstream: Option<&str>) -> String {
    match upstream {
        Some(ct) if !ct.is_empty() => ct.to_string(),
        _ => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Request parsing
// ---------------------------------------------------------------------------

/// Decode the first `name` parameter from a request URL's query string.
/// Keys and values are both percent-decoded, and `+` is treated as a space,
/// as browsers encode it.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if decode_component(key)? != name {
            return None;
        }
        decode_component(value)
    })
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|v| v.into_owned())
}

fn route_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

pub struct Relay {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
    route: String,
}

impl Relay {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
        route: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Relay {
            http,
            base_url: base_url.into(),
            user_agent: user_agent.into(),
            route: route.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        Relay::new(
            config.upstream.base_url.clone(),
            config.upstream.user_agent.clone(),
            config.relay.route.clone(),
            Duration::from_secs(config.upstream.timeout_secs),
        )
    }

    /// Route a request: 405 for non-GET, 404 off-route, 400 without a
    /// `path`, otherwise forward.
    pub async fn handle(&self, method: &Method, url: &str) -> RelayReply {
        if *method != Method::Get {
            return RelayReply::text(405, "Method not allowed");
        }
        if route_of(url) != self.route {
            return RelayReply::text(404, "Not found");
        }
        match query_param(url, "path").filter(|p| !p.is_empty()) {
            Some(path) => self.forward(&path).await,
            None => RelayReply::text(400, "Missing path"),
        }
    }

    /// Fetch `<base_url><path>` and mirror it. Network failures become 502.
    pub async fn forward(&self, path: &str) -> RelayReply {
        let target = format!("{}{}", self.base_url, path);
        let result = self
            .http
            .get(&target)
            .header(USER_AGENT, &self.user_agent)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await;

        let upstream = match result {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Upstream request to {target} failed: {e}");
                return RelayReply::text(502, format!("Upstream request failed: {e}"));
            }
        };

        let status = upstream.status().as_u16();
        let content_type = mirror_content_type(
            upstream
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        match upstream.bytes().await {
            Ok(body) => RelayReply {
                status,
                content_type,
                body: body.to_vec(),
            },
            Err(e) => {
                warn!("Reading upstream body from {target} failed: {e}");
                RelayReply::text(502, format!("Upstream body read failed: {e}"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A bound, not-yet-serving listener.
pub struct RelayServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

impl RelayServer {
    /// Bind on `addr` (e.g. `127.0.0.1:8787`; port 0 picks a free port).
    pub fn bind(addr: &str) -> Result<Self, RelayError> {
        let server = Server::http(addr).map_err(|e| RelayError::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;
        let local = server.server_addr().to_ip().ok_or_else(|| RelayError::Bind {
            addr: addr.to_string(),
            message: "listener has no IP address".to_string(),
        })?;
        Ok(RelayServer {
            server: Arc::new(server),
            addr: local,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start serving. Must be called from inside a tokio runtime.
    pub fn spawn(self, relay: Arc<Relay>) -> RelayHandle {
        info!("Relay listening on http://{}", self.addr);
        let runtime = Handle::current();
        let server = Arc::clone(&self.server);
        let task = tokio::task::spawn_blocking(move || accept_loop(&server, relay, &runtime));
        RelayHandle {
            server: self.server,
            addr: self.addr,
            task: Some(task),
        }
    }
}

/// A running relay. Dropping it stops the accept loop without waiting;
/// `shutdown` also waits for the loop to exit.
pub struct RelayHandle {
    server: Arc<Server>,
    addr: SocketAddr,
    task: Option<JoinHandle<()>>,
}

impl RelayHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and wait for the accept loop to exit.
    pub async fn shutdown(mut self) {
        self.server.unblock();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Relay accept loop ended abnormally: {e}");
            }
        }
        info!("Relay on {} stopped", self.addr);
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        // The accept loop sits on a blocking thread, which the runtime waits
        // for on shutdown.
        if self.task.is_some() {
            self.server.unblock();
        }
    }
}

fn accept_loop(server: &Server, relay: Arc<Relay>, runtime: &Handle) {
    for request in server.incoming_requests() {
        let relay = Arc::clone(&relay);
        runtime.spawn(async move {
            let method = request.method().clone();
            let url = request.url().to_string();
            let reply = relay.handle(&method, &url).await;
            info!("{method} {url} -> {}", reply.status);

            let responded =
                tokio::task::spawn_blocking(move || request.respond(reply.into_response())).await;
            match responded {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Failed to write relay response for {url}: {e}"),
                Err(e) => warn!("Relay response task failed for {url}: {e}"),
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
