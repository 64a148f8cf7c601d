// End-to-end relay tests against a fake upstream served by tiny_http on an
// ephemeral port.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use fpl_live_relay::{Relay, RelayServer};
use tiny_http::{Response, Server};

/// Start a fake upstream. `/api/bootstrap-static/` echoes the User-Agent,
/// Cache-Control and Pragma headers it received, `/api/teapot/` answers 418
/// as plain text, anything else 404.
fn spawn_upstream() -> (Arc<Server>, String) {
    let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
    let addr = server.server_addr().to_ip().unwrap();
    let worker = Arc::clone(&server);

    thread::spawn(move || {
        for request in worker.incoming_requests() {
            let header = |name: &'static str| {
                request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv(name))
                    .map(|h| h.value.as_str().to_string())
                    .unwrap_or_default()
            };
            let echoed = format!(
                r#"{{"ua":"{}","cache":"{}","pragma":"{}"}}"#,
                header("User-Agent"),
                header("Cache-Control"),
                header("Pragma")
            );

            let response = match request.url() {
                "/api/bootstrap-static/" => {
                    Response::from_string(echoed)
                        .with_header(
                            tiny_http::Header::from_bytes("Content-Type", "application/json")
                                .unwrap(),
                        )
                }
                "/api/teapot/" => Response::from_string("short and stout").with_status_code(418),
                _ => Response::from_string("nope").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    (server, format!("http://{addr}/api/"))
}

async fn start_relay(base_url: &str) -> fpl_live_relay::RelayHandle {
    let relay = Relay::new(
        base_url,
        "Mozilla/5.0 FPL-Live-Tracker",
        "/api/fpl",
        Duration::from_secs(5),
    )
    .unwrap();
    RelayServer::bind("127.0.0.1:0")
        .unwrap()
        .spawn(Arc::new(relay))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn forwards_body_status_and_headers() {
    let (upstream, base_url) = spawn_upstream();
    let handle = start_relay(&base_url).await;
    let relay_url = format!("http://{}/api/fpl", handle.local_addr());
    let client = reqwest::Client::new();

    let resp = client
        .get(&relay_url)
        .query(&[("path", "bootstrap-static/")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()["access-control-allow-origin"].to_str().unwrap(),
        "*"
    );
    assert_eq!(
        resp.headers()["cache-control"].to_str().unwrap(),
        "no-store"
    );
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body = resp.text().await.unwrap();
    assert_eq!(
        body,
        r#"{"ua":"Mozilla/5.0 FPL-Live-Tracker","cache":"no-cache","pragma":"no-cache"}"#
    );

    handle.shutdown().await;
    upstream.unblock();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mirrors_upstream_error_status_and_content_type() {
    let (upstream, base_url) = spawn_upstream();
    let handle = start_relay(&base_url).await;
    let relay_url = format!("http://{}/api/fpl", handle.local_addr());

    let resp = reqwest::Client::new()
        .get(&relay_url)
        .query(&[("path", "teapot/")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 418);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(resp.text().await.unwrap(), "short and stout");

    handle.shutdown().await;
    upstream.unblock();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_path_never_reaches_upstream() {
    let (upstream, base_url) = spawn_upstream();
    let handle = start_relay(&base_url).await;
    let relay_url = format!("http://{}/api/fpl", handle.local_addr());

    let resp = reqwest::get(&relay_url).await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(
        resp.headers()["access-control-allow-origin"].to_str().unwrap(),
        "*"
    );
    assert_eq!(resp.text().await.unwrap(), "Missing path");

    handle.shutdown().await;
    upstream.unblock();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dead_upstream_becomes_bad_gateway() {
    let handle = start_relay("http://127.0.0.1:9/api/").await;
    let relay_url = format!("http://{}/api/fpl?path=bootstrap-static/", handle.local_addr());

    let resp = reqwest::get(&relay_url).await.unwrap();
    assert_eq!(resp.status().as_u16(), 502);

    handle.shutdown().await;
}
