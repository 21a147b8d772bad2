use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Router;
use crawltest::catalog::{Page, Route};
use futures::StreamExt;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::limiter::{Decision, RateLimiter};
use crate::render;

pub struct AppState {
    pub config: ServerConfig,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let limiter = RateLimiter::new(config.rate_limit);
        Self { config, limiter }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let pkg = ServeDir::new(&state.config.dist_dir);
    Router::new()
        .nest_service("/pkg", pkg)
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn server_time() -> String {
    chrono::Local::now()
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// Peer address, else the first `X-Forwarded-For` hop, else `unknown`.
fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

async fn dispatch(State(state): State<Arc<AppState>>, req: Request) -> Response {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, HEAD")]).into_response();
    }

    let bundle = state.config.web_bundle.as_str();
    let path = req.uri().path();
    let Some(route) = Route::parse(path) else {
        debug!(path, "no route");
        return (StatusCode::NOT_FOUND, Html(render::not_found(path, bundle))).into_response();
    };

    match route {
        Route::Page(Page::Home) => Html(render::home(bundle)).into_response(),
        Route::Page(Page::ServerSide) => Html(render::server_side(&server_time(), bundle)).into_response(),
        Route::Page(Page::ClientSide) => Html(render::client_side(bundle)).into_response(),
        Route::Page(Page::Hybrid) => hybrid_stream(&state),
        Route::Page(Page::Navigation) => Html(render::navigation(bundle)).into_response(),
        Route::Page(Page::ContentVisibility) => Html(render::content_visibility(bundle)).into_response(),
        Route::Page(Page::Technical) => Html(render::technical(bundle)).into_response(),
        Route::DeepLevel(level) => Html(render::deep_level(level, bundle)).into_response(),
        Route::Redirect => Redirect::temporary(Page::Home.path()).into_response(),
        Route::IframeContent => Html(render::iframe_content()).into_response(),
        Route::RateLimited(n) => {
            let client = client_key(&req);
            match state.limiter.check(&client) {
                Decision::Allowed { remaining } => {
                    Html(render::rate_limited(n, remaining, bundle)).into_response()
                }
                Decision::Limited { retry_after_secs } => {
                    info!(%client, page = n, retry_after_secs, "rate limited");
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        [(header::RETRY_AFTER, retry_after_secs.to_string())],
                        Html(render::too_many_requests(retry_after_secs, bundle)),
                    )
                        .into_response()
                }
            }
        }
    }
}

/// Chunks of the hybrid page, each with the wait before it is sent.
fn hybrid_chunks(state: &AppState) -> Vec<(Duration, String)> {
    let parts = render::hybrid(&server_time(), &state.config.web_bundle);
    let unit = state.config.stream_unit();

    let mut chunks = vec![(Duration::ZERO, parts.head)];
    // Section delays are measured from the start of the response.
    let mut elapsed = 0;
    for (delay_units, html) in parts.sections {
        let wait = delay_units.saturating_sub(elapsed);
        elapsed = elapsed.max(delay_units);
        chunks.push((unit * wait, html));
    }
    chunks.push((Duration::ZERO, parts.tail));
    chunks
}

fn hybrid_stream(state: &AppState) -> Response {
    let chunks = hybrid_chunks(state);
    let body = futures::stream::iter(chunks).then(|(wait, html)| async move {
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        Ok::<_, Infallible>(html)
    });
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    fn app_with(config: ServerConfig) -> Router {
        router(Arc::new(AppState::new(config)))
    }

    fn app() -> Router {
        app_with(ServerConfig::default())
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_from(uri: &str, ip: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri(uri)
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn every_html_route_renders() {
        for route in Route::all() {
            if matches!(route, Route::Redirect | Route::RateLimited(_)) {
                continue;
            }
            let res = app().oneshot(get(&route.path())).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{route:?}");
        }
    }

    #[tokio::test]
    async fn trailing_slash_and_deep_levels_resolve() {
        let res = app().oneshot(get("/server-side/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app().oneshot(get("/navigation/level1/level2")).await.unwrap();
        assert!(body_text(res).await.contains("Level 2 Page"));
    }

    #[tokio::test]
    async fn redirect_is_temporary_to_home() {
        let res = app().oneshot(get("/navigation/redirect")).await.unwrap();
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn rate_limit_is_per_client() {
        let app = app();
        for n in 1..=3 {
            let uri = format!("/navigation/rate-limited/{n}");
            let res = app.clone().oneshot(get_from(&uri, "10.0.0.1")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = app
            .clone()
            .oneshot(get_from("/navigation/rate-limited/1", "10.0.0.1, 192.168.0.1"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry: u64 = res.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=10).contains(&retry));

        let res = app
            .oneshot(get_from("/navigation/rate-limited/1", "10.0.0.2"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_paths_and_methods_are_rejected() {
        let res = app().oneshot(get("/navigation/level2")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body_text(res).await.contains("404"));

        let res = app().oneshot(get("/navigation/rate-limited/4")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let post = HttpRequest::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(post).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn hybrid_streams_sections_in_order() {
        let config = ServerConfig {
            stream_unit_ms: 1,
            ..ServerConfig::default()
        };
        let res = app_with(config).oneshot(get("/hybrid")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;

        let at = |needle: &str| html.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        let fallback = at("id=\"stream-fallback\"");
        let s1 = at("id=\"stream-section-1\"");
        let s2 = at("id=\"stream-section-2\"");
        let s3 = at("id=\"stream-section-3\"");
        let hide = at("#stream-fallback{display:none}");
        assert!(fallback < s1 && s1 < s2 && s2 < s3 && s3 < hide);
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn hybrid_waits_are_relative() {
        let state = AppState::new(ServerConfig::default());
        let waits: Vec<u64> = hybrid_chunks(&state)
            .iter()
            .map(|(wait, _)| wait.as_millis() as u64)
            .collect();
        assert_eq!(waits, vec![0, 1000, 1000, 1000, 0]);
    }

    #[tokio::test]
    async fn pkg_serves_the_dist_dir() {
        let dir = std::env::temp_dir().join(format!("crawltestd-pkg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("crawltest_web.js"), "export default function init() {}").unwrap();

        let config = ServerConfig {
            dist_dir: dir,
            ..ServerConfig::default()
        };
        let res = app_with(config).oneshot(get("/pkg/crawltest_web.js")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("export default"));
    }
}
