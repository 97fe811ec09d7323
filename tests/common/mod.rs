//! Fake solved.ac for integration tests: API, website and static CDN all on
//! one ephemeral port, with a hit counter per path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use badge_card::config::Settings;
use badge_card::server::{router, AppState};
use badge_card::storage::AssetUrlCache;
use figment::{providers::Serialized, Figment};
use tower::ServiceExt;

pub const BIG_BACKGROUND: &[u8] = b"BIG";
pub const SMALL_BACKGROUND: &[u8] = b"SMALL";
pub const BADGE_PNG: &[u8] = b"BADGE";
pub const AVATAR_PNG: &[u8] = b"AVATAR";
pub const TIER_SVG: &[u8] = b"<svg>tier</svg>";
pub const CLASS_SVG: &[u8] = b"<svg>class</svg>";

#[derive(Clone)]
pub struct Upstream {
    pub base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl Upstream {
    pub async fn start() -> Upstream {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let upstream = Upstream {
            base,
            hits: Arc::new(Mutex::new(HashMap::new())),
        };

        let app = Router::new()
            .fallback(serve_upstream)
            .with_state(upstream.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        upstream
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or_default()
    }

    pub fn settings(&self) -> Settings {
        Settings::from_figment(
            Figment::new()
                .merge(Serialized::default("solvedac_api_url", &self.base))
                .merge(Serialized::default("solvedac_site_url", &self.base))
                .merge(Serialized::default("solvedac_static_url", &self.base)),
        )
        .unwrap()
    }

    pub fn app(&self, cache: AssetUrlCache) -> Router {
        let state = AppState::new(&self.settings(), cache).unwrap();
        router(Arc::new(state))
    }

    fn user_json(&self, handle: &str) -> Option<serde_json::Value> {
        let user = match handle {
            "ghost" => return None,
            "alice" => serde_json::json!({
                "handle": "alice",
                "tier": 13,
                "solvedCount": 1234,
                "rank": 42,
                "class": 5,
                "classDecoration": "silver",
                "profileImageUrl": null,
                "backgroundId": "bg1",
                "badgeId": "badge1",
                "maxStreak": 77
            }),
            "broken" => serde_json::json!({
                "handle": "broken",
                "tier": 3,
                "backgroundId": "missing_bg",
                "badgeId": "gone"
            }),
            "lapsed" => serde_json::json!({
                "handle": "lapsed",
                "tier": 8,
                "solvedCount": 310,
                "class": 7,
                "classDecoration": null
            }),
            "noavatar" => serde_json::json!({
                "handle": "noavatar",
                "tier": 3,
                "profileImageUrl": format!("{}/uploads/lost.png", self.base)
            }),
            other => serde_json::json!({ "handle": other, "tier": 0 }),
        };
        Some(user)
    }
}

async fn serve_upstream(
    State(upstream): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
) -> Response {
    let path = uri.path().to_string();
    *upstream.hits.lock().unwrap().entry(path.clone()).or_default() += 1;

    let base = &upstream.base;
    match path.as_str() {
        "/api/v3/user/show" => {
            let handle = params.get("handle").cloned().unwrap_or_default();
            match upstream.user_json(&handle) {
                Some(user) => axum::Json(user).into_response(),
                None => StatusCode::NOT_FOUND.into_response(),
            }
        }
        "/en/backgrounds/bg1" => html(format!(
            r#"<html><img src="{base}/profile_bg/100x100/bg1.png"><img src="{base}/profile_bg/400x300/bg1.png"></html>"#
        )),
        "/en/backgrounds/empty" => html("<html><body>retired</body></html>".to_string()),
        "/badges/badge1" => html(
            r#"<html><img src="/profile_badge/120x120/badge1.png?"></html>"#.to_string(),
        ),
        "/badges/gone" => html(
            r#"<html><img src="/profile_badge/120x120/gone.png"></html>"#.to_string(),
        ),
        "/profile_bg/400x300/bg1.png" => image("image/png", BIG_BACKGROUND),
        "/profile_bg/100x100/bg1.png" => image("image/png", SMALL_BACKGROUND),
        "/profile_badge/120x120/badge1.png" => image("image/png", BADGE_PNG),
        "/misc/360x360/default_profile.png" => image("image/png", AVATAR_PNG),
        "/class/c5s.svg" => image("image/svg+xml", CLASS_SVG),
        p if p.starts_with("/tier_small/") => image("image/svg+xml", TIER_SVG),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn html(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/html")], body).into_response()
}

fn image(mime: &'static str, bytes: &'static [u8]) -> Response {
    ([(header::CONTENT_TYPE, mime)], bytes).into_response()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn header_value(response: &Response, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
