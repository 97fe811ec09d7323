use crate::{
    card::{render_card, render_error_card, CardRenderInput, Theme, FALLBACK_ERROR_SVG},
    config::Settings,
    error::{CardError, CardResult},
    solvedac::{AssetKind, AssetLocator, Endpoint, SolvedAc, UserRecord},
    storage::AssetUrlCache,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::Future;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SVG_CONTENT_TYPE: &str = "image/svg+xml";
const NO_STORE: &str = "no-store";

pub struct AppState {
    pub client: SolvedAc,
    pub locator: AssetLocator,
    pub default_theme: Theme,
    pub cache_control: String,
}

impl AppState {
    pub fn new(settings: &Settings, cache: AssetUrlCache) -> CardResult<Self> {
        let client = SolvedAc::from_settings(settings)?;
        let locator = AssetLocator::new(client.clone(), cache);
        Ok(Self {
            client,
            locator,
            default_theme: settings.default_theme(),
            cache_control: format!(
                "public, max-age=0, s-maxage={}, stale-while-revalidate={}",
                settings.cache_s_maxage_sec, settings.cache_stale_while_revalidate_sec
            ),
        })
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct CardQuery {
    handle: Option<String>,
    theme: Option<String>,
    accent: Option<String>,
}

impl CardQuery {
    /// The first occurrence of a repeated key wins, unknown keys are ignored.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = CardQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "handle" => &mut query.handle,
                "theme" => &mut query.theme,
                "accent" => &mut query.accent,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api", get(card))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn card(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    // A query string that does not decode at all is treated like a missing handle.
    let query = query
        .map(|Query(pairs)| CardQuery::from_pairs(pairs))
        .unwrap_or_default();
    let theme = Theme::parse_or(query.theme.as_deref(), state.default_theme);
    let handle = query.handle.as_deref().map(str::trim).unwrap_or_default();

    let rendered = match handle.is_empty() {
        true => Err(CardError::MissingHandle),
        false => build_card(&state, handle, theme, query.accent).await,
    };

    match rendered {
        Ok(svg) => svg_response(svg, &state.cache_control),
        Err(e) => {
            warn!("Serving error card for handle '{handle}': {e}");
            let svg = render_error_card(&e.to_string(), theme).unwrap_or_else(|e| {
                warn!("Could not render error card: {e}");
                FALLBACK_ERROR_SVG.to_string()
            });
            svg_response(svg, NO_STORE)
        }
    }
}

/// Required path: user record, tier icon and avatar. Anything failing here
/// turns into an error card. Background, badge and class icon are best
/// effort and left out on failure.
async fn build_card(
    state: &AppState,
    handle: &str,
    theme: Theme,
    accent_color: Option<String>,
) -> CardResult<String> {
    let client = &state.client;
    let user = client.user(handle).await?;
    debug!("Fetched {} (tier {})", user.handle, user.tier);

    let tier_url = client.static_url(&Endpoint::TierIcon(user.tier));
    let (tier_data_uri, avatar_data_uri) = futures::try_join!(
        client.data_uri(&tier_url, Some("image/svg+xml")),
        avatar(client, &user),
    )?;

    let (bg_data_uri, badge_data_uri, class_data_uri) = futures::join!(
        optional("background", resolved_asset(state, AssetKind::Background, user.background_id())),
        optional("badge", resolved_asset(state, AssetKind::Badge, user.badge_id())),
        optional("class icon", class_icon(client, &user)),
    );

    let input = CardRenderInput {
        user,
        tier_data_uri,
        avatar_data_uri,
        bg_data_uri,
        badge_data_uri,
        class_data_uri,
        accent_color,
    };
    render_card(&input, theme)
}

async fn avatar(client: &SolvedAc, user: &UserRecord) -> CardResult<String> {
    match user.avatar_url() {
        Some(url) => client.data_uri(url, None).await,
        None => {
            let url = client.static_url(&Endpoint::DefaultAvatar);
            client.data_uri(&url, Some("image/png")).await
        }
    }
}

async fn resolved_asset(state: &AppState, kind: AssetKind, id: Option<&str>) -> CardResult<String> {
    let Some(id) = id else {
        return Ok(String::new());
    };
    let url = state.locator.resolve(kind, id).await?;
    state.client.data_uri(&url, Some(kind.mime_for(&url))).await
}

async fn class_icon(client: &SolvedAc, user: &UserRecord) -> CardResult<String> {
    let Some(class) = user.earned_class() else {
        return Ok(String::new());
    };
    let url = client.static_url(&Endpoint::ClassIcon(class, user.class_decoration));
    client.data_uri(&url, Some("image/svg+xml")).await
}

/// Swallow the error of a decorative asset, the card is drawn without it.
async fn optional<F>(what: &str, fut: F) -> String
where
    F: Future<Output = CardResult<String>>,
{
    fut.await.unwrap_or_else(|e| {
        debug!("Skipping {what}: {e}");
        String::new()
    })
}

fn svg_response(svg: String, cache_control: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, SVG_CONTENT_TYPE.to_string()),
            (header::CACHE_CONTROL, cache_control.to_string()),
        ],
        svg,
    )
        .into_response()
}

pub async fn serve(settings: Settings, cache: AssetUrlCache) -> CardResult<()> {
    let addr = settings.socket_addr()?;
    let state = Arc::new(AppState::new(&settings, cache)?);
    let app = router(state).layer(tower_http::trace::TraceLayer::new_for_http());

    info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CardError::Config(format!("could not bind {addr}: {e}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| CardError::Http(e.to_string()))
}
