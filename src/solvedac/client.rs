use crate::{
    config::Settings,
    error::{CardError, CardResult},
    solvedac::user::{ClassDecoration, UserRecord},
    utils::{encode_data_uri, essence, FALLBACK_MIME},
};
use reqwest::{header, Client};
use std::{fmt, time::Duration};
use tracing::debug;

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";
const ACCEPT_IMAGE: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

pub enum Endpoint {
    UserShow(String),
    BackgroundPage(String),
    BadgePage(String),
    TierIcon(u8),
    ClassIcon(u8, ClassDecoration),
    DefaultAvatar,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::UserShow(handle) => {
                write!(f, "/api/v3/user/show?handle={}", urlencoding::encode(handle))
            }
            Endpoint::BackgroundPage(id) => {
                write!(f, "/en/backgrounds/{}", urlencoding::encode(id))
            }
            Endpoint::BadgePage(id) => write!(f, "/badges/{}", urlencoding::encode(id)),
            Endpoint::TierIcon(tier) => write!(f, "/tier_small/{}.svg", tier),
            Endpoint::ClassIcon(class, decoration) => {
                write!(f, "/class/c{}{}.svg", class, decoration.icon_suffix())
            }
            Endpoint::DefaultAvatar => write!(f, "/misc/360x360/default_profile.png"),
        }
    }
}

/// Thin client over the three solved.ac hosts: the JSON API, the website
/// (scraped for asset URLs) and the static CDN.
#[derive(Clone)]
pub struct SolvedAc {
    http_client: Client,
    api_base_url: String,
    site_base_url: String,
    static_base_url: String,
}

impl SolvedAc {
    pub fn new(
        api_base_url: &str,
        site_base_url: &str,
        static_base_url: &str,
        timeout: Duration,
    ) -> CardResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("badge-card/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
            static_base_url: static_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> CardResult<Self> {
        Self::new(
            &settings.solvedac_api_url,
            &settings.solvedac_site_url,
            &settings.solvedac_static_url,
            settings.http_timeout(),
        )
    }

    pub fn static_base(&self) -> &str {
        &self.static_base_url
    }

    /// Absolute URL of a static CDN asset.
    pub fn static_url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.static_base_url, endpoint)
    }

    pub async fn user(&self, handle: &str) -> CardResult<UserRecord> {
        let url = format!("{}{}", self.api_base_url, Endpoint::UserShow(handle.to_string()));
        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, ACCEPT_JSON)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CardError::Api(status.as_u16()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str::<UserRecord>(&body)?)
    }

    /// Raw HTML of a detail page on the website.
    pub async fn page(&self, endpoint: &Endpoint, page: &'static str) -> CardResult<String> {
        let url = format!("{}{}", self.site_base_url, endpoint);
        debug!("Fetching {page} page {url}");
        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, ACCEPT_HTML)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CardError::Page {
                page,
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Download `url` and inline it as a base64 `data:` URI. Without a forced
    /// MIME type the response content type is used.
    pub async fn data_uri(&self, url: &str, forced_mime: Option<&str>) -> CardResult<String> {
        let response = self
            .http_client
            .get(url)
            .header(header::ACCEPT, ACCEPT_IMAGE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CardError::Asset {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mime = match forced_mime {
            Some(mime) => mime.to_string(),
            None => response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .and_then(essence)
                .unwrap_or(FALLBACK_MIME)
                .to_string(),
        };
        let bytes: bytes::Bytes = response.bytes().await?;
        Ok(encode_data_uri(&mime, &bytes))
    }
}
