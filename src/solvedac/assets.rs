use crate::{
    error::{CardError, CardResult},
    solvedac::client::{Endpoint, SolvedAc},
    storage::AssetUrlCache,
};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::{cmp::Reverse, fmt};
use tracing::debug;

// `/400x300/` style size token found in most profile_bg URLs.
static REGEX_DIMENSIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/(\d{2,4})x(\d{2,4})/").unwrap());
static REGEX_TRAILING_QUESTION_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?+$").unwrap());

const UNSIZED_SCORE: u64 = 1_000_000_000;
// `/profile/` variants are the downscaled previews shown on profile pages.
const PROFILE_VARIANT_PENALTY: u64 = 200_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Background,
    Badge,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.page())
    }
}

impl AssetKind {
    pub fn page(&self) -> &'static str {
        match self {
            AssetKind::Background => "background",
            AssetKind::Badge => "badge",
        }
    }

    fn endpoint(&self, id: &str) -> Endpoint {
        match self {
            AssetKind::Background => Endpoint::BackgroundPage(id.to_string()),
            AssetKind::Badge => Endpoint::BadgePage(id.to_string()),
        }
    }

    /// MIME type to force when inlining a resolved asset. The CDN is not
    /// reliable about content types, so it is derived from the extension.
    pub fn mime_for(&self, url: &str) -> &'static str {
        match self {
            AssetKind::Badge => "image/png",
            AssetKind::Background => {
                let lower = url.to_lowercase();
                if lower.ends_with(".png") {
                    "image/png"
                } else if lower.ends_with(".webp") {
                    "image/webp"
                } else {
                    "image/jpeg"
                }
            }
        }
    }

    /// Pattern matching every URL of this kind for the given identifier in
    /// the raw markup of its detail page.
    fn pattern(&self, id: &str, static_base: &str) -> CardResult<Regex> {
        let id = regex::escape(id);
        let pattern = match self {
            AssetKind::Background => format!(
                r#"{}/profile_bg/[^"']*{}[^"']*\.(?:jpe?g|png|webp)"#,
                regex::escape(static_base),
                id
            ),
            // Covers both /profile_badge/120x120/{id}.png and
            // /profile_badge/profile/120x120/{id}-uuid.png, absolute,
            // protocol-relative or site-relative.
            AssetKind::Badge => format!(
                r#"(?:(?:https?:)?//{})?/profile_badge(?:/profile)?/120x120/{}[^"' <>\n]*\.png(?:\?[^"' <>\n]*)?"#,
                regex::escape(host_of(static_base)),
                id
            ),
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| CardError::Parse(format!("invalid {} pattern: {e}", self)))
    }
}

/// Resolves background and badge identifiers to absolute image URLs. The
/// scraping lives entirely behind [`AssetLocator::resolve`].
#[derive(Clone)]
pub struct AssetLocator {
    client: SolvedAc,
    cache: AssetUrlCache,
}

impl AssetLocator {
    pub fn new(client: SolvedAc, cache: AssetUrlCache) -> Self {
        Self { client, cache }
    }

    pub async fn resolve(&self, kind: AssetKind, id: &str) -> CardResult<String> {
        if let Some(url) = self.cache.get(kind, id) {
            debug!("{kind} {id} resolved from cache");
            return Ok(url);
        }

        let page = self.client.page(&kind.endpoint(id), kind.page()).await?;
        let candidates = extract_candidates(kind, id, &page, self.client.static_base())?;
        let url = match kind {
            AssetKind::Background => largest(candidates),
            AssetKind::Badge => candidates.into_iter().next(),
        }
        .ok_or_else(|| {
            CardError::NotFound(format!("{} image url not found for {}", kind, id))
        })?;

        debug!("{kind} {id} resolved to {url}");
        self.cache.insert(kind, id, url.clone());
        Ok(url)
    }
}

/// All asset URLs for `id` found in `html`, in document order.
pub fn extract_candidates(
    kind: AssetKind,
    id: &str,
    html: &str,
    static_base: &str,
) -> CardResult<Vec<String>> {
    let static_base = static_base.trim_end_matches('/');
    let re = kind.pattern(id, static_base)?;
    Ok(re
        .find_iter(html)
        .map(|mat| match kind {
            AssetKind::Background => mat.as_str().to_string(),
            AssetKind::Badge => normalize_static_url(mat.as_str(), static_base),
        })
        .collect())
}

/// Make protocol-relative and site-relative URLs absolute and drop stray
/// trailing question marks.
pub fn normalize_static_url(url: &str, static_base: &str) -> String {
    let static_base = static_base.trim_end_matches('/');
    let absolute = if url.starts_with("//") {
        let scheme = static_base.split_once("://").map_or("https", |(s, _)| s);
        format!("{scheme}:{url}")
    } else if url.starts_with('/') {
        format!("{static_base}{url}")
    } else {
        url.to_string()
    };
    REGEX_TRAILING_QUESTION_MARKS
        .replace(&absolute, "")
        .into_owned()
}

/// Best guess at the image quality of a background URL, higher is better.
pub fn score(url: &str) -> u64 {
    if let Some(caps) = REGEX_DIMENSIONS.captures(url) {
        let w = caps[1].parse::<u64>().unwrap_or_default();
        let h = caps[2].parse::<u64>().unwrap_or_default();
        return w * h;
    }
    match url.contains("/profile/") {
        true => UNSIZED_SCORE - PROFILE_VARIANT_PENALTY,
        false => UNSIZED_SCORE,
    }
}

/// Highest scoring candidate, earlier matches win ties.
pub fn largest(candidates: Vec<String>) -> Option<String> {
    candidates
        .into_iter()
        .sorted_by_key(|url| Reverse(score(url)))
        .next()
}

fn host_of(base: &str) -> &str {
    let without_scheme = base.split_once("://").map_or(base, |(_, rest)| rest);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}
