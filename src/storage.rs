use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::solvedac::assets::AssetKind;

type SharedUrls = Arc<Mutex<HashMap<(AssetKind, String), String>>>;

/// Resolved asset URLs, keyed by asset kind and identifier. Lives as long as
/// the serving instance: nothing is evicted and nothing is persisted.
#[derive(Clone, Default)]
pub struct AssetUrlCache {
    data: SharedUrls,
}

impl AssetUrlCache {
    pub fn new() -> AssetUrlCache {
        AssetUrlCache {
            data: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn get(&self, kind: AssetKind, id: &str) -> Option<String> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.get(&(kind, id.to_string())).cloned()
    }

    // Two requests racing on the same identifier both insert the same URL,
    // last write wins.
    pub fn insert(&self, kind: AssetKind, id: &str, url: String) {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.insert((kind, id.to_string()), url);
    }

    pub fn len(&self) -> usize {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_do_not_collide() {
        let cache = AssetUrlCache::new();
        cache.insert(AssetKind::Background, "42", "https://bg".to_string());
        cache.insert(AssetKind::Badge, "42", "https://badge".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get(AssetKind::Background, "42").as_deref(),
            Some("https://bg")
        );
        assert_eq!(
            cache.get(AssetKind::Badge, "42").as_deref(),
            Some("https://badge")
        );
    }

    #[test]
    fn clones_share_the_same_map() {
        let cache = AssetUrlCache::new();
        let handle = cache.clone();
        handle.insert(AssetKind::Badge, "solved", "https://a".to_string());
        assert!(!cache.is_empty());
        assert_eq!(cache.get(AssetKind::Badge, "solved").as_deref(), Some("https://a"));
        assert_eq!(cache.get(AssetKind::Badge, "other"), None);
    }
}
