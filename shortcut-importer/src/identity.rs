//! GitHub login to Shortcut mention name mapping.

use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::warn;

/// Upper bound on memoized lookups.
const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Maps GitHub logins to target mention names using the configured user map.
///
/// Lookups are memoized, including misses, so a non-strict warning is logged
/// once per login rather than once per issue.
#[derive(Debug)]
pub struct IdentityMapper {
    user_map: HashMap<String, String>,
    strict: bool,
    cache: Mutex<LruCache<String, Option<String>>>,
}

impl IdentityMapper {
    /// Creates a mapper. In strict mode unmapped logins are dropped silently.
    #[must_use]
    pub fn new(user_map: HashMap<String, String>, strict: bool) -> Self {
        Self {
            user_map,
            strict,
            cache: Mutex::new(LruCache::new(CACHE_CAPACITY)),
        }
    }

    /// Returns the mention name for a GitHub login, or `None` if it is not mapped.
    pub fn map_username(&self, login: &str) -> Option<String> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(login) {
            return cached.clone();
        }

        let mapped = self.user_map.get(login).cloned();
        if mapped.is_none() && !self.strict {
            warn!(login = %login, "GitHub user is not mapped to a Shortcut member");
        }

        cache.put(login.to_string(), mapped.clone());
        mapped
    }

    /// Maps each login, dropping the unmapped ones.
    pub fn map_all(&self, logins: &[String]) -> Vec<String> {
        logins
            .iter()
            .filter_map(|login| self.map_username(login))
            .collect()
    }

    /// Number of memoized lookups.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(strict: bool) -> IdentityMapper {
        IdentityMapper::new(
            HashMap::from([
                ("alice".to_string(), "alice.sc".to_string()),
                ("bob".to_string(), "bob.sc".to_string()),
            ]),
            strict,
        )
    }

    #[test]
    fn maps_known_logins() {
        let mapper = mapper(true);
        assert_eq!(mapper.map_username("alice").as_deref(), Some("alice.sc"));
    }

    #[test]
    fn unmapped_login_is_none_in_both_modes() {
        assert_eq!(mapper(true).map_username("mallory"), None);
        assert_eq!(mapper(false).map_username("mallory"), None);
    }

    #[test]
    fn memoizes_hits_and_misses() {
        let mapper = mapper(false);
        mapper.map_username("alice");
        mapper.map_username("alice");
        mapper.map_username("mallory");

        assert_eq!(mapper.cached(), 2);
    }

    #[test]
    fn map_all_drops_unmapped() {
        let mapper = mapper(true);
        let mapped = mapper.map_all(&[
            "bob".to_string(),
            "mallory".to_string(),
            "alice".to_string(),
        ]);

        assert_eq!(mapped, vec!["bob.sc", "alice.sc"]);
    }
}
