//! Cache contracts and the built-in in-memory token store.
//!
//! Tokens are cached per credential fingerprint for the lifetime of the process only;
//! durable persistence across restarts is deliberately out of scope.

// self
use crate::{_prelude::*, auth::AccessToken};

/// Future alias for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Cache backend contract for issued carrier tokens, keyed by credential fingerprint.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the token cached for the provided fingerprint.
	fn save(&self, fingerprint: String, token: AccessToken) -> StoreFuture<'_, ()>;

	/// Fetches the token cached for the fingerprint, if present.
	fn fetch<'a>(&'a self, fingerprint: &'a str) -> StoreFuture<'a, Option<AccessToken>>;
}

type StoreMap = Arc<RwLock<HashMap<String, AccessToken>>>;

/// Thread-safe in-process token cache.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore(StoreMap);
impl MemoryTokenStore {
	fn save_now(map: StoreMap, fingerprint: String, token: AccessToken) {
		map.write().insert(fingerprint, token);
	}

	fn fetch_now(map: StoreMap, fingerprint: &str) -> Option<AccessToken> {
		map.read().get(fingerprint).cloned()
	}
}
impl TokenStore for MemoryTokenStore {
	fn save(&self, fingerprint: String, token: AccessToken) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::save_now(map, fingerprint, token) })
	}

	fn fetch<'a>(&'a self, fingerprint: &'a str) -> StoreFuture<'a, Option<AccessToken>> {
		let map = self.0.clone();

		Box::pin(async move { Self::fetch_now(map, fingerprint) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::SecretString;

	fn token(value: &str) -> AccessToken {
		AccessToken::new(SecretString::new(value), OffsetDateTime::now_utc(), Duration::hours(1))
	}

	#[tokio::test]
	async fn save_then_fetch_round_trips_per_fingerprint() {
		let store = MemoryTokenStore::default();

		store.save("fp-a".into(), token("token-a")).await;
		store.save("fp-b".into(), token("token-b")).await;

		let fetched = store
			.fetch("fp-a")
			.await
			.expect("Saved token should be fetchable by its fingerprint.");

		assert_eq!(fetched.bearer(), "token-a");
		assert!(store.fetch("fp-unknown").await.is_none());
	}

	#[tokio::test]
	async fn save_replaces_the_cached_token() {
		let store = MemoryTokenStore::default();

		store.save("fp".into(), token("stale")).await;
		store.save("fp".into(), token("fresh")).await;

		let fetched =
			store.fetch("fp").await.expect("Replaced token should remain fetchable.");

		assert_eq!(fetched.bearer(), "fresh");
	}
}
