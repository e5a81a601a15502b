//! Client-credentials token acquisition with caching + singleflight guards.
//!
//! Every gateway invocation asks [`TokenProvider::acquire`] for a bearer token. The
//! provider evaluates the cached record for the credential fingerprint against a
//! jittered preemptive window and only calls the carrier when the record is
//! missing/expired/forced. A per-fingerprint singleflight guard ensures concurrent
//! invocations piggy-back on the same in-flight exchange instead of stampeding the
//! token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, DEFAULT_TOKEN_TTL, SecretString},
	config::CarrierCredentials,
	http::{CarrierHttpClient, RetryPolicy},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	store::TokenStore,
};

const OPERATION: &str = "token";

/// Wire shape of the carrier's token response; unknown fields are ignored.
#[derive(Deserialize)]
struct TokenReply {
	access_token: Option<String>,
	expires_in: Option<i64>,
}

/// Cache policy evaluated before contacting the token endpoint.
#[derive(Clone, Debug)]
pub struct TokenPolicy {
	/// Forces cache bypass when true.
	pub force: bool,
	/// Jittered preemptive window used when refreshing early.
	pub preemptive_window: Duration,
}
impl TokenPolicy {
	const DEFAULT_PREEMPTIVE_WINDOW: Duration = Duration::seconds(60);

	/// Creates the default policy: cached reuse with a 60-second preemptive window.
	pub fn new() -> Self {
		Self { force: false, preemptive_window: Self::DEFAULT_PREEMPTIVE_WINDOW }
	}

	/// Forces the provider to bypass cache checks.
	pub fn force_refresh(mut self) -> Self {
		self.force = true;

		self
	}

	/// Overrides the jittered preemptive window (defaults to 60 seconds).
	pub fn with_preemptive_window(mut self, window: Duration) -> Self {
		self.preemptive_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Determines whether the cached token should be refreshed.
	pub fn should_refresh(
		&self,
		token: &AccessToken,
		fingerprint: &str,
		now: OffsetDateTime,
	) -> bool {
		if self.force || token.is_expired_at(now) {
			return true;
		}

		let effective_window = self.effective_preemptive_window(fingerprint);

		if effective_window.is_zero() {
			return false;
		}

		token.expires_within(now, effective_window)
	}

	fn effective_preemptive_window(&self, fingerprint: &str) -> Duration {
		self.preemptive_window
			.checked_sub(self.preemptive_jitter(fingerprint))
			.unwrap_or(Duration::ZERO)
	}

	fn preemptive_jitter(&self, fingerprint: &str) -> Duration {
		let window_secs = self.preemptive_window.whole_seconds();

		if window_secs <= 1 {
			return Duration::ZERO;
		}

		let modulus = u64::try_from(window_secs).unwrap_or(u64::MAX);

		if modulus == 0 {
			return Duration::ZERO;
		}

		let mut hasher = DefaultHasher::new();

		fingerprint.hash(&mut hasher);

		let jitter_secs = hasher.finish() % modulus;
		let clamped = i64::try_from(jitter_secs).unwrap_or(i64::MAX);

		Duration::seconds(clamped)
	}
}
impl Default for TokenPolicy {
	fn default() -> Self {
		Self::new()
	}
}

/// Acquires bearer tokens for carrier calls, reusing cached tokens per credential
/// fingerprint.
pub struct TokenProvider {
	http: CarrierHttpClient,
	endpoint: Url,
	store: Arc<dyn TokenStore>,
	retry: RetryPolicy,
	guards: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}
impl TokenProvider {
	/// Creates a provider for the carrier's token endpoint backed by the given store.
	pub fn new(http: CarrierHttpClient, endpoint: Url, store: Arc<dyn TokenStore>) -> Self {
		Self { http, endpoint, store, retry: RetryPolicy::default(), guards: Default::default() }
	}

	/// Overrides the retry policy applied to token exchanges.
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Returns a cached or freshly exchanged bearer token for the credentials.
	pub async fn acquire(
		&self,
		credentials: &CarrierCredentials,
		policy: &TokenPolicy,
	) -> Result<AccessToken> {
		const KIND: OperationKind = OperationKind::TokenExchange;

		let span = OperationSpan::new(KIND, "acquire");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let fingerprint = credentials.fingerprint();
				let guard = self.guard(&fingerprint);
				let _singleflight = guard.lock().await;
				let now = OffsetDateTime::now_utc();

				if let Some(current) = self
					.store
					.fetch(&fingerprint)
					.await
					.filter(|token| !policy.should_refresh(token, &fingerprint, now))
				{
					return Ok(current);
				}

				let token = self.retry.run(|| self.exchange(credentials)).await?;

				self.store.save(fingerprint, token.clone()).await;

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	async fn exchange(&self, credentials: &CarrierCredentials) -> Result<AccessToken> {
		let form = [
			("grant_type", "client_credentials"),
			("client_id", credentials.client_id.as_str()),
			("client_secret", credentials.client_secret.expose()),
		];
		let response = self.http.post_form(&self.endpoint, OPERATION, &form).await?;

		if !response.is_success() {
			return Err(response.classify_failure(|response| Error::Authentication {
				status: response.status,
				body: response.failure_text(),
			}));
		}

		let status = response.status;
		let body = response.failure_text();
		let reply: TokenReply = response.json()?;
		let secret = reply
			.access_token
			.filter(|value| !value.is_empty())
			.ok_or(Error::Authentication { status, body })?;
		let ttl = reply
			.expires_in
			.filter(|secs| *secs > 0)
			.map(Duration::seconds)
			.unwrap_or(DEFAULT_TOKEN_TTL);

		Ok(AccessToken::new(SecretString::new(secret), OffsetDateTime::now_utc(), ttl))
	}

	fn guard(&self, fingerprint: &str) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(fingerprint.to_owned()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Debug for TokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenProvider")
			.field("endpoint", &self.endpoint)
			.field("retry", &self.retry)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn token(ttl: Duration) -> AccessToken {
		AccessToken::new(SecretString::new("bearer"), OffsetDateTime::now_utc(), ttl)
	}

	#[test]
	fn force_always_refreshes() {
		let policy = TokenPolicy::new().force_refresh();

		assert!(policy.should_refresh(&token(Duration::hours(1)), "fp", OffsetDateTime::now_utc()));
	}

	#[test]
	fn expired_tokens_always_refresh() {
		let policy = TokenPolicy::new().with_preemptive_window(Duration::ZERO);
		let now = OffsetDateTime::now_utc();
		let stale = AccessToken::new(SecretString::new("bearer"), now - Duration::hours(2), Duration::hours(1));

		assert!(policy.should_refresh(&stale, "fp", now));
	}

	#[test]
	fn fresh_tokens_outside_the_window_are_reused() {
		let policy = TokenPolicy::new();

		assert!(!policy.should_refresh(&token(Duration::hours(1)), "fp", OffsetDateTime::now_utc()));
	}

	#[test]
	fn tokens_inside_the_window_refresh_early() {
		let policy = TokenPolicy::new().with_preemptive_window(Duration::seconds(1));

		// A one-second window carries no jitter, so a token with less than a second of
		// validity left must refresh.
		assert!(policy.should_refresh(
			&token(Duration::milliseconds(500)),
			"fp",
			OffsetDateTime::now_utc()
		));
	}

	#[test]
	fn negative_windows_clamp_to_zero() {
		let policy = TokenPolicy::new().with_preemptive_window(Duration::seconds(-5));

		assert_eq!(policy.preemptive_window, Duration::ZERO);
	}

	#[test]
	fn jitter_is_deterministic_per_fingerprint() {
		let policy = TokenPolicy::new();

		assert_eq!(policy.preemptive_jitter("fp-1"), policy.preemptive_jitter("fp-1"));
		assert!(policy.preemptive_jitter("fp-1") < policy.preemptive_window);
	}
}
