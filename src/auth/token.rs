//! Access token record and lifecycle helpers.

// self
use crate::{_prelude::*, auth::secret::SecretString};

/// Token lifetime assumed when the carrier omits `expires_in`.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::minutes(30);

/// Short-lived bearer token issued by the carrier's OAuth token endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
	/// Bearer secret; callers must avoid logging it.
	pub secret: SecretString,
	/// Instant the token was issued, recorded locally.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from issued_at plus the carrier's `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Builds a token valid for `ttl` starting at `issued_at`.
	pub fn new(secret: SecretString, issued_at: OffsetDateTime, ttl: Duration) -> Self {
		Self { secret, issued_at, expires_at: issued_at + ttl }
	}

	/// Returns the bearer value sent on business API calls.
	pub fn bearer(&self) -> &str {
		self.secret.expose()
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when less than `window` of validity remains at `instant`.
	pub fn expires_within(&self, instant: OffsetDateTime, window: Duration) -> bool {
		self.expires_at - instant <= window
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("secret", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
