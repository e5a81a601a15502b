//! Process configuration: carrier credentials and the carrier endpoint set.

// std
use std::env;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::SecretString, error::ConfigError};

/// Environment variable holding the OAuth client identifier.
pub const ENV_CLIENT_ID: &str = "FEDEX_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "FEDEX_CLIENT_SECRET";
/// Environment variable holding the billing account number.
pub const ENV_ACCOUNT_NUMBER: &str = "FEDEX_ACCOUNT_NUMBER";

/// The three secrets required for every carrier API call.
///
/// Immutable for process lifetime; validated once per gateway invocation before any
/// network call is made.
#[derive(Clone, Debug)]
pub struct CarrierCredentials {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: SecretString,
	/// Account the carrier bills shipments and negotiated rates against.
	pub account_number: String,
}
impl CarrierCredentials {
	/// Builds a credential set, rejecting empty values.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		account_number: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let client_secret = SecretString::new(client_secret);
		let account_number = account_number.into();

		if client_id.is_empty() || client_secret.is_empty() || account_number.is_empty() {
			return Err(ConfigError::MissingCredentials);
		}

		Ok(Self { client_id, client_secret, account_number })
	}

	/// Stable fingerprint over all three secrets, used as the token-cache key.
	///
	/// The fingerprint is a base64 (no padding) encoding of the SHA-256 digest of the
	/// NUL-joined credential fields.
	pub fn fingerprint(&self) -> String {
		let mut hasher = Sha256::new();

		hasher.update(self.client_id.as_bytes());
		hasher.update([0]);
		hasher.update(self.client_secret.expose().as_bytes());
		hasher.update([0]);
		hasher.update(self.account_number.as_bytes());

		STANDARD_NO_PAD.encode(hasher.finalize())
	}
}

/// Resolves carrier credentials at dispatch time.
///
/// The gateway calls [`load`](Self::load) once per invocation, before any network I/O, so a
/// missing secret aborts the invocation with zero HTTP calls.
pub trait CredentialSource: Send + Sync {
	/// Resolves the credential set or fails with a configuration error.
	fn load(&self) -> Result<CarrierCredentials, ConfigError>;
}

/// Reads credentials from the `FEDEX_*` process environment variables.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;
impl CredentialSource for EnvCredentials {
	fn load(&self) -> Result<CarrierCredentials, ConfigError> {
		let client_id = non_empty_var(ENV_CLIENT_ID)?;
		let client_secret = non_empty_var(ENV_CLIENT_SECRET)?;
		let account_number = non_empty_var(ENV_ACCOUNT_NUMBER)?;

		CarrierCredentials::new(client_id, client_secret, account_number)
	}
}

/// Fixed credentials for tests and embedders that manage configuration themselves.
#[derive(Clone, Debug)]
pub struct StaticCredentials(CarrierCredentials);
impl StaticCredentials {
	/// Wraps an already-validated credential set.
	pub fn new(credentials: CarrierCredentials) -> Self {
		Self(credentials)
	}
}
impl CredentialSource for StaticCredentials {
	fn load(&self) -> Result<CarrierCredentials, ConfigError> {
		Ok(self.0.clone())
	}
}

fn non_empty_var(name: &str) -> Result<String, ConfigError> {
	match env::var(name) {
		Ok(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(ConfigError::MissingCredentials),
	}
}

/// Endpoint set exposed by the carrier API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarrierEndpoints {
	/// OAuth token endpoint (form-encoded client credentials, no bearer).
	pub token: Url,
	/// Rate quote endpoint (JSON, bearer).
	pub rate_quotes: Url,
	/// Shipment creation endpoint (JSON, bearer).
	pub shipments: Url,
}
impl CarrierEndpoints {
	/// Base URL of the carrier's production environment.
	pub const PRODUCTION_BASE: &'static str = "https://apis.fedex.com";
	/// Base URL of the carrier's sandbox environment.
	pub const SANDBOX_BASE: &'static str = "https://apis-sandbox.fedex.com";

	const RATES_PATH: &'static str = "/rate/v1/rates/quotes";
	const SHIPMENTS_PATH: &'static str = "/ship/v1/shipments";
	const TOKEN_PATH: &'static str = "/oauth/token";

	/// Joins the three fixed endpoint paths onto a caller-supplied base URL.
	pub fn for_base(base: &Url) -> Result<Self, ConfigError> {
		let join = |path| base.join(path).map_err(|source| ConfigError::InvalidEndpoint { source });

		Ok(Self {
			token: join(Self::TOKEN_PATH)?,
			rate_quotes: join(Self::RATES_PATH)?,
			shipments: join(Self::SHIPMENTS_PATH)?,
		})
	}

	/// Endpoint set for the carrier's production environment.
	pub fn production() -> Self {
		Self::builtin(Self::PRODUCTION_BASE)
	}

	/// Endpoint set for the carrier's sandbox environment.
	pub fn sandbox() -> Self {
		Self::builtin(Self::SANDBOX_BASE)
	}

	fn builtin(base: &str) -> Self {
		let base = Url::parse(base).expect("Built-in carrier base URL must parse.");

		Self::for_base(&base).expect("Built-in carrier base URL must join endpoint paths.")
	}
}
impl Default for CarrierEndpoints {
	fn default() -> Self {
		Self::production()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credentials() -> CarrierCredentials {
		CarrierCredentials::new("client-id", "client-secret", "123456789")
			.expect("Credential fixture should be valid.")
	}

	#[test]
	fn empty_credential_fields_are_rejected() {
		assert!(CarrierCredentials::new("", "secret", "account").is_err());
		assert!(CarrierCredentials::new("id", "", "account").is_err());
		assert!(CarrierCredentials::new("id", "secret", "").is_err());
		assert!(CarrierCredentials::new("id", "secret", "account").is_ok());
	}

	#[test]
	fn fingerprint_is_stable_and_field_sensitive() {
		let base = credentials();
		let same = credentials();
		let other = CarrierCredentials::new("client-id", "client-secret", "987654321")
			.expect("Altered credential fixture should be valid.");

		assert_eq!(base.fingerprint(), same.fingerprint());
		assert_ne!(base.fingerprint(), other.fingerprint());
		assert!(!base.fingerprint().contains("client-secret"));
	}

	#[test]
	fn credentials_debug_redacts_the_secret() {
		let rendered = format!("{:?}", credentials());

		assert!(!rendered.contains("client-secret"));
		assert!(rendered.contains("<redacted>"));
	}

	#[test]
	fn env_source_requires_all_three_values() {
		// Process-global state; the whole sequence lives in one test to avoid races.
		unsafe {
			env::set_var(ENV_CLIENT_ID, "env-client");
			env::set_var(ENV_CLIENT_SECRET, "env-secret");
			env::set_var(ENV_ACCOUNT_NUMBER, "env-account");
		}

		let loaded = EnvCredentials.load().expect("Fully populated environment should load.");

		assert_eq!(loaded.client_id, "env-client");

		unsafe {
			env::set_var(ENV_ACCOUNT_NUMBER, "  ");
		}

		assert!(matches!(EnvCredentials.load(), Err(ConfigError::MissingCredentials)));

		unsafe {
			env::remove_var(ENV_CLIENT_ID);
			env::remove_var(ENV_CLIENT_SECRET);
			env::remove_var(ENV_ACCOUNT_NUMBER);
		}

		assert!(matches!(EnvCredentials.load(), Err(ConfigError::MissingCredentials)));
	}

	#[test]
	fn endpoints_join_fixed_paths() {
		let base = Url::parse("https://carrier.test").expect("Base fixture URL should parse.");
		let endpoints =
			CarrierEndpoints::for_base(&base).expect("Endpoint set should build from the base URL.");

		assert_eq!(endpoints.token.as_str(), "https://carrier.test/oauth/token");
		assert_eq!(endpoints.rate_quotes.as_str(), "https://carrier.test/rate/v1/rates/quotes");
		assert_eq!(endpoints.shipments.as_str(), "https://carrier.test/ship/v1/shipments");
	}

	#[test]
	fn builtin_endpoint_sets_build() {
		assert_ne!(CarrierEndpoints::production(), CarrierEndpoints::sandbox());
		assert_eq!(CarrierEndpoints::default(), CarrierEndpoints::production());
	}
}
