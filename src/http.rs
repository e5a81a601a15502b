//! Transport primitives shared by the token provider and carrier clients.
//!
//! Every outbound call runs under a bounded timeout and classifies its failures before
//! they leave this module: builder problems become [`ConfigError`], timeouts and
//! throttling statuses become [`TransientError`], and network faults become
//! [`TransportError`]. Cancellation needs no extra machinery: dropping a returned future
//! aborts the in-flight request.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransientError, TransportError},
};

/// Default bound applied to every outbound carrier call.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// One instance is cloned between the token provider and the carrier client; reqwest
/// multiplexes connections internally, so cloning is cheap and pools are shared.
#[derive(Clone, Debug)]
pub struct CarrierHttpClient(ReqwestClient);
impl CarrierHttpClient {
	/// Builds a client with the default bounded timeout.
	pub fn new() -> Result<Self, ConfigError> {
		Self::with_timeout(DEFAULT_TIMEOUT)
	}

	/// Builds a client with a caller-supplied request timeout.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`]. The caller is responsible for having
	/// configured a bounded timeout on it.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Issues a form-encoded `POST` without bearer auth (token endpoint only).
	pub async fn post_form(
		&self,
		url: &Url,
		operation: &'static str,
		form: &[(&str, &str)],
	) -> Result<CarrierResponse> {
		let response = self
			.0
			.post(url.clone())
			.form(form)
			.send()
			.await
			.map_err(|err| map_reqwest_error(operation, err))?;

		CarrierResponse::read(operation, response).await
	}

	/// Issues a JSON `POST` carrying the bearer token.
	pub async fn post_json<B>(
		&self,
		url: &Url,
		operation: &'static str,
		bearer: &str,
		body: &B,
	) -> Result<CarrierResponse>
	where
		B: Serialize + ?Sized,
	{
		let response = self
			.0
			.post(url.clone())
			.bearer_auth(bearer)
			.json(body)
			.send()
			.await
			.map_err(|err| map_reqwest_error(operation, err))?;

		CarrierResponse::read(operation, response).await
	}
}
impl AsRef<ReqwestClient> for CarrierHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for CarrierHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Status, retry hint, and body text captured from a carrier response.
#[derive(Clone, Debug)]
pub struct CarrierResponse {
	/// HTTP status code returned by the carrier.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Full response body read as text.
	pub body: String,
	operation: &'static str,
}
impl CarrierResponse {
	async fn read(operation: &'static str, response: reqwest::Response) -> Result<Self> {
		let status = response.status().as_u16();
		let retry_after = parse_retry_after(response.headers());
		let body =
			response.text().await.map_err(|err| map_reqwest_error(operation, err))?;

		Ok(Self { status, retry_after, body, operation })
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Parses the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_str(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			TransientError::ResponseParse {
				operation: self.operation,
				source,
				status: Some(self.status),
			}
			.into()
		})
	}

	/// Classifies a non-success response: throttling statuses become transient errors,
	/// everything else goes through the caller-supplied domain mapping.
	pub fn classify_failure(self, domain: impl FnOnce(Self) -> Error) -> Error {
		if is_transient_status(self.status) {
			TransientError::Upstream {
				operation: self.operation,
				status: self.status,
				retry_after: self.retry_after,
			}
			.into()
		} else {
			domain(self)
		}
	}

	/// Body text with a fixed fallback for empty carrier error bodies.
	pub fn failure_text(&self) -> String {
		let trimmed = self.body.trim();

		if trimmed.is_empty() { "carrier returned an empty error body".into() } else { trimmed.into() }
	}
}

/// Returns `true` for statuses that signal temporary upstream pressure.
pub fn is_transient_status(status: u16) -> bool {
	matches!(status, 429 | 502 | 503 | 504)
}

pub(crate) fn map_reqwest_error(operation: &'static str, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::Timeout {
			operation,
			status: err.status().map(|code| code.as_u16()),
		}
		.into();
	}

	TransportError::from(err).into()
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

/// Bounded retry with exponential backoff for idempotent carrier calls.
///
/// Only token fetches and rate quotes run under a policy with retries enabled; shipment
/// creation is not idempotent and must stay at a single attempt.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
	/// Total attempts including the first.
	pub max_attempts: u32,
	/// Delay before the first retry; doubles on each subsequent attempt.
	pub base_delay: StdDuration,
}
impl RetryPolicy {
	/// Disables retrying: exactly one attempt.
	pub const fn none() -> Self {
		Self { max_attempts: 1, base_delay: StdDuration::ZERO }
	}

	/// Runs `call` until success, a non-retryable error, or attempt exhaustion.
	pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<T>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let mut attempt = 1;

		loop {
			match call().await {
				Ok(value) => return Ok(value),
				Err(error) if attempt < self.max_attempts && error.is_retryable() => {
					tokio::time::sleep(self.delay_for(attempt, error.retry_after())).await;

					attempt += 1;
				},
				Err(error) => return Err(error),
			}
		}
	}

	fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> StdDuration {
		let backoff = self.base_delay.saturating_mul(2_u32.saturating_pow(attempt - 1));

		match hint.and_then(|value| StdDuration::try_from(value).ok()) {
			Some(hinted) if hinted > backoff => hinted,
			_ => backoff,
		}
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_attempts: 3, base_delay: StdDuration::from_millis(200) }
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicU32, Ordering};
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;
	use crate::error::TransportError;

	#[test]
	fn retry_after_parses_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(12)));
	}

	#[test]
	fn retry_after_ignores_garbage() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn transient_statuses_cover_throttling_and_bad_gateways() {
		assert!(is_transient_status(429));
		assert!(is_transient_status(503));
		assert!(!is_transient_status(400));
		assert!(!is_transient_status(500));
	}

	#[test]
	fn backoff_doubles_and_honors_larger_hints() {
		let policy =
			RetryPolicy { max_attempts: 4, base_delay: StdDuration::from_millis(100) };

		assert_eq!(policy.delay_for(1, None), StdDuration::from_millis(100));
		assert_eq!(policy.delay_for(2, None), StdDuration::from_millis(200));
		assert_eq!(
			policy.delay_for(1, Some(Duration::seconds(2))),
			StdDuration::from_secs(2)
		);
		assert_eq!(
			policy.delay_for(2, Some(Duration::milliseconds(50))),
			StdDuration::from_millis(200)
		);
	}

	#[tokio::test]
	async fn run_retries_only_retryable_errors() {
		let policy = RetryPolicy { max_attempts: 3, base_delay: StdDuration::from_millis(1) };
		let attempts = AtomicU32::new(0);
		let result: Result<u32> = policy
			.run(|| async {
				let seen = attempts.fetch_add(1, Ordering::SeqCst) + 1;

				if seen < 3 {
					Err(TransportError::Io(std::io::Error::other("connection reset")).into())
				} else {
					Ok(seen)
				}
			})
			.await;

		assert_eq!(result.expect("Third attempt should succeed."), 3);
		assert_eq!(attempts.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn run_stops_on_domain_errors() {
		let policy = RetryPolicy { max_attempts: 5, base_delay: StdDuration::from_millis(1) };
		let attempts = AtomicU32::new(0);
		let result: Result<u32> = policy
			.run(|| async {
				attempts.fetch_add(1, Ordering::SeqCst);

				Err(Error::RateQuote { message: "rejected".into(), status: Some(400) })
			})
			.await;

		assert!(result.is_err());
		assert_eq!(attempts.load(Ordering::SeqCst), 1);
	}
}
