//! Gateway-level error types shared across the dispatcher, token provider, and carrier clients.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
///
/// The structured kind survives all the way to the caller so integrations can branch on it
/// (retry transport failures, fix deployment on configuration failures) while [`Display`]
/// stays the flattened, human-readable view.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Carrier token endpoint rejected the credential exchange.
	#[error("Carrier token endpoint returned status {status}: {body}.")]
	Authentication {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Response body text as returned by the carrier.
		body: String,
	},
	/// Carrier rate endpoint rejected the quote request.
	#[error("Carrier rate quote failed: {message}.")]
	RateQuote {
		/// Carrier-supplied failure text.
		message: String,
		/// HTTP status code, when the failure came from a carrier response.
		status: Option<u16>,
	},
	/// Shipment creation failed at the carrier, or its response was structurally incomplete.
	///
	/// A `status` of `None` marks a domain failure: the HTTP call itself succeeded but the
	/// response did not contain a usable shipment.
	#[error("Carrier shipment creation failed: {message}.")]
	ShipmentCreation {
		/// Carrier-supplied failure text, or the fixed domain-failure description.
		message: String,
		/// HTTP status code, when the failure came from a carrier response.
		status: Option<u16>,
	},
	/// Dispatch received an action the gateway does not implement.
	#[error("Unknown gateway action: {action}.")]
	UnknownAction {
		/// The unrecognized action discriminator.
		action: String,
	},
	/// Dispatch payload did not match the shape its action requires.
	#[error("Invalid payload for gateway action.")]
	InvalidPayload {
		/// Underlying deserialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl Error {
	/// Returns `true` for failures that are safe to retry on idempotent calls.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Transient(_) | Self::Transport(_))
	}

	/// Retry-After hint captured from the carrier, if the failure carried one.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::Transient(TransientError::Upstream { retry_after, .. }) => *retry_after,
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// One or more of the three carrier secrets is unset or empty.
	#[error("Missing carrier credentials.")]
	MissingCredentials,
	/// Carrier endpoint URL could not be constructed.
	#[error("Carrier endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry on idempotent calls).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Request timed out before the carrier responded.
	#[error("Request to the carrier {operation} endpoint timed out.")]
	Timeout {
		/// Endpoint label the timeout occurred against.
		operation: &'static str,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Carrier returned a status that signals temporary upstream pressure.
	#[error("Carrier {operation} endpoint returned transient status {status}.")]
	Upstream {
		/// Endpoint label the status was returned from.
		operation: &'static str,
		/// The transient HTTP status code.
		status: u16,
		/// Retry-After hint from the carrier, if supplied.
		retry_after: Option<Duration>,
	},
	/// Carrier responded with malformed JSON that could not be parsed.
	#[error("Carrier {operation} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint label the response came from.
		operation: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the carrier.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the carrier.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
