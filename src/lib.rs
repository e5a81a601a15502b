//! Carrier integration gateway—normalized rate quoting and shipment creation over a
//! shipping carrier's OAuth-secured HTTP API, with cached client-credentials auth and
//! classified errors.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod carrier;
pub mod config;
pub mod error;
pub mod fedex;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod rate;
pub mod shipment;
pub mod store;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or
	//! the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{CarrierCredentials, CarrierEndpoints, StaticCredentials},
		gateway::Gateway,
		http::CarrierHttpClient,
	};

	/// Credential fixture accepted by mock carrier servers.
	pub fn test_credentials() -> CarrierCredentials {
		CarrierCredentials::new("test-client", "test-secret", "123456789")
			.expect("Test credentials should be valid.")
	}

	/// Endpoint set pointed at a mock carrier server's base URL.
	pub fn test_endpoints(base: &str) -> CarrierEndpoints {
		let base = Url::parse(base).expect("Mock server base URL should parse.");

		CarrierEndpoints::for_base(&base).expect("Mock endpoint set should build.")
	}

	/// Gateway wired to static test credentials and a mock carrier base URL.
	pub fn build_test_gateway(base: &str) -> Gateway {
		let http = CarrierHttpClient::new().expect("Test HTTP client should build.");

		Gateway::with_parts(Arc::new(StaticCredentials::new(test_credentials())), http, test_endpoints(base))
	}
}

mod _prelude {
	pub use std::{
		collections::{HashMap, hash_map::DefaultHasher},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::{Hash, Hasher},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use rust_decimal::Decimal;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
