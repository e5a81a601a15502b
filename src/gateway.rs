//! The gateway dispatcher: single entry point routing normalized actions to carrier calls.
//!
//! Each invocation walks the same sequence: resolve the action, parse the payload,
//! load credentials (failing with zero HTTP calls when any secret is missing), acquire
//! a bearer token (cached per credential fingerprint), then make exactly one business
//! call. Failures keep their structured kind all the way back to the caller and are
//! logged once at this boundary.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	carrier::{Carrier, CarrierSession},
	config::{CarrierEndpoints, CredentialSource, EnvCredentials},
	error::ConfigError,
	fedex::FedexCarrier,
	http::CarrierHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	rate::{RateOffer, RateRequest},
	shipment::{ShipmentRequest, ShipmentResult},
	store::MemoryTokenStore,
	token::{TokenPolicy, TokenProvider},
};

/// Action discriminator accepted by [`Gateway::dispatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
	/// Quote shipping rates for a package + route.
	GetRates,
	/// Create a shipment and return tracking + label references.
	CreateShipment,
}
impl Action {
	/// Returns the wire-level action name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Action::GetRates => "getRates",
			Action::CreateShipment => "createShipment",
		}
	}
}
impl FromStr for Action {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"getRates" => Ok(Action::GetRates),
			"createShipment" => Ok(Action::CreateShipment),
			_ => Err(Error::UnknownAction { action: s.into() }),
		}
	}
}
impl Display for Action {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Normalized reply returned by [`Gateway::dispatch`].
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum GatewayReply {
	/// Rate offers, sorted ascending by price.
	Rates(Vec<RateOffer>),
	/// Created shipment references.
	Shipment(ShipmentResult),
}

/// Coordinates credential checks, token acquisition, and carrier dispatch.
pub struct Gateway {
	/// Credential resolver consulted once per invocation, before any network I/O.
	pub credentials: Arc<dyn CredentialSource>,
	/// Token provider shared by all invocations; owns the cache + singleflight guards.
	pub token_provider: TokenProvider,
	/// Cache policy applied to every token acquisition.
	pub token_policy: TokenPolicy,
	/// Carrier implementation business calls are routed to.
	pub carrier: Arc<dyn Carrier>,
}
impl Gateway {
	/// Creates a gateway over the provided endpoints, reading credentials from the
	/// process environment and provisioning its own bounded-timeout transport.
	pub fn new(endpoints: CarrierEndpoints) -> Result<Self, ConfigError> {
		let http = CarrierHttpClient::new()?;

		Ok(Self::with_parts(Arc::new(EnvCredentials), http, endpoints))
	}

	/// Assembles a gateway from caller-provided credential source and transport.
	pub fn with_parts(
		credentials: Arc<dyn CredentialSource>,
		http: CarrierHttpClient,
		endpoints: CarrierEndpoints,
	) -> Self {
		let token_provider = TokenProvider::new(
			http.clone(),
			endpoints.token.clone(),
			Arc::new(MemoryTokenStore::default()),
		);
		let carrier: Arc<dyn Carrier> = Arc::new(FedexCarrier::new(http, endpoints));

		Self { credentials, token_provider, token_policy: TokenPolicy::default(), carrier }
	}

	/// Swaps in a different carrier implementation.
	pub fn with_carrier(mut self, carrier: Arc<dyn Carrier>) -> Self {
		self.carrier = carrier;

		self
	}

	/// Overrides the token cache policy.
	pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
		self.token_policy = policy;

		self
	}

	/// Single entry point: routes `action` + `payload` to the matching typed call.
	pub async fn dispatch(&self, action: &str, payload: serde_json::Value) -> Result<GatewayReply> {
		match action.parse::<Action>()? {
			Action::GetRates => {
				let request = parse_payload::<RateRequest>(payload)?;

				Ok(GatewayReply::Rates(self.get_rates(request).await?))
			},
			Action::CreateShipment => {
				let request = parse_payload::<ShipmentRequest>(payload)?;

				Ok(GatewayReply::Shipment(self.create_shipment(request).await?))
			},
		}
	}

	/// Requests normalized rate offers, sorted ascending by price.
	pub async fn get_rates(&self, request: RateRequest) -> Result<Vec<RateOffer>> {
		const KIND: OperationKind = OperationKind::RateQuote;

		let span = OperationSpan::new(KIND, "get_rates");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.session().await?;

				self.carrier.quote(&session, &request).await
			})
			.await;

		finish(KIND, result)
	}

	/// Creates a shipment and returns normalized tracking + label references.
	pub async fn create_shipment(&self, request: ShipmentRequest) -> Result<ShipmentResult> {
		const KIND: OperationKind = OperationKind::ShipmentCreation;

		let span = OperationSpan::new(KIND, "create_shipment");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.session().await?;

				self.carrier.ship(&session, &request).await
			})
			.await;

		finish(KIND, result)
	}

	async fn session(&self) -> Result<CarrierSession> {
		let credentials = self.credentials.load()?;
		let token = self.token_provider.acquire(&credentials, &self.token_policy).await?;

		Ok(CarrierSession { token, account_number: credentials.account_number })
	}
}
impl Debug for Gateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("token_provider", &self.token_provider)
			.field("token_policy", &self.token_policy)
			.field("carrier", &self.carrier.name())
			.finish()
	}
}

fn parse_payload<T>(payload: serde_json::Value) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_json::from_value(payload).map_err(|source| Error::InvalidPayload { source })
}

fn finish<T>(kind: OperationKind, result: Result<T>) -> Result<T> {
	match &result {
		Ok(_) => obs::record_operation_outcome(kind, OperationOutcome::Success),
		Err(error) => {
			obs::record_operation_outcome(kind, OperationOutcome::Failure);
			obs::record_operation_failure(kind, error);
		},
	}

	result
}

#[cfg(test)]
mod tests {
	// crates.io
	use rust_decimal_macros::dec;
	// self
	use super::*;

	#[test]
	fn actions_parse_their_wire_names() {
		assert_eq!("getRates".parse::<Action>().ok(), Some(Action::GetRates));
		assert_eq!("createShipment".parse::<Action>().ok(), Some(Action::CreateShipment));
	}

	#[test]
	fn unrecognized_actions_are_surfaced_by_name() {
		let err = "trackShipment".parse::<Action>().expect_err("Unknown actions must fail.");

		match err {
			Error::UnknownAction { action } => assert_eq!(action, "trackShipment"),
			other => panic!("Expected an unknown-action error, got {other:?}."),
		}
	}

	#[test]
	fn malformed_payloads_become_invalid_payload_errors() {
		let err = parse_payload::<RateRequest>(serde_json::json!({ "weight": "heavy" }))
			.expect_err("Malformed payloads must fail.");

		assert!(matches!(err, Error::InvalidPayload { .. }));
	}

	#[test]
	fn replies_serialize_without_an_enum_tag() {
		let reply = GatewayReply::Rates(vec![RateOffer {
			id: "FEDEX_GROUND".into(),
			carrier: "FedEx".into(),
			service: "Fedex Ground".into(),
			price: dec!(8.00),
			currency: "GBP".into(),
			eta: "N/A".into(),
		}]);
		let rendered = serde_json::to_value(&reply).expect("Reply should serialize.");

		assert!(rendered.is_array());
		assert_eq!(rendered[0]["id"], "FEDEX_GROUND");
	}
}
