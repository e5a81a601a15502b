//! FedEx carrier integration: wire bodies, response normalization, error classification.
//!
//! Requests are built against the carrier's public rate and ship schemas; replies are
//! parsed tolerantly — every nesting level of the reply may be absent without raising —
//! and normalized into the gateway's carrier-agnostic shapes.

mod wire;

// self
use crate::{
	_prelude::*,
	carrier::{Carrier, CarrierFuture, CarrierSession},
	config::CarrierEndpoints,
	http::{CarrierHttpClient, RetryPolicy},
	rate::{self, RateOffer, RateRequest},
	shipment::{ShipmentRequest, ShipmentResult},
};

/// Carrier name stamped onto normalized results.
pub const CARRIER_NAME: &str = "FedEx";

/// Committed-delivery fields are not surfaced; offers carry this placeholder.
const ETA_PLACEHOLDER: &str = "N/A";
/// Currency assumed when the carrier omits one.
const FALLBACK_CURRENCY: &str = "GBP";
/// Label format requested from and reported for created shipments.
const LABEL_FORMAT: &str = "PDF";
const RATES_OPERATION: &str = "rates";
const SHIPMENTS_OPERATION: &str = "shipments";

/// FedEx implementation of the [`Carrier`] capability surface.
pub struct FedexCarrier {
	http: CarrierHttpClient,
	endpoints: CarrierEndpoints,
	retry: RetryPolicy,
}
impl FedexCarrier {
	/// Creates a carrier client over the provided transport and endpoint set.
	pub fn new(http: CarrierHttpClient, endpoints: CarrierEndpoints) -> Self {
		Self { http, endpoints, retry: RetryPolicy::default() }
	}

	/// Overrides the retry policy applied to idempotent calls (rate quotes only;
	/// shipment creation is never retried).
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	async fn get_rates(
		&self,
		session: &CarrierSession,
		request: &RateRequest,
	) -> Result<Vec<RateOffer>> {
		let body = wire::RateBody::build(&session.account_number, request);
		let reply = self.retry.run(|| self.fetch_rates(session, &body)).await?;
		let mut offers = reply
			.output
			.unwrap_or_default()
			.rate_reply_details
			.unwrap_or_default()
			.into_iter()
			.map(normalize_offer)
			.collect::<Vec<_>>();

		rate::sort_offers(&mut offers);

		Ok(offers)
	}

	async fn fetch_rates(
		&self,
		session: &CarrierSession,
		body: &wire::RateBody,
	) -> Result<wire::RateReply> {
		let response = self
			.http
			.post_json(&self.endpoints.rate_quotes, RATES_OPERATION, session.token.bearer(), body)
			.await?;

		if !response.is_success() {
			return Err(response.classify_failure(|response| Error::RateQuote {
				message: response.failure_text(),
				status: Some(response.status),
			}));
		}

		response.json()
	}

	async fn create_shipment(
		&self,
		session: &CarrierSession,
		request: &ShipmentRequest,
	) -> Result<ShipmentResult> {
		let body = wire::ShipBody::build(&session.account_number, request);
		let response = self
			.http
			.post_json(&self.endpoints.shipments, SHIPMENTS_OPERATION, session.token.bearer(), &body)
			.await?;

		if !response.is_success() {
			return Err(Error::ShipmentCreation {
				message: response.failure_text(),
				status: Some(response.status),
			});
		}

		extract_shipment_result(&request.service_type, response.json()?)
	}
}
impl Carrier for FedexCarrier {
	fn name(&self) -> &'static str {
		CARRIER_NAME
	}

	fn quote<'a>(
		&'a self,
		session: &'a CarrierSession,
		request: &'a RateRequest,
	) -> CarrierFuture<'a, Vec<RateOffer>> {
		Box::pin(self.get_rates(session, request))
	}

	fn ship<'a>(
		&'a self,
		session: &'a CarrierSession,
		request: &'a ShipmentRequest,
	) -> CarrierFuture<'a, ShipmentResult> {
		Box::pin(self.create_shipment(session, request))
	}
}
impl Debug for FedexCarrier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FedexCarrier")
			.field("endpoints", &self.endpoints)
			.field("retry", &self.retry)
			.finish()
	}
}

fn normalize_offer(detail: wire::RateReplyDetail) -> RateOffer {
	let id = detail.service_type.unwrap_or_default();
	let (price, currency) = detail
		.rated_shipment_details
		.unwrap_or_default()
		.into_iter()
		.next()
		.map(|rated| {
			(
				rated.total_net_charge.unwrap_or_default(),
				rated
					.currency
					.filter(|currency| !currency.is_empty())
					.unwrap_or_else(|| FALLBACK_CURRENCY.into()),
			)
		})
		.unwrap_or_else(|| (Decimal::ZERO, FALLBACK_CURRENCY.into()));

	RateOffer {
		service: service_label(&id),
		id,
		carrier: CARRIER_NAME.into(),
		price,
		currency,
		eta: ETA_PLACEHOLDER.into(),
	}
}

/// Formats a carrier service code into a display label (`FEDEX_GROUND` -> `Fedex Ground`).
fn service_label(code: &str) -> String {
	code.split('_')
		.filter(|part| !part.is_empty())
		.map(|part| {
			let mut chars = part.chars();

			match chars.next() {
				Some(first) =>
					first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

fn extract_shipment_result(service_type: &str, reply: wire::ShipReply) -> Result<ShipmentResult> {
	let shipment = reply
		.output
		.unwrap_or_default()
		.transaction_shipments
		.unwrap_or_default()
		.into_iter()
		.next()
		.ok_or_else(no_shipment_output)?;
	let piece = shipment
		.piece_responses
		.unwrap_or_default()
		.into_iter()
		.next()
		.ok_or_else(no_shipment_output)?;
	let tracking_number = piece
		.tracking_number
		.filter(|tracking| !tracking.is_empty())
		.ok_or_else(no_shipment_output)?;
	let label_url = piece
		.package_documents
		.unwrap_or_default()
		.into_iter()
		.next()
		.and_then(|document| document.url)
		.filter(|url| !url.is_empty())
		.ok_or_else(no_shipment_output)?;

	Ok(ShipmentResult {
		tracking_number,
		label_url,
		carrier: CARRIER_NAME.into(),
		service: service_type.into(),
		format: LABEL_FORMAT.into(),
	})
}

fn no_shipment_output() -> Error {
	Error::ShipmentCreation { message: "no shipment output returned".into(), status: None }
}
