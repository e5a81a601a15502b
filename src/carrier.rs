//! Carrier capability seam consumed by the dispatcher.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	rate::{RateOffer, RateRequest},
	shipment::{ShipmentRequest, ShipmentResult},
};

/// Future alias returned by carrier capability calls.
pub type CarrierFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Per-invocation auth material handed to a carrier implementation.
#[derive(Clone, Debug)]
pub struct CarrierSession {
	/// Bearer token for the business call.
	pub token: AccessToken,
	/// Account the call is billed against.
	pub account_number: String,
}

/// Capability surface implemented by carrier integrations.
///
/// The dispatcher only depends on this trait, so additional carriers plug in as new
/// implementations without touching dispatch logic.
pub trait Carrier
where
	Self: Send + Sync,
{
	/// Carrier name stamped onto normalized results.
	fn name(&self) -> &'static str;

	/// Requests priced service options for one package + route, sorted ascending by
	/// price.
	fn quote<'a>(
		&'a self,
		session: &'a CarrierSession,
		request: &'a RateRequest,
	) -> CarrierFuture<'a, Vec<RateOffer>>;

	/// Creates a shipment and returns tracking + label references.
	fn ship<'a>(
		&'a self,
		session: &'a CarrierSession,
		request: &'a ShipmentRequest,
	) -> CarrierFuture<'a, ShipmentResult>;
}
