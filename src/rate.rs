//! Normalized rate-quoting value shapes.

// self
use crate::_prelude::*;

/// Country code applied when a request omits explicit codes.
///
/// The consuming application historically operated domestically, so payloads without
/// country fields keep working unchanged; international routes set the fields
/// explicitly.
pub const DEFAULT_COUNTRY: &str = "GB";

pub(crate) fn default_country() -> String {
	DEFAULT_COUNTRY.into()
}

/// Normalized package + route description for a rate quote.
///
/// Weight is kilograms; dimensions are centimeters. Values are not validated locally:
/// the carrier rejects non-positive measurements and that rejection surfaces as a
/// rate-quote domain error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
	/// Package weight in kilograms.
	pub weight: Decimal,
	/// Package width in centimeters.
	pub width: Decimal,
	/// Package height in centimeters.
	pub height: Decimal,
	/// Package depth in centimeters.
	pub depth: Decimal,
	/// Origin postal code.
	pub origin_postcode: String,
	/// Destination postal code.
	pub dest_postcode: String,
	/// Origin country code; defaults to [`DEFAULT_COUNTRY`].
	#[serde(default = "default_country")]
	pub origin_country: String,
	/// Destination country code; defaults to [`DEFAULT_COUNTRY`].
	#[serde(default = "default_country")]
	pub dest_country: String,
}

/// One priced shipping service option, normalized across carriers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOffer {
	/// Carrier service code identifying the option.
	pub id: String,
	/// Carrier name the offer came from.
	pub carrier: String,
	/// Human-readable service label.
	pub service: String,
	/// Total charge for the option.
	pub price: Decimal,
	/// ISO currency code the price is quoted in.
	pub currency: String,
	/// Delivery estimate text.
	pub eta: String,
}

/// Sorts offers ascending by price; ties keep the carrier's original relative order.
pub fn sort_offers(offers: &mut [RateOffer]) {
	offers.sort_by(|lhs, rhs| lhs.price.cmp(&rhs.price));
}
