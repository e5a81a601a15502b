//! Normalized shipment-creation value shapes.

// crates.io
use rust_decimal_macros::dec;
// self
use crate::{_prelude::*, rate::default_country};

/// Weight applied when the caller omits one, in kilograms.
pub const DEFAULT_WEIGHT_KG: Decimal = dec!(1);
/// Dimension applied for each omitted side, in centimeters.
pub const DEFAULT_DIMENSION_CM: Decimal = dec!(10);

/// Postal address passed through verbatim to the carrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
	/// Street lines, in carrier order.
	#[serde(default)]
	pub street_lines: Vec<String>,
	/// City name.
	#[serde(default)]
	pub city: String,
	/// State or province code, where the destination country uses one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state_or_province_code: Option<String>,
	/// Postal code.
	pub postal_code: String,
	/// Country code; defaults to the gateway's fixed legacy country.
	#[serde(default = "default_country")]
	pub country_code: String,
}

/// Package measurements and parties for a shipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDetails {
	/// Party the package ships from.
	pub shipper: Address,
	/// Party the package ships to.
	pub recipient: Address,
	/// Package weight in kilograms; defaults to [`DEFAULT_WEIGHT_KG`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weight: Option<Decimal>,
	/// Package width in centimeters; defaults to [`DEFAULT_DIMENSION_CM`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<Decimal>,
	/// Package height in centimeters; defaults to [`DEFAULT_DIMENSION_CM`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<Decimal>,
	/// Package depth in centimeters; defaults to [`DEFAULT_DIMENSION_CM`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub depth: Option<Decimal>,
}
impl ShipmentDetails {
	/// Weight with the fixed fallback applied.
	pub fn weight_or_default(&self) -> Decimal {
		self.weight.unwrap_or(DEFAULT_WEIGHT_KG)
	}

	/// Width with the fixed fallback applied.
	pub fn width_or_default(&self) -> Decimal {
		self.width.unwrap_or(DEFAULT_DIMENSION_CM)
	}

	/// Height with the fixed fallback applied.
	pub fn height_or_default(&self) -> Decimal {
		self.height.unwrap_or(DEFAULT_DIMENSION_CM)
	}

	/// Depth with the fixed fallback applied.
	pub fn depth_or_default(&self) -> Decimal {
		self.depth.unwrap_or(DEFAULT_DIMENSION_CM)
	}
}

/// Normalized request to create one shipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
	/// Carrier service code the shipment books against.
	pub service_type: String,
	/// Parties and package measurements.
	pub shipment_details: ShipmentDetails,
}

/// Normalized outcome of a created shipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentResult {
	/// Tracking number assigned by the carrier.
	pub tracking_number: String,
	/// Carrier-hosted URL of the printable label document.
	pub label_url: String,
	/// Carrier name the shipment was created with.
	pub carrier: String,
	/// Service code the shipment was booked against.
	pub service: String,
	/// Label document format.
	pub format: String,
}
