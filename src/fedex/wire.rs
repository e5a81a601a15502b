//! Request and reply DTOs for the carrier's rate and ship schemas.
//!
//! Reply structs are partial on purpose — only the fields the gateway consumes exist,
//! and each one tolerates absence at any nesting level.

// crates.io
use rust_decimal::prelude::ToPrimitive as _;
// self
use crate::{
	_prelude::*,
	rate::RateRequest,
	shipment::{Address, ShipmentRequest},
};

const DIMENSION_UNITS: &str = "CM";
const LABEL_IMAGE_TYPE: &str = "PDF";
const LABEL_STOCK_TYPE: &str = "PAPER_85X11_TOP_HALF_LABEL";
const PAYMENT_TYPE: &str = "SENDER";
const PICKUP_TYPE: &str = "DROPOFF_AT_FEDEX_LOCATION";
const RATE_REQUEST_TYPE: &str = "ACCOUNT";
const URL_ONLY: &str = "URL_ONLY";
const WEIGHT_UNITS: &str = "KG";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RateBody {
	account_number: AccountNumber,
	requested_shipment: RateRequestedShipment,
}
impl RateBody {
	pub(super) fn build(account_number: &str, request: &RateRequest) -> Self {
		Self {
			account_number: AccountNumber { value: account_number.into() },
			requested_shipment: RateRequestedShipment {
				shipper: Party {
					address: WireAddress::postal_only(&request.origin_postcode, &request.origin_country),
				},
				recipient: Party {
					address: WireAddress::postal_only(&request.dest_postcode, &request.dest_country),
				},
				pickup_type: PICKUP_TYPE,
				rate_request_type: [RATE_REQUEST_TYPE],
				requested_package_line_items: vec![PackageLineItem::new(
					request.weight,
					request.width,
					request.height,
					request.depth,
				)],
			},
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateRequestedShipment {
	shipper: Party,
	recipient: Party,
	pickup_type: &'static str,
	rate_request_type: [&'static str; 1],
	requested_package_line_items: Vec<PackageLineItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ShipBody {
	label_response_options: &'static str,
	requested_shipment: ShipRequestedShipment,
	account_number: AccountNumber,
}
impl ShipBody {
	pub(super) fn build(account_number: &str, request: &ShipmentRequest) -> Self {
		let details = &request.shipment_details;

		Self {
			label_response_options: URL_ONLY,
			requested_shipment: ShipRequestedShipment {
				shipper: Party { address: WireAddress::from_address(&details.shipper) },
				recipients: vec![Party { address: WireAddress::from_address(&details.recipient) }],
				service_type: request.service_type.clone(),
				pickup_type: PICKUP_TYPE,
				shipping_charges_payment: ShippingChargesPayment {
					payment_type: PAYMENT_TYPE,
					payor: Payor {
						responsible_party: ResponsibleParty {
							account_number: AccountNumber { value: account_number.into() },
						},
					},
				},
				label_specification: LabelSpecification {
					image_type: LABEL_IMAGE_TYPE,
					label_stock_type: LABEL_STOCK_TYPE,
				},
				requested_package_line_items: vec![PackageLineItem::new(
					details.weight_or_default(),
					details.width_or_default(),
					details.height_or_default(),
					details.depth_or_default(),
				)],
			},
			account_number: AccountNumber { value: account_number.into() },
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShipRequestedShipment {
	shipper: Party,
	recipients: Vec<Party>,
	service_type: String,
	pickup_type: &'static str,
	shipping_charges_payment: ShippingChargesPayment,
	label_specification: LabelSpecification,
	requested_package_line_items: Vec<PackageLineItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountNumber {
	value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Party {
	address: WireAddress,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireAddress {
	#[serde(skip_serializing_if = "Vec::is_empty")]
	street_lines: Vec<String>,
	#[serde(skip_serializing_if = "String::is_empty")]
	city: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	state_or_province_code: Option<String>,
	postal_code: String,
	country_code: String,
}
impl WireAddress {
	fn postal_only(postal_code: &str, country_code: &str) -> Self {
		Self {
			street_lines: Vec::new(),
			city: String::new(),
			state_or_province_code: None,
			postal_code: postal_code.into(),
			country_code: country_code.into(),
		}
	}

	fn from_address(address: &Address) -> Self {
		Self {
			street_lines: address.street_lines.clone(),
			city: address.city.clone(),
			state_or_province_code: address.state_or_province_code.clone(),
			postal_code: address.postal_code.clone(),
			country_code: address.country_code.clone(),
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShippingChargesPayment {
	payment_type: &'static str,
	payor: Payor,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Payor {
	responsible_party: ResponsibleParty,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponsibleParty {
	account_number: AccountNumber,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LabelSpecification {
	image_type: &'static str,
	label_stock_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageLineItem {
	weight: WeightSpec,
	dimensions: DimensionSpec,
}
impl PackageLineItem {
	fn new(weight: Decimal, width: Decimal, height: Decimal, depth: Decimal) -> Self {
		Self {
			weight: WeightSpec { units: WEIGHT_UNITS, value: to_wire_number(weight) },
			dimensions: DimensionSpec {
				length: to_wire_number(depth),
				width: to_wire_number(width),
				height: to_wire_number(height),
				units: DIMENSION_UNITS,
			},
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeightSpec {
	units: &'static str,
	value: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DimensionSpec {
	length: f64,
	width: f64,
	height: f64,
	units: &'static str,
}

// The wire schema carries plain JSON numbers.
fn to_wire_number(value: Decimal) -> f64 {
	value.to_f64().unwrap_or_default()
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct RateReply {
	pub(super) output: Option<RateOutput>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct RateOutput {
	pub(super) rate_reply_details: Option<Vec<RateReplyDetail>>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct RateReplyDetail {
	pub(super) service_type: Option<String>,
	pub(super) rated_shipment_details: Option<Vec<RatedShipmentDetail>>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct RatedShipmentDetail {
	pub(super) total_net_charge: Option<Decimal>,
	pub(super) currency: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct ShipReply {
	pub(super) output: Option<ShipOutput>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct ShipOutput {
	pub(super) transaction_shipments: Option<Vec<TransactionShipment>>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct TransactionShipment {
	pub(super) piece_responses: Option<Vec<PieceResponse>>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct PieceResponse {
	pub(super) tracking_number: Option<String>,
	pub(super) package_documents: Option<Vec<PackageDocument>>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct PackageDocument {
	pub(super) url: Option<String>,
}

#[cfg(test)]
mod tests {
	// crates.io
	use rust_decimal_macros::dec;
	use serde_json::json;
	// self
	use super::*;
	use crate::shipment::ShipmentDetails;

	fn rate_request() -> RateRequest {
		RateRequest {
			weight: dec!(2),
			width: dec!(10),
			height: dec!(10),
			depth: dec!(15),
			origin_postcode: "SW1A1AA".into(),
			dest_postcode: "EC1A1BB".into(),
			origin_country: "GB".into(),
			dest_country: "GB".into(),
		}
	}

	#[test]
	fn rate_body_matches_the_carrier_schema() {
		let body = serde_json::to_value(RateBody::build("123456789", &rate_request()))
			.expect("Rate body should serialize.");

		assert_eq!(body["accountNumber"]["value"], "123456789");
		assert_eq!(body["requestedShipment"]["pickupType"], PICKUP_TYPE);
		assert_eq!(body["requestedShipment"]["rateRequestType"], json!(["ACCOUNT"]));
		assert_eq!(
			body["requestedShipment"]["shipper"]["address"],
			json!({ "postalCode": "SW1A1AA", "countryCode": "GB" })
		);

		let item = &body["requestedShipment"]["requestedPackageLineItems"][0];

		assert_eq!(item["weight"], json!({ "units": "KG", "value": 2.0 }));
		assert_eq!(item["dimensions"]["length"], json!(15.0));
		assert_eq!(item["dimensions"]["units"], "CM");
	}

	#[test]
	fn ship_body_applies_measurement_defaults_and_fixed_options() {
		let request = ShipmentRequest {
			service_type: "FEDEX_GROUND".into(),
			shipment_details: ShipmentDetails {
				shipper: Address {
					street_lines: vec!["10 Downing Street".into()],
					city: "London".into(),
					state_or_province_code: None,
					postal_code: "SW1A1AA".into(),
					country_code: "GB".into(),
				},
				recipient: Address {
					street_lines: vec!["1 Old Street".into()],
					city: "London".into(),
					state_or_province_code: None,
					postal_code: "EC1A1BB".into(),
					country_code: "GB".into(),
				},
				weight: None,
				width: None,
				height: None,
				depth: None,
			},
		};
		let body = serde_json::to_value(ShipBody::build("123456789", &request))
			.expect("Ship body should serialize.");

		assert_eq!(body["labelResponseOptions"], URL_ONLY);
		assert_eq!(body["requestedShipment"]["serviceType"], "FEDEX_GROUND");
		assert_eq!(
			body["requestedShipment"]["shippingChargesPayment"]["paymentType"],
			PAYMENT_TYPE
		);
		assert_eq!(
			body["requestedShipment"]["shippingChargesPayment"]["payor"]["responsibleParty"]
				["accountNumber"]["value"],
			"123456789"
		);
		assert_eq!(
			body["requestedShipment"]["labelSpecification"],
			json!({ "imageType": "PDF", "labelStockType": LABEL_STOCK_TYPE })
		);
		assert_eq!(body["requestedShipment"]["recipients"][0]["address"]["city"], "London");

		let item = &body["requestedShipment"]["requestedPackageLineItems"][0];

		assert_eq!(item["weight"]["value"], json!(1.0));
		assert_eq!(item["dimensions"]["width"], json!(10.0));
		assert_eq!(item["dimensions"]["height"], json!(10.0));
		assert_eq!(item["dimensions"]["length"], json!(10.0));
	}

	#[test]
	fn rate_reply_tolerates_every_missing_level() {
		let empty: RateReply =
			serde_json::from_value(json!({})).expect("Empty reply should deserialize.");
		let no_details: RateReply = serde_json::from_value(json!({ "output": {} }))
			.expect("Reply without details should deserialize.");
		let unknown_fields: RateReply = serde_json::from_value(json!({
			"transactionId": "abc",
			"output": { "rateReplyDetails": [{ "unexpected": true }] },
		}))
		.expect("Unknown fields should be ignored.");

		assert!(empty.output.is_none());
		assert!(
			no_details.output.expect("Output should be present.").rate_reply_details.is_none()
		);
		assert!(
			unknown_fields.output.expect("Output should be present.").rate_reply_details.is_some()
		);
	}
}
