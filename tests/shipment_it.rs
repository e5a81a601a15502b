// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use carrier_gateway::{
	auth::{AccessToken, SecretString},
	carrier::{Carrier, CarrierSession},
	config::CarrierEndpoints,
	error::Error,
	fedex::FedexCarrier,
	http::CarrierHttpClient,
	shipment::{Address, ShipmentDetails, ShipmentRequest},
	url::Url,
};

fn session() -> CarrierSession {
	CarrierSession {
		token: AccessToken::new(
			SecretString::new("test-bearer-token"),
			OffsetDateTime::now_utc(),
			Duration::hours(1),
		),
		account_number: "123456789".into(),
	}
}

fn address(postcode: &str) -> Address {
	Address {
		street_lines: vec!["1 Test Way".into()],
		city: "London".into(),
		state_or_province_code: None,
		postal_code: postcode.into(),
		country_code: "GB".into(),
	}
}

fn request() -> ShipmentRequest {
	ShipmentRequest {
		service_type: "FEDEX_GROUND".into(),
		shipment_details: ShipmentDetails {
			shipper: address("SW1A1AA"),
			recipient: address("EC1A1BB"),
			weight: None,
			width: None,
			height: None,
			depth: None,
		},
	}
}

fn build_carrier(server: &MockServer) -> FedexCarrier {
	let base = Url::parse(&server.base_url()).expect("Mock server base URL should parse.");
	let endpoints = CarrierEndpoints::for_base(&base)
		.expect("Mock endpoint set should build for shipment tests.");
	let http = CarrierHttpClient::new().expect("HTTP client should build for shipment tests.");

	FedexCarrier::new(http, endpoints)
}

#[tokio::test]
async fn created_shipments_normalize_tracking_and_label() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/ship/v1/shipments")
				.header("authorization", "Bearer test-bearer-token");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"output": {
					"transactionShipments": [{
						"pieceResponses": [{
							"trackingNumber": "794911634370",
							"packageDocuments": [
								{ "url": "https://carrier.test/label/794911634370.pdf" },
							],
						}],
					}],
				},
			}));
		})
		.await;
	let carrier = build_carrier(&server);
	let result = carrier
		.ship(&session(), &request())
		.await
		.expect("Shipment creation should succeed against the mock carrier.");

	assert_eq!(result.tracking_number, "794911634370");
	assert_eq!(result.label_url, "https://carrier.test/label/794911634370.pdf");
	assert_eq!(result.carrier, "FedEx");
	assert_eq!(result.service, "FEDEX_GROUND");
	assert_eq!(result.format, "PDF");

	mock.assert_async().await;
}

#[tokio::test]
async fn a_success_without_shipments_is_a_domain_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/ship/v1/shipments");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"output": { "transactionShipments": [] },
			}));
		})
		.await;
	let carrier = build_carrier(&server);
	let err = carrier
		.ship(&session(), &request())
		.await
		.expect_err("An empty shipment output must fail despite the 200.");

	match err {
		Error::ShipmentCreation { message, status } => {
			assert_eq!(message, "no shipment output returned");
			// A domain failure carries no HTTP status, distinguishing it from transport
			// and carrier rejections.
			assert_eq!(status, None);
		},
		other => panic!("Expected a shipment-creation error, got {other:?}."),
	}
}

#[tokio::test]
async fn carrier_rejections_surface_as_shipment_errors() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/ship/v1/shipments");
			then.status(422)
				.header("content-type", "application/json")
				.body("{\"errors\":[{\"code\":\"SERVICE.UNAVAILABLE.ERROR\"}]}");
		})
		.await;
	let carrier = build_carrier(&server);
	let err = carrier
		.ship(&session(), &request())
		.await
		.expect_err("A carrier rejection must fail the shipment.");

	match err {
		Error::ShipmentCreation { message, status } => {
			assert!(message.contains("SERVICE.UNAVAILABLE.ERROR"));
			assert_eq!(status, Some(422));
		},
		other => panic!("Expected a shipment-creation error, got {other:?}."),
	}
}

#[tokio::test]
async fn shipment_creation_is_never_retried() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/ship/v1/shipments");
			then.status(503).body("upstream unavailable");
		})
		.await;
	let carrier = build_carrier(&server);
	let err = carrier
		.ship(&session(), &request())
		.await
		.expect_err("A 503 must fail the shipment without retrying.");

	// Even throttling statuses stay non-retryable here: a duplicate POST could create a
	// duplicate shipment, and the carrier API has no idempotency key.
	assert!(matches!(err, Error::ShipmentCreation { status: Some(503), .. }));

	mock.assert_calls_async(1).await;
}
