//! Demonstrates dispatching a `createShipment` request against a mock carrier and reading
//! the normalized tracking number + label URL.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use carrier_gateway::{
	config::{CarrierCredentials, CarrierEndpoints, StaticCredentials},
	gateway::{Gateway, GatewayReply},
	http::CarrierHttpClient,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-bearer\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let _ship_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/ship/v1/shipments");
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
	let credentials = CarrierCredentials::new("demo-client", "demo-secret", "123456789")?;
	let endpoints = CarrierEndpoints::for_base(&Url::parse(&server.base_url())?)?;
	let gateway = Gateway::with_parts(
		Arc::new(StaticCredentials::new(credentials)),
		CarrierHttpClient::new()?,
		endpoints,
	);
	let reply = gateway
		.dispatch(
			"createShipment",
			json!({
				"serviceType": "FEDEX_GROUND",
				"shipmentDetails": {
					"shipper": {
						"streetLines": ["10 Downing Street"],
						"city": "London",
						"postalCode": "SW1A1AA",
					},
					"recipient": {
						"streetLines": ["1 Old Street"],
						"city": "London",
						"postalCode": "EC1A1BB",
					},
					"weight": 2.5,
				},
			}),
		)
		.await?;

	if let GatewayReply::Shipment(shipment) = reply {
		println!("Tracking number: {}.", shipment.tracking_number);
		println!("Label ({}): {}.", shipment.format, shipment.label_url);
	}

	Ok(())
}
