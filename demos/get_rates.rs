//! Demonstrates dispatching a `getRates` request against a mock carrier and reading the
//! normalized, price-sorted offers.

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
	let _rates_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/rate/v1/rates/quotes");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"output": {
					"rateReplyDetails": [
						{
							"serviceType": "FEDEX_PRIORITY_OVERNIGHT",
							"ratedShipmentDetails": [
								{ "totalNetCharge": 12.50, "currency": "GBP" },
							],
						},
						{
							"serviceType": "FEDEX_GROUND",
							"ratedShipmentDetails": [
								{ "totalNetCharge": 8.00, "currency": "GBP" },
							],
						},
					],
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
			"getRates",
			json!({
				"weight": 2,
				"width": 10,
				"height": 10,
				"depth": 10,
				"originPostcode": "SW1A1AA",
				"destPostcode": "EC1A1BB",
			}),
		)
		.await?;

	if let GatewayReply::Rates(offers) = reply {
		for offer in offers {
			println!("{} ({}): {} {}", offer.service, offer.id, offer.price, offer.currency);
		}
	}

	Ok(())
}
