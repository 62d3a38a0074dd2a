mod domain;
mod geo;
mod validation;
mod error;
mod config;
mod repository;
mod messages;
mod actors;
mod clients;
mod response;

mod app_system;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

use tracing::{error, info, Instrument};
use crate::app_system::{setup_tracing, AddressSystem};
use crate::config::Settings;
use crate::domain::{AddressCreate, AddressList, AddressPatch, ProximityQuery};
use crate::geo::Coordinates;
use crate::response::{ApiResponse, Empty, HTTP_CREATED, HTTP_OK};

fn log_envelope<T: serde::Serialize>(response: &ApiResponse<T>) {
    match response.to_json() {
        Ok(body) => info!(status_code = response.status_code, %body, "Response"),
        Err(e) => error!(error = %e, "Failed to render response"),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    info!(
        app_name = %settings.app_name,
        author = %settings.author_name,
        author_email = %settings.author_email,
        "Starting application"
    );

    let system = AddressSystem::start(&settings).await.map_err(|e| e.to_string())?;
    let client = system.address_client.clone();

    let new_york = Coordinates::new(40.7128, -74.0060);
    let hq = AddressCreate {
        name: "HQ".to_string(),
        street: "1 Main St".to_string(),
        city: "X".to_string(),
        state: "Y".to_string(),
        country: "Z".to_string(),
        latitude: new_york.latitude,
        longitude: new_york.longitude,
    };
    let la = AddressCreate {
        name: "LA Office".to_string(),
        latitude: 34.0522,
        longitude: -118.2437,
        ..hq.clone()
    };

    let span = tracing::info_span!("address_creation");
    let created = async {
        let mut created = Vec::new();
        for payload in [hq, la] {
            let result = client.create_address(payload).await;
            log_envelope(&ApiResponse::from_result(&result, HTTP_CREATED, "Address created successfully!"));
            if let Ok(address) = result {
                created.push(address);
            }
        }
        created
    }
    .instrument(span)
    .await;

    let span = tracing::info_span!("proximity_search");
    async {
        for distance_km in [10.0, 4000.0] {
            let query = ProximityQuery::new(distance_km, new_york);
            let result = client
                .find_within_distance(query)
                .await
                .map(|addresses| AddressList { addresses });
            log_envelope(&ApiResponse::from_result(&result, HTTP_OK, "Success"));

            // Same answer, served through the latitude/longitude indexes.
            let result = client
                .find_within_distance_prefiltered(query)
                .await
                .map(|addresses| AddressList { addresses });
            log_envelope(&ApiResponse::from_result(&result, HTTP_OK, "Success"));
        }
    }
    .instrument(span)
    .await;

    if let Some(first) = created.first() {
        let patch = AddressPatch {
            street: Some("2 Main St".to_string()),
            ..Default::default()
        };
        let result = client.update_address(first.id, patch).await;
        log_envelope(&ApiResponse::from_result(&result, HTTP_OK, "Address updated successfully!"));

        let result = client.get_address(first.id).await;
        log_envelope(&ApiResponse::from_result(&result, HTTP_OK, "Address found!"));
    }

    // Clean up so repeated runs against a file database start fresh.
    for address in &created {
        let result = client.delete_address(address.id).await.map(|()| Empty::default());
        log_envelope(&ApiResponse::from_result(&result, HTTP_OK, "Address deleted successfully!"));
    }

    drop(client);
    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}
