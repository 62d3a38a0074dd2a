use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, Instrument};
use crate::domain::{Address, AddressCreate, AddressPatch, ProximityQuery};
use crate::messages::{AddressRequest, ServiceResponse};
use crate::error::AddressError;
use crate::clients::AddressClient;
use crate::repository::AddressRepository;
use crate::validation::Validate;

/// Answers a request with an error and leaves the handler.
macro_rules! send_error {
    ($respond_to:expr, $error:expr) => {{
        let _ = $respond_to.send(Err($error));
        return;
    }};
}

// =============================================================================
// ADDRESS SERVICE
// =============================================================================

/// Boundary between callers and the repository.
///
/// Validates external input, then hands each request to its own task which
/// owns the responder. The loop itself never waits on the store, so
/// concurrent requests only serialise where the store does.
pub struct AddressService {
    receiver: mpsc::Receiver<AddressRequest>,
    repository: AddressRepository,
    in_flight: JoinSet<()>,
}

impl AddressService {
    pub fn new(buffer_size: usize, repository: AddressRepository) -> (Self, AddressClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            repository,
            in_flight: JoinSet::new(),
        };
        let client = AddressClient::new(sender);
        (service, client)
    }

    #[instrument(name = "address_service", skip(self))]
    pub async fn run(mut self) {
        info!("AddressService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                AddressRequest::CreateAddress { address, respond_to } => {
                    self.spawn(handle_create_address(self.repository.clone(), address, respond_to));
                }
                AddressRequest::GetAddress { id, respond_to } => {
                    self.spawn(handle_get_address(self.repository.clone(), id, respond_to));
                }
                AddressRequest::UpdateAddress { id, patch, respond_to } => {
                    self.spawn(handle_update_address(self.repository.clone(), id, patch, respond_to));
                }
                AddressRequest::DeleteAddress { id, respond_to } => {
                    self.spawn(handle_delete_address(self.repository.clone(), id, respond_to));
                }
                AddressRequest::FindWithinDistance { query, respond_to } => {
                    self.spawn(handle_find_within_distance(self.repository.clone(), query, false, respond_to));
                }
                AddressRequest::FindWithinDistancePrefiltered { query, respond_to } => {
                    self.spawn(handle_find_within_distance(self.repository.clone(), query, true, respond_to));
                }
                AddressRequest::Shutdown => {
                    info!("AddressService shutting down");
                    break;
                }
            }
            self.reap();
        }

        let pending = self.in_flight.len();
        if pending > 0 {
            debug!(pending, "Waiting for in-flight requests");
        }
        while let Some(result) = self.in_flight.join_next().await {
            log_join_result(result);
        }

        info!("AddressService stopped");
    }

    fn spawn<F>(&mut self, handler: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.in_flight.spawn(handler.in_current_span());
    }

    /// Collects finished request tasks without waiting.
    fn reap(&mut self) {
        while let Some(result) = self.in_flight.try_join_next() {
            log_join_result(result);
        }
    }
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Request task failed");
    }
}

#[instrument(fields(address_name = %address.name), skip(repository, address, respond_to))]
async fn handle_create_address(
    repository: AddressRepository,
    address: AddressCreate,
    respond_to: ServiceResponse<Address, AddressError>,
) {
    info!("Received request to create address");

    if let Err(errors) = address.validate() {
        error!(error = %errors, "Validation failed");
        send_error!(respond_to, AddressError::ValidationError(errors));
    }

    let result = repository.create(&address).await;
    match &result {
        Ok(created) => info!(address_id = created.id, "Address created successfully"),
        Err(e) => error!(error = %e, "Address creation failed"),
    }
    let _ = respond_to.send(result);
}

#[instrument(fields(address_id = id), skip(repository, respond_to))]
async fn handle_get_address(
    repository: AddressRepository,
    id: i64,
    respond_to: ServiceResponse<Address, AddressError>,
) {
    info!("Received request to view address");

    let result = repository.get(id).await;
    match &result {
        Ok(address) => info!(address_name = %address.name, "Address retrieved successfully"),
        Err(e) => error!(error = %e, "Address lookup failed"),
    }
    let _ = respond_to.send(result);
}

#[instrument(fields(address_id = id), skip(repository, patch, respond_to))]
async fn handle_update_address(
    repository: AddressRepository,
    id: i64,
    patch: AddressPatch,
    respond_to: ServiceResponse<Address, AddressError>,
) {
    info!("Received request to update address");

    if let Err(errors) = patch.validate() {
        error!(error = %errors, "Validation failed");
        send_error!(respond_to, AddressError::ValidationError(errors));
    }

    let result = repository.update(id, &patch).await;
    match &result {
        Ok(_) => info!("Address updated successfully"),
        Err(e) => error!(error = %e, "Address update failed"),
    }
    let _ = respond_to.send(result);
}

#[instrument(fields(address_id = id), skip(repository, respond_to))]
async fn handle_delete_address(
    repository: AddressRepository,
    id: i64,
    respond_to: ServiceResponse<(), AddressError>,
) {
    info!("Received request to delete address");

    let result = repository.delete(id).await;
    match &result {
        Ok(()) => info!("Address deleted successfully"),
        Err(e) => error!(error = %e, "Address deletion failed"),
    }
    let _ = respond_to.send(result);
}

#[instrument(
    fields(distance_km = query.distance_km, latitude = query.origin.latitude, longitude = query.origin.longitude),
    skip(repository, query, respond_to)
)]
async fn handle_find_within_distance(
    repository: AddressRepository,
    query: ProximityQuery,
    prefiltered: bool,
    respond_to: ServiceResponse<Vec<Address>, AddressError>,
) {
    info!("Received request to get addresses within distance");

    if let Err(errors) = query.validate() {
        error!(error = %errors, "Validation failed");
        send_error!(respond_to, AddressError::ValidationError(errors));
    }

    let result = if prefiltered {
        repository.find_within_distance_prefiltered(&query).await
    } else {
        repository.find_within_distance(&query).await
    };
    match &result {
        Ok(found) => info!(found = found.len(), "Addresses within distance retrieved successfully"),
        Err(e) => error!(error = %e, "Proximity search failed"),
    }
    let _ = respond_to.send(result);
}
