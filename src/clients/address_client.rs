use tokio::sync::mpsc;
use tracing::{debug, instrument};
use crate::domain::{Address, AddressCreate, AddressPatch, ProximityQuery};
use crate::error::AddressError;
use crate::messages::AddressRequest;

/// Cloneable handle to the address service.
#[derive(Clone)]
pub struct AddressClient {
    sender: mpsc::Sender<AddressRequest>,
}

impl AddressClient {
    pub fn new(sender: mpsc::Sender<AddressRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), AddressError> {
        debug!("Sending shutdown request");
        self.sender
            .send(AddressRequest::Shutdown)
            .await
            .map_err(|e| AddressError::ActorCommunicationError(e.to_string()))
    }
}

client_method!(AddressClient => fn create_address(address: AddressCreate) -> Address as AddressRequest::CreateAddress, Error = AddressError);
client_method!(AddressClient => fn get_address(id: i64) -> Address as AddressRequest::GetAddress, Error = AddressError);
client_method!(AddressClient => fn update_address(id: i64, patch: AddressPatch) -> Address as AddressRequest::UpdateAddress, Error = AddressError);
client_method!(AddressClient => fn delete_address(id: i64) -> () as AddressRequest::DeleteAddress, Error = AddressError);
client_method!(AddressClient => fn find_within_distance(query: ProximityQuery) -> Vec<Address> as AddressRequest::FindWithinDistance, Error = AddressError);
client_method!(AddressClient => fn find_within_distance_prefiltered(query: ProximityQuery) -> Vec<Address> as AddressRequest::FindWithinDistancePrefiltered, Error = AddressError);
