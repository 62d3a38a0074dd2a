use tokio::sync::oneshot;
use crate::domain::{Address, AddressCreate, AddressPatch, ProximityQuery};
use crate::error::AddressError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Requests understood by the address service. Each variant carries its
/// parameters and a oneshot channel for the response.
#[derive(Debug)]
pub enum AddressRequest {
    CreateAddress {
        address: AddressCreate,
        respond_to: ServiceResponse<Address, AddressError>,
    },
    GetAddress {
        id: i64,
        respond_to: ServiceResponse<Address, AddressError>,
    },
    UpdateAddress {
        id: i64,
        patch: AddressPatch,
        respond_to: ServiceResponse<Address, AddressError>,
    },
    DeleteAddress {
        id: i64,
        respond_to: ServiceResponse<(), AddressError>,
    },
    FindWithinDistance {
        query: ProximityQuery,
        respond_to: ServiceResponse<Vec<Address>, AddressError>,
    },
    FindWithinDistancePrefiltered {
        query: ProximityQuery,
        respond_to: ServiceResponse<Vec<Address>, AddressError>,
    },
    Shutdown,
}
