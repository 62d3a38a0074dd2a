//! # Mock Framework
//!
//! Utilities for testing [`AddressClient`] in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then helpers
//! such as [`expect_create`] to assert what the client sent and script the
//! reply.

use crate::clients::AddressClient;
use crate::domain::{Address, AddressCreate, AddressPatch, ProximityQuery};
use crate::error::AddressError;
use crate::messages::{AddressRequest, ServiceResponse};
use tokio::sync::mpsc;

/// Creates a client whose requests land on the returned receiver instead of
/// a running service.
pub fn create_mock_client(buffer_size: usize) -> (AddressClient, mpsc::Receiver<AddressRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (AddressClient::new(sender), receiver)
}

pub async fn expect_create(
    receiver: &mut mpsc::Receiver<AddressRequest>,
) -> Option<(AddressCreate, ServiceResponse<Address, AddressError>)> {
    match receiver.recv().await {
        Some(AddressRequest::CreateAddress { address, respond_to }) => Some((address, respond_to)),
        _ => None,
    }
}

pub async fn expect_get(
    receiver: &mut mpsc::Receiver<AddressRequest>,
) -> Option<(i64, ServiceResponse<Address, AddressError>)> {
    match receiver.recv().await {
        Some(AddressRequest::GetAddress { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_update(
    receiver: &mut mpsc::Receiver<AddressRequest>,
) -> Option<(i64, AddressPatch, ServiceResponse<Address, AddressError>)> {
    match receiver.recv().await {
        Some(AddressRequest::UpdateAddress { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

pub async fn expect_delete(
    receiver: &mut mpsc::Receiver<AddressRequest>,
) -> Option<(i64, ServiceResponse<(), AddressError>)> {
    match receiver.recv().await {
        Some(AddressRequest::DeleteAddress { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_find_within_distance(
    receiver: &mut mpsc::Receiver<AddressRequest>,
) -> Option<(ProximityQuery, ServiceResponse<Vec<Address>, AddressError>)> {
    match receiver.recv().await {
        Some(AddressRequest::FindWithinDistance { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn hq() -> AddressCreate {
        AddressCreate {
            name: "HQ".into(),
            street: "1 Main St".into(),
            city: "X".into(),
            state: "Y".into(),
            country: "Z".into(),
            latitude: 40.7128,
            longitude: -74.0060,
        }
    }

    fn stored(id: i64) -> Address {
        let a = hq();
        Address {
            id,
            name: a.name,
            street: a.street,
            city: a.city,
            state: a.state,
            country: a.country,
            latitude: a.latitude,
            longitude: a.longitude,
        }
    }

    #[tokio::test]
    async fn create_forwards_payload_and_reply() {
        let (client, mut receiver) = create_mock_client(10);

        let create_task = tokio::spawn(async move { client.create_address(hq()).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload, hq());
        responder.send(Ok(stored(1))).unwrap();

        assert_eq!(create_task.await.unwrap(), Ok(stored(1)));
    }

    #[tokio::test]
    async fn errors_from_the_service_pass_through() {
        let (client, mut receiver) = create_mock_client(10);

        let get_task = tokio::spawn(async move { client.get_address(9).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, 9);
        responder.send(Err(AddressError::NotFound(9))).unwrap();

        assert_eq!(get_task.await.unwrap(), Err(AddressError::NotFound(9)));
    }

    #[tokio::test]
    async fn update_and_delete_carry_their_ids() {
        let (client, mut receiver) = create_mock_client(10);
        let patch = AddressPatch { city: Some("Q".into()), ..Default::default() };

        let task = tokio::spawn({
            let client = client.clone();
            let patch = patch.clone();
            async move { client.update_address(3, patch).await }
        });
        let (id, sent, responder) = expect_update(&mut receiver).await.expect("Expected Update request");
        assert_eq!((id, sent), (3, patch));
        responder.send(Ok(stored(3))).unwrap();
        assert!(task.await.unwrap().is_ok());

        let task = tokio::spawn(async move { client.delete_address(3).await });
        let (id, responder) = expect_delete(&mut receiver).await.expect("Expected Delete request");
        assert_eq!(id, 3);
        responder.send(Ok(())).unwrap();
        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn proximity_query_is_forwarded_unchanged() {
        let (client, mut receiver) = create_mock_client(10);
        let query = ProximityQuery::new(10.0, Coordinates::new(40.7128, -74.0060));

        let task = tokio::spawn(async move { client.find_within_distance(query).await });
        let (sent, responder) = expect_find_within_distance(&mut receiver).await.expect("Expected Find request");
        assert_eq!(sent, query);
        responder.send(Ok(Vec::new())).unwrap();
        assert_eq!(task.await.unwrap(), Ok(Vec::new()));
    }

    #[tokio::test]
    async fn dropped_responder_is_a_communication_error() {
        let (client, mut receiver) = create_mock_client(10);

        let task = tokio::spawn(async move { client.get_address(1).await });
        let (_, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        drop(responder);

        assert_eq!(
            task.await.unwrap(),
            Err(AddressError::ActorCommunicationError("Actor dropped".into()))
        );
    }

    #[tokio::test]
    async fn closed_service_is_a_communication_error() {
        let (client, receiver) = create_mock_client(10);
        drop(receiver);

        assert_eq!(
            client.delete_address(1).await,
            Err(AddressError::ActorCommunicationError("Actor closed".into()))
        );
    }
}
