#[cfg(test)]
mod tests {
    use crate::app_system::AddressSystem;
    use crate::config::Settings;
    use crate::domain::{Address, AddressCreate, AddressList, AddressPatch, ProximityQuery};
    use crate::error::{AddressError, ErrorKind};
    use crate::geo::Coordinates;
    use crate::response::{ApiResponse, ResponseStatus, HTTP_CREATED, HTTP_OK};

    const NEW_YORK: Coordinates = Coordinates { latitude: 40.7128, longitude: -74.0060 };

    fn address(name: &str, latitude: f64, longitude: f64) -> AddressCreate {
        AddressCreate {
            name: name.into(),
            street: "1 Main St".into(),
            city: "X".into(),
            state: "Y".into(),
            country: "Z".into(),
            latitude,
            longitude,
        }
    }

    fn names(mut addresses: Vec<Address>) -> Vec<String> {
        addresses.sort_by_key(|a| a.id);
        addresses.into_iter().map(|a| a.name).collect()
    }

    #[tokio::test]
    async fn address_lifecycle_through_the_system() {
        let system = AddressSystem::start(&Settings::in_memory()).await.unwrap();
        let client = system.address_client.clone();

        let created = client.create_address(address("HQ", 40.7128, -74.0060)).await.unwrap();
        assert_eq!(client.get_address(created.id).await.unwrap(), created);

        let patch = AddressPatch { city: Some("New York".into()), ..Default::default() };
        let updated = client.update_address(created.id, patch).await.unwrap();
        assert_eq!(updated, Address { city: "New York".into(), ..created.clone() });

        let unchanged = client.update_address(created.id, AddressPatch::default()).await.unwrap();
        assert_eq!(unchanged, updated);

        client.delete_address(created.id).await.unwrap();
        assert_eq!(client.get_address(created.id).await, Err(AddressError::NotFound(created.id)));

        drop(client);
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn new_york_los_angeles_scenario() {
        let system = AddressSystem::start(&Settings::in_memory()).await.unwrap();
        let client = &system.address_client;

        client.create_address(address("HQ", 40.7128, -74.0060)).await.unwrap();
        client.create_address(address("LA Office", 34.0522, -118.2437)).await.unwrap();

        let near = client.find_within_distance(ProximityQuery::new(10.0, NEW_YORK)).await.unwrap();
        assert_eq!(names(near), vec!["HQ"]);

        let far = client.find_within_distance(ProximityQuery::new(4000.0, NEW_YORK)).await.unwrap();
        assert_eq!(names(far), vec!["HQ", "LA Office"]);

        let far_boxed = client
            .find_within_distance_prefiltered(ProximityQuery::new(4000.0, NEW_YORK))
            .await
            .unwrap();
        assert_eq!(names(far_boxed), vec!["HQ", "LA Office"]);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn out_of_range_coordinates_never_reach_the_store() {
        let system = AddressSystem::start(&Settings::in_memory()).await.unwrap();
        let client = &system.address_client;

        for (lat, lon) in [(-90.5, 0.0), (90.5, 0.0), (0.0, -181.0), (0.0, 180.5)] {
            let err = client.create_address(address("Nowhere", lat, lon)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "({lat}, {lon})");
        }
        for (lat, lon) in [(-90.0, -180.0), (90.0, 180.0)] {
            client.create_address(address(&format!("Edge {lat}"), lat, lon)).await.unwrap();
        }

        let everything = client.find_within_distance(ProximityQuery::new(30000.0, NEW_YORK)).await.unwrap();
        assert_eq!(everything.len(), 2);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_update_leaves_record_untouched() {
        let system = AddressSystem::start(&Settings::in_memory()).await.unwrap();
        let client = &system.address_client;
        let created = client.create_address(address("HQ", 10.0, 10.0)).await.unwrap();

        let patch = AddressPatch { latitude: Some(120.0), city: Some("Q".into()), ..Default::default() };
        match client.update_address(created.id, patch).await {
            Err(AddressError::ValidationError(errors)) => assert!(errors.has_field("latitude")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(client.get_address(created.id).await.unwrap(), created);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_proximity_query_is_rejected() {
        let system = AddressSystem::start(&Settings::in_memory()).await.unwrap();

        let err = system
            .address_client
            .find_within_distance(ProximityQuery::new(-1.0, NEW_YORK))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_duplicate_creates_through_the_service() {
        let system = AddressSystem::start(&Settings::in_memory()).await.unwrap();

        let attempts: Vec<_> = (0..4)
            .map(|i| {
                let client = system.address_client.clone();
                tokio::spawn(async move { client.create_address(address("Twin", i as f64, 0.0)).await })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AddressError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!((successes, conflicts), (1, 3));

        system.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_through_the_service_on_a_file_store() {
        let path = std::env::temp_dir().join(format!("address-book-service-{}.db", std::process::id()));
        let settings = Settings {
            database_url: format!("sqlite://{}", path.display()),
            max_connections: 5,
            ..Settings::default()
        };
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
        let system = AddressSystem::start(&settings).await.unwrap();
        let client = system.address_client.clone();

        let mut ids = Vec::new();
        for i in 0..20 {
            ids.push(client.create_address(address(&format!("S{i}"), 0.0, i as f64)).await.unwrap().id);
        }

        let mut tasks = tokio::task::JoinSet::new();
        for (i, id) in ids.iter().copied().enumerate() {
            let deleter = client.clone();
            tasks.spawn(async move { deleter.delete_address(id).await });
            let creator = client.clone();
            tasks.spawn(async move { creator.create_address(address("Twin", i as f64, 0.0)).await.map(|_| ()) });
        }

        let mut twins = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(()) => {}
                Err(AddressError::Conflict(_)) => twins += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        // Nineteen of the twenty "Twin" creates lose; every delete lands.
        assert_eq!(twins, ids.len() - 1);
        let remaining = client
            .find_within_distance(ProximityQuery::new(f64::MAX, NEW_YORK))
            .await
            .unwrap();
        assert_eq!(names(remaining), vec!["Twin"]);

        drop(client);
        system.shutdown().await.unwrap();
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[tokio::test]
    async fn envelopes_for_each_operation() {
        let system = AddressSystem::start(&Settings::in_memory()).await.unwrap();
        let client = &system.address_client;

        let created = client.create_address(address("HQ", 40.7128, -74.0060)).await;
        let response = ApiResponse::from_result(&created, HTTP_CREATED, "Address created successfully!");
        assert_eq!((response.status, response.status_code), (ResponseStatus::Success, 201));

        let duplicate = client.create_address(address("HQ", 0.0, 0.0)).await;
        let response = ApiResponse::from_result(&duplicate, HTTP_CREATED, "Address created successfully!");
        assert_eq!((response.status, response.status_code), (ResponseStatus::Error, 409));

        let missing = client.get_address(404).await;
        assert_eq!(ApiResponse::from_result(&missing, HTTP_OK, "Address found!").status_code, 404);

        let found = client
            .find_within_distance(ProximityQuery::new(1.0, NEW_YORK))
            .await
            .map(|addresses| AddressList { addresses });
        let response = ApiResponse::from_result(&found, HTTP_OK, "Success");
        assert_eq!(response.data.map(|list| list.addresses.len()), Some(1));

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn client_fails_cleanly_after_shutdown() {
        let system = AddressSystem::start(&Settings::in_memory()).await.unwrap();
        let client = system.address_client.clone();
        system.shutdown().await.unwrap();

        let err = client.get_address(1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
