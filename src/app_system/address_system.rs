use thiserror::Error;
use tracing::{error, info, instrument};
use sqlx::sqlite::SqlitePool;
use crate::actors::AddressService;
use crate::clients::AddressClient;
use crate::config::Settings;
use crate::repository::{store, AddressRepository};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("failed to open address store: {0}")]
    Store(#[from] sqlx::Error),
    #[error("address service task failed: {0}")]
    Service(#[from] tokio::task::JoinError),
}

/// Owns the store pool and the service task; hands out the client.
///
/// Startup opens the store before the service so the service never sees a
/// missing schema. Shutdown stops the service first, then closes the pool.
pub struct AddressSystem {
    pub address_client: AddressClient,
    pool: SqlitePool,
    handle: tokio::task::JoinHandle<()>,
}

impl AddressSystem {
    #[instrument(name = "address_system", skip(settings), fields(app_name = %settings.app_name))]
    pub async fn start(settings: &Settings) -> Result<Self, SystemError> {
        info!("Starting address system");

        let pool = store::connect(settings).await?;
        let repository = AddressRepository::new(pool.clone());

        let (service, address_client) = AddressService::new(settings.channel_buffer, repository);
        let handle = tokio::spawn(service.run());

        info!("Address system started successfully");
        Ok(Self {
            address_client,
            pool,
            handle,
        })
    }

    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down address system");

        // A send failure means the service already stopped; the join below reports why.
        let _ = self.address_client.shutdown().await;
        drop(self.address_client);

        let joined = self.handle.await;
        self.pool.close().await;

        if let Err(e) = &joined {
            error!(error = %e, "Service shutdown error");
        }
        joined?;

        info!("Address system shutdown complete");
        Ok(())
    }
}
