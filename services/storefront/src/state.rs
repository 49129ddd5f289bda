//! services/storefront/src/state.rs
//!
//! Defines the application state: every store wired to one set of ports, plus
//! the background task that keeps badge counts in step with storage.

use markethub_core::ports::{KeyValueStore, MarketApi, RestTransport, StorageEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::{DummyJsonAdapter, FileStore, ToastNotifier};
use crate::config::Config;
use crate::error::ClientResult;
use crate::keys;
use crate::stores::{AdminDirectory, BadgeCounts, CartStore, Catalog, SessionStore};

/// Created once by [`AppState::init`] (or [`AppState::with_ports`]) and torn
/// down with [`AppState::shutdown`]. Must be created inside a tokio runtime.
pub struct AppState {
    pub storage: Arc<dyn KeyValueStore>,
    pub toasts: ToastNotifier,
    pub cart: Arc<CartStore>,
    pub session: Arc<SessionStore>,
    pub catalog: Arc<Catalog>,
    pub admin: Arc<AdminDirectory>,
    badges: watch::Receiver<BadgeCounts>,
    shutdown: CancellationToken,
    watcher: JoinHandle<()>,
}

impl AppState {
    /// Opens the file store under the configured data directory and points the
    /// HTTP adapter at the configured API.
    pub fn init(config: &Config) -> ClientResult<Self> {
        info!(data_dir = %config.data_dir.display(), "Opening client storage...");
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.data_dir)?);

        info!(api = %config.api_base_url, "Connecting to the product API");
        let adapter = Arc::new(DummyJsonAdapter::new(
            reqwest::Client::new(),
            config.api_base_url.clone(),
            storage.clone(),
        ));

        Ok(Self::with_ports(storage, adapter.clone(), adapter))
    }

    /// Wires the stores to explicit ports, e.g. an isolated `MemoryStore` in tests.
    pub fn with_ports(
        storage: Arc<dyn KeyValueStore>,
        api: Arc<dyn MarketApi>,
        transport: Arc<dyn RestTransport>,
    ) -> Self {
        let toasts = ToastNotifier::new();
        let notifier = Arc::new(toasts.clone());

        let cart = Arc::new(CartStore::load(storage.clone(), notifier.clone()));
        let session = Arc::new(SessionStore::new(storage.clone(), api.clone(), notifier.clone()));
        let catalog = Arc::new(Catalog::new(api.clone(), transport, storage.clone(), notifier));
        let admin = Arc::new(AdminDirectory::new(api));

        let (badge_tx, badges) = watch::channel(cart.badge_counts());
        let shutdown = CancellationToken::new();
        let watcher = tokio::spawn(watch_storage(
            storage.subscribe(),
            cart.clone(),
            badge_tx,
            shutdown.clone(),
        ));

        Self {
            storage,
            toasts,
            cart,
            session,
            catalog,
            admin,
            badges,
            shutdown,
            watcher,
        }
    }

    /// Cart and wishlist counts, updated whenever either key is written.
    pub fn badges(&self) -> watch::Receiver<BadgeCounts> {
        self.badges.clone()
    }

    /// Stops the storage watcher and waits for it to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.watcher.await {
            warn!("Storage watcher ended abnormally: {}", e);
        }
        info!("Client state shut down.");
    }
}

async fn watch_storage(
    mut events: broadcast::Receiver<StorageEvent>,
    cart: Arc<CartStore>,
    badges: watch::Sender<BadgeCounts>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Ok(StorageEvent { key }) if key == keys::CART || key == keys::WISHLIST => {
                    debug!(key = %key, "Cart storage changed, refreshing badges");
                    cart.reload();
                    badges.send_replace(cart.badge_counts());
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Storage watcher lagged, reloading");
                    cart.reload();
                    badges.send_replace(cart.badge_counts());
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
