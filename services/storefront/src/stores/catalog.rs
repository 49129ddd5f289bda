//! services/storefront/src/stores/catalog.rs
//!
//! Product listing and the dashboard's "new product" flow.
//!
//! Locally added products are kept in storage alongside a cache of the last
//! successful remote listing, so the listing still renders when the API is down.

use markethub_core::domain::{next_local_id, Notification, Product, ProductDraft};
use markethub_core::ports::{KeyValueStore, KeyValueStoreExt, MarketApi, Notifier, RestTransport};
use markethub_core::search;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::keys;
use crate::stores::crud::CrudClient;

pub struct Catalog {
    api: Arc<dyn MarketApi>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    products: CrudClient<Product>,
}

impl Catalog {
    pub fn new(
        api: Arc<dyn MarketApi>,
        transport: Arc<dyn RestTransport>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            storage,
            notifier,
            products: CrudClient::new(transport, "/products"),
        }
    }

    /// The `/products` CRUD client behind the user dashboard.
    pub fn crud(&self) -> &CrudClient<Product> {
        &self.products
    }

    /// Remote products followed by locally added ones not already listed.
    ///
    /// Never fails: when the API is unreachable the last cached listing is used.
    pub async fn products(&self) -> Vec<Product> {
        let remote = match self.api.fetch_products().await {
            Ok(products) => {
                if let Err(e) = self.storage.save_json(keys::PRODUCTS_CACHE, &products) {
                    warn!("Could not cache product listing: {}", e);
                }
                products
            }
            Err(e) => {
                warn!("Product listing unavailable, using cached and local products: {}", e);
                self.read_products(keys::PRODUCTS_CACHE)
            }
        };
        merge(remote, self.local_products())
    }

    /// Products added from the dashboard on this client.
    pub fn local_products(&self) -> Vec<Product> {
        self.read_products(keys::LOCAL_PRODUCTS)
    }

    fn read_products(&self, key: &str) -> Vec<Product> {
        match self.storage.load_json::<Vec<Product>>(key) {
            Ok(products) => products.unwrap_or_default(),
            Err(e) => {
                warn!("Discarding unreadable {}: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Saves a new product locally, then announces it to the API.
    ///
    /// The remote `POST` is simulated by the demo API; its failure only shows up
    /// in the CRUD client's error, not here.
    pub async fn add_local_product(&self, draft: ProductDraft) -> ClientResult<Product> {
        if draft.title.trim().is_empty() || !draft.price.is_finite() || draft.price < 0.0 {
            let err = ClientError::Validation("A title and a valid price are required".to_string());
            self.notifier.notify(Notification::error(err.to_string()));
            return Err(err);
        }

        let product = draft.into_product(next_local_id());
        let mut local = self.local_products();
        local.push(product.clone());
        if let Err(e) = self.storage.save_json(keys::LOCAL_PRODUCTS, &local) {
            self.notifier.notify(Notification::error("Failed to add product"));
            return Err(e.into());
        }
        info!(id = product.id, title = %product.title, "Added local product");

        let _ = self.products.create(&product).await;
        self.notifier.notify(Notification::success("Product added to view!"));
        Ok(product)
    }

    /// Title search used by the listing views.
    pub fn search(products: &[Product], term: &str) -> Vec<Product> {
        search::products_by_title(products, term)
            .into_iter()
            .cloned()
            .collect()
    }
}

fn merge(mut remote: Vec<Product>, local: Vec<Product>) -> Vec<Product> {
    for product in local {
        if !remote.iter().any(|p| p.id == product.id) {
            remote.push(product);
        }
    }
    remote
}
