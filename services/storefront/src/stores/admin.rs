//! services/storefront/src/stores/admin.rs
//!
//! Data behind the admin dashboard: users and products fetched from the demo
//! API, plus categories, all edited locally and searchable.

use markethub_core::crud;
use markethub_core::domain::{next_local_id, Category, Product, User};
use markethub_core::ports::{MarketApi, PortResult};
use markethub_core::search;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

pub const LOAD_FAILURE: &str = "Failed to fetch data from server";

#[derive(Debug, Clone)]
pub struct DirectoryState {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for DirectoryState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            products: Vec::new(),
            categories: Category::defaults(),
            loading: false,
            error: None,
        }
    }
}

pub struct AdminDirectory {
    api: Arc<dyn MarketApi>,
    state: Mutex<DirectoryState>,
}

impl AdminDirectory {
    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        Self {
            api,
            state: Mutex::new(DirectoryState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> DirectoryState {
        self.lock().clone()
    }

    /// Fetches users and products concurrently. Either failing keeps the old lists.
    pub async fn load(&self) -> PortResult<()> {
        self.lock().loading = true;
        let result = futures::try_join!(self.api.fetch_users(), self.api.fetch_products());

        let mut state = self.lock();
        state.loading = false;
        match result {
            Ok((users, products)) => {
                info!(users = users.len(), products = products.len(), "Admin directory loaded");
                state.users = users;
                state.products = products;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                error!("{}: {}", LOAD_FAILURE, e);
                state.error = Some(LOAD_FAILURE.to_string());
                Err(e)
            }
        }
    }

    //=====================================================================================
    // Local edits
    //=====================================================================================

    /// Overwrites the user with id `editing`, or adds `user` under a fresh id.
    pub fn save_user(&self, editing: Option<u64>, mut user: User) -> User {
        user.id = editing.unwrap_or_else(next_local_id);
        crud::upsert(&mut self.lock().users, user.clone());
        user
    }

    pub fn save_product(&self, editing: Option<u64>, mut product: Product) -> Product {
        product.id = editing.unwrap_or_else(next_local_id);
        crud::upsert(&mut self.lock().products, product.clone());
        product
    }

    /// New categories start with a count of zero.
    pub fn save_category(&self, editing: Option<u64>, mut category: Category) -> Category {
        match editing {
            Some(id) => category.id = id,
            None => {
                category.id = next_local_id();
                category.count = 0;
            }
        }
        crud::upsert(&mut self.lock().categories, category.clone());
        category
    }

    pub fn delete_user(&self, id: u64) -> bool {
        crud::remove(&mut self.lock().users, id)
    }

    pub fn delete_product(&self, id: u64) -> bool {
        crud::remove(&mut self.lock().products, id)
    }

    pub fn delete_category(&self, id: u64) -> bool {
        crud::remove(&mut self.lock().categories, id)
    }

    //=====================================================================================
    // Search
    //=====================================================================================

    pub fn filtered_users(&self, term: &str) -> Vec<User> {
        search::users(&self.lock().users, term).into_iter().cloned().collect()
    }

    pub fn filtered_products(&self, term: &str) -> Vec<Product> {
        search::products(&self.lock().products, term).into_iter().cloned().collect()
    }

    pub fn filtered_categories(&self, term: &str) -> Vec<Category> {
        search::categories(&self.lock().categories, term).into_iter().cloned().collect()
    }
}
