pub mod admin;
pub mod cart;
pub mod catalog;
pub mod crud;
pub mod session;

pub use admin::{AdminDirectory, DirectoryState};
pub use cart::{BadgeCounts, CartStore};
pub use catalog::Catalog;
pub use crud::CrudClient;
pub use session::SessionStore;
