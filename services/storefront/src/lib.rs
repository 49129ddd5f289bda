pub mod adapters;
pub mod config;
pub mod error;
pub mod keys;
pub mod password;
pub mod state;
pub mod stores;

pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use state::AppState;
