pub mod dummyjson;
pub mod storage;
pub mod toast;

pub use dummyjson::DummyJsonAdapter;
pub use storage::{FileStore, MemoryStore};
pub use toast::ToastNotifier;
