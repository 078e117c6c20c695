pub mod clock;
pub mod error;
pub mod leaderboard;
pub mod notifications;
pub mod service;
pub mod store;

pub use crate::error::{MutationError, StoreError};
pub use crate::service::{ReadingService, ReadingServiceBuilder};
pub use crate::store::{JsonFileStore, MemoryStore, ReadingStore};
