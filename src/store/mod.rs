pub mod auth_store;
pub mod order_store;
pub mod record_store;

pub use auth_store::AuthStore;
pub use order_store::OrderStore;
pub use record_store::{Record, RecordStore, Subscription};
