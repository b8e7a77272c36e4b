//! Persistence layer: libSQL-backed content store with a change feed.

pub mod changes;
pub mod libsql_backend;
pub mod migrations;
pub mod model;
pub mod traits;

pub use changes::{ChangeEvent, ChangeFeed, ChangeObserver, ChangeOp, Subscription};
pub use libsql_backend::LibSqlStore;
pub use model::Entity;
pub use traits::ContentStore;
