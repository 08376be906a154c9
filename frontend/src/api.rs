pub mod cache;
pub mod creators;
pub mod error;
pub mod store;

pub use cache::{QueryClient, QueryKey, QueryOptions, QueryOutcome};
pub use error::QueryError;
pub use store::{RemoteStore, RestStore, SelectQuery};
