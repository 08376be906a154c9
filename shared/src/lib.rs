pub mod models {
    pub mod creator;
}

pub mod error;
pub mod timestamp;

// Re-export commonly used items
pub use error::{SharedError, Result};

// Re-export models
pub use models::creator::{
    has_creator_access, CreatorPlan, CreatorStatus, SubscriptionStatus,
};
