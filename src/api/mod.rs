pub mod client;
pub mod error;
pub mod types;

pub use client::{VulnBackend, VulnClient};
pub use error::ApiError;
pub use types::{ApiResponse, VulnCreate, VulnUpdate};
