pub mod entities;
pub mod error;
pub mod service;

pub use entities::extract_entities;
pub use error::{DiscoveryError, Result};
pub use service::{DiscoveryResponse, DiscoveryService, DiscoveryTurn};
