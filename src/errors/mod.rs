pub mod types;
pub mod classification;

pub use types::ChainError;
pub use classification::ErrorClassification;
