pub mod binary;
pub mod identity;

pub use binary::{BinaryExtractor, ExtractionState, POSITION_PLACEHOLDER};
pub use identity::IdentityResolver;
