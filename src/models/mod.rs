pub mod credential;
pub mod selector;
pub mod target;

pub use credential::Credential;
pub use selector::{BypassMethod, ChainSelector, RceVariant};
pub use target::Target;
