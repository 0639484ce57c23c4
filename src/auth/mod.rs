pub mod login;
pub mod reset;
pub mod spray;

pub use login::SessionEstablisher;
pub use reset::{change_password, token_template, CredentialResetFlow};
pub use spray::TokenSpray;
