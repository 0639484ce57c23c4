pub mod endpoints;
pub mod session;

pub use session::{HttpReply, Session};
