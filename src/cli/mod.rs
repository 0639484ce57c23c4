pub mod commands;
pub mod progress;
pub mod run;

pub use commands::{usage, Cli};
pub use run::handle_run;
