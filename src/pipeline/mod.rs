pub mod events;
pub mod orchestrator;
pub mod stage;
pub mod state;

pub use events::ChainEvent;
pub use orchestrator::ChainOrchestrator;
pub use state::{ChainResult, ChainState, StageName, StageOutcome};
