use super::state::{ChainResult, StageName, StageOutcome};

/// Messages sent from a running chain to whatever is rendering it.
#[derive(Debug, Clone)]
pub enum ChainEvent {
    /// Chain execution started
    ChainStarted {
        run_id: String,
        target: String,
        chain: String,
    },
    /// A stage has begun
    StageStarted {
        stage: StageName,
        step: usize,
        display_name: &'static str,
    },
    /// A stage finished, successfully or not
    StageFinished {
        stage: StageName,
        outcome: StageOutcome,
    },
    /// Character-by-character extraction started
    ExtractionStarted {
        total: usize,
    },
    /// One more character recovered
    CharacterResolved {
        position: usize,
        total: usize,
    },
    ExtractionFinished {
        success: bool,
    },
    /// Chain ended, either at the last stage or by aborting early
    ChainFinished {
        result: ChainResult,
    },
}
