use tokio::sync::mpsc::UnboundedSender;
use crate::oracle::{Oracle, Operator, OracleQuery};
use crate::pipeline::events::ChainEvent;
use tracing::{debug, warn};

/// Printable ASCII window searched for every position.
pub const PRINTABLE_LOW: u8 = 32;
pub const PRINTABLE_HIGH: u8 = 126;

/// Placeholder replaced by the 1-based character position.
pub const POSITION_PLACEHOLDER: &str = "{pos}";

/// Search state for one character position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionState {
    pub position: usize,
    pub low: u8,
    pub high: u8,
    pub resolved: Option<char>,
}

impl ExtractionState {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            low: PRINTABLE_LOW,
            high: PRINTABLE_HIGH,
            resolved: None,
        }
    }

    fn searching(&self) -> bool {
        self.resolved.is_none() && self.low <= self.high
    }

    fn midpoint(&self) -> u8 {
        // low and high are at most 127, the sum fits in u16
        ((self.low as u16 + self.high as u16) / 2) as u8
    }
}

/// Recovers a string one character at a time by binary search over an oracle.
pub struct BinaryExtractor<'a> {
    oracle: &'a dyn Oracle,
    events: Option<UnboundedSender<ChainEvent>>,
}

impl<'a> BinaryExtractor<'a> {
    pub fn new(oracle: &'a dyn Oracle) -> Self {
        Self { oracle, events: None }
    }

    pub fn with_event_channel(mut self, tx: UnboundedSender<ChainEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn emit(&self, event: ChainEvent) {
        if let Some(ref tx) = self.events {
            let _ = tx.send(event);
        }
    }

    /// Extract `length` characters. `template` must select the ASCII code of
    /// the character at [`POSITION_PLACEHOLDER`]. Any unresolved position
    /// aborts the whole extraction.
    pub async fn extract(&self, template: &str, length: usize) -> Option<String> {
        let mut dumped = String::with_capacity(length);
        self.emit(ChainEvent::ExtractionStarted { total: length });

        for position in 1..=length {
            match self.resolve_position(template, position).await {
                Some(c) => {
                    dumped.push(c);
                    self.emit(ChainEvent::CharacterResolved { position, total: length });
                }
                None => {
                    warn!(position, "Failed to dump character");
                    self.emit(ChainEvent::ExtractionFinished { success: false });
                    return None;
                }
            }
        }

        self.emit(ChainEvent::ExtractionFinished { success: true });
        Some(dumped)
    }

    async fn resolve_position(&self, template: &str, position: usize) -> Option<char> {
        let left = template.replace(POSITION_PLACEHOLDER, &position.to_string());
        let mut state = ExtractionState::new(position);

        while state.searching() {
            let mid = state.midpoint();

            if self.oracle.probe(&OracleQuery::against_literal(left.as_str(), Operator::Gt, mid)).await {
                state.low = mid + 1;
            } else if self.oracle.probe(&OracleQuery::against_literal(left.as_str(), Operator::Lt, mid)).await {
                // mid >= 32, cannot underflow
                state.high = mid - 1;
            } else {
                state.resolved = Some(mid as char);
            }
        }

        debug!(position, resolved = ?state.resolved, "Position search finished");
        state.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use async_trait::async_trait;
    use crate::oracle::query::unquote_number;

    /// Answers position queries of the form `char:<pos>` against a secret.
    struct SecretOracle {
        secret: Vec<u8>,
        sent: AtomicU64,
    }

    impl SecretOracle {
        fn new(secret: &str) -> Self {
            Self { secret: secret.as_bytes().to_vec(), sent: AtomicU64::new(0) }
        }
    }

    #[async_trait]
    impl Oracle for SecretOracle {
        async fn probe(&self, query: &OracleQuery) -> bool {
            self.sent.fetch_add(1, Ordering::Relaxed);
            let pos: usize = match query.left.strip_prefix("char:").and_then(|p| p.parse().ok()) {
                Some(p) => p,
                None => return false,
            };
            let (Some(&actual), Some(rhs)) = (self.secret.get(pos - 1), unquote_number(&query.right)) else {
                return false;
            };
            let actual = actual as i64;
            match query.operator {
                Operator::Gt => actual > rhs,
                Operator::Lt => actual < rhs,
                Operator::Eq => actual == rhs,
            }
        }

        fn probes_sent(&self) -> u64 {
            self.sent.load(Ordering::Relaxed)
        }
    }

    /// Claims every value is greater than anything asked.
    struct AlwaysGreater;

    #[async_trait]
    impl Oracle for AlwaysGreater {
        async fn probe(&self, query: &OracleQuery) -> bool {
            query.operator == Operator::Gt
        }

        fn probes_sent(&self) -> u64 {
            0
        }
    }

    async fn check_extracts(secret: &str) {
        let oracle = SecretOracle::new(secret);
        let extractor = BinaryExtractor::new(&oracle);
        let dumped = extractor.extract("char:{pos}", secret.len()).await;
        assert_eq!(dumped.as_deref(), Some(secret));
        assert!(
            oracle.probes_sent() <= 14 * secret.len() as u64,
            "{} probes for {} chars",
            oracle.probes_sent(),
            secret.len()
        );
    }

    #[tokio::test]
    async fn test_extracts_hex_token() {
        check_extracts("5f4dcc3b5aa765d61d8327deb882cf99").await;
    }

    #[tokio::test]
    async fn test_extracts_window_edges() {
        check_extracts(" ~ ~  ~").await;
    }

    #[tokio::test]
    async fn test_extracts_every_printable_character() {
        let printable: String = (PRINTABLE_LOW..=PRINTABLE_HIGH).map(|b| b as char).collect();
        for chunk in printable.as_bytes().chunks(32) {
            check_extracts(std::str::from_utf8(chunk).unwrap()).await;
        }
    }

    #[tokio::test]
    async fn test_extracts_punctuation_heavy_value() {
        check_extracts("'\"\\`{}[]()<>;:!?@#$%^&*-_=+|,./").await;
    }

    #[tokio::test]
    async fn test_zero_length_is_empty() {
        let oracle = SecretOracle::new("");
        let dumped = BinaryExtractor::new(&oracle).extract("char:{pos}", 0).await;
        assert_eq!(dumped.as_deref(), Some(""));
        assert_eq!(oracle.probes_sent(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_window_aborts() {
        let dumped = BinaryExtractor::new(&AlwaysGreater).extract("char:{pos}", 4).await;
        assert_eq!(dumped, None);
    }

    #[tokio::test]
    async fn test_emits_progress_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let oracle = SecretOracle::new("ab");
        BinaryExtractor::new(&oracle).with_event_channel(tx).extract("char:{pos}", 2).await;

        let mut resolved = 0;
        let mut finished = None;
        while let Ok(event) = rx.try_recv() {
            match event {
                ChainEvent::CharacterResolved { .. } => resolved += 1,
                ChainEvent::ExtractionFinished { success } => finished = Some(success),
                _ => {}
            }
        }
        assert_eq!(resolved, 2);
        assert_eq!(finished, Some(true));
    }

    #[test]
    fn test_state_midpoint() {
        let state = ExtractionState::new(1);
        assert_eq!(state.midpoint(), 79);
        assert!(state.searching());
    }
}
