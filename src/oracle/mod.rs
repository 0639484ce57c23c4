pub mod client;
pub mod query;

use async_trait::async_trait;

pub use client::{test_vulnerability, HttpOracle};
pub use query::{Operator, OracleQuery};

/// Reveals the truth value of a condition evaluated by the target.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// One request per call. Transport failures answer `false`.
    async fn probe(&self, query: &OracleQuery) -> bool;

    /// Number of probes issued so far.
    fn probes_sent(&self) -> u64;
}
