//! Input fingerprinting.
//!
//! Analyses are pure, so a fingerprint of the inputs and the analysis
//! settings is enough for a caller to memoize results.

use sha2::{Digest, Sha256};

use super::spec::AnalysisSettings;
use crate::plan::ChangePlan;

/// Hasher for computing input fingerprints.
#[derive(Debug, Default)]
pub struct PlanHasher;

impl PlanHasher {
    /// Creates a new hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the fingerprint of a plan, graph text and settings.
    ///
    /// Plan content is hashed through its parsed form, so formatting
    /// differences in the source document do not change the result.
    #[must_use]
    pub fn fingerprint(
        &self,
        plan: &ChangePlan,
        graph_text: &str,
        settings: &AnalysisSettings,
    ) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.hash_plan(plan).as_bytes());
        hasher.update(Self::hash_text(graph_text).as_bytes());

        hasher.update([
            u8::from(settings.warn_on_ambiguous_resolution),
            u8::from(settings.distinguish_replacements),
        ]);
        if let Some(limit) = settings.max_traversal_nodes {
            hasher.update(u64::try_from(limit).unwrap_or(u64::MAX).to_be_bytes());
        }

        hex::encode(hasher.finalize())
    }

    /// Computes the hash of a plan document.
    #[must_use]
    pub fn hash_plan(&self, plan: &ChangePlan) -> String {
        // Field order is fixed by the types, so the encoding is stable.
        let bytes = serde_json::to_vec(plan).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }

    /// Computes the hash of a text document.
    #[must_use]
    pub fn hash_text(text: &str) -> String {
        hex::encode(Sha256::digest(text.as_bytes()))
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }

    /// Compares two hashes to determine if they are equal.
    #[must_use]
    pub fn hashes_match(hash1: &str, hash2: &str) -> bool {
        if hash1.len() != hash2.len() {
            return false;
        }

        hash1
            .bytes()
            .zip(hash2.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
