//! Resolution of raw graph labels to canonical resource addresses.
//!
//! Graph labels carry decorations (`[root] aws_vpc.main (expand)`) that the
//! plan's addresses do not. Resolution is heuristic: several canonical
//! addresses can satisfy the same rule, and the first one in plan order
//! wins. The full candidate set is returned alongside the choice so callers
//! can report ambiguity.

use serde::Serialize;
use tracing::{debug, warn};

/// Rule that produced a resolution, checked in this order per address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// The label equals a canonical address.
    Exact,
    /// The label ends with a canonical address.
    Suffix,
    /// A canonical address occurs inside the label.
    ContainedInLabel,
    /// The label occurs inside a canonical address.
    ContainsLabel,
    /// No canonical address matched; the label is its own address.
    Fallback,
}

/// Outcome of resolving one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The raw label.
    pub label: String,
    /// The chosen address.
    pub address: String,
    /// Rule that selected the address.
    pub rule: MatchRule,
    /// Every canonical address satisfying a non-exact rule.
    pub candidates: Vec<String>,
}

/// Resolves labels against a fixed list of canonical addresses.
#[derive(Debug, Clone, Default)]
pub struct AddressResolver {
    canonical: Vec<String>,
    warn_on_ambiguity: bool,
}

impl AddressResolver {
    /// Creates a resolver over the given canonical addresses.
    ///
    /// Iteration order of `canonical` decides ties.
    #[must_use]
    pub fn new<I, S>(canonical: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical: canonical.into_iter().map(Into::into).collect(),
            warn_on_ambiguity: false,
        }
    }

    /// Logs ambiguous resolutions at `warn` instead of `debug`.
    #[must_use]
    pub const fn with_ambiguity_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_ambiguity = enabled;
        self
    }

    /// Returns the canonical addresses.
    #[must_use]
    pub fn canonical(&self) -> &[String] {
        &self.canonical
    }

    /// Resolves a raw label.
    ///
    /// Returns `None` only for an empty label. An exact match wins. Otherwise
    /// the first canonical address that is a suffix of the label, occurs in
    /// it, or contains it is chosen, and the label itself is the fallback.
    #[must_use]
    pub fn resolve(&self, label: &str) -> Option<Resolution> {
        if label.is_empty() {
            return None;
        }

        let candidates: Vec<String> = self
            .canonical
            .iter()
            .filter(|addr| {
                !addr.is_empty()
                    && addr.as_str() != label
                    && Self::match_rule(label, addr).is_some()
            })
            .cloned()
            .collect();

        let (address, rule) = if self.canonical.iter().any(|addr| addr.as_str() == label) {
            (label.to_string(), MatchRule::Exact)
        } else {
            self.canonical
                .iter()
                .filter(|addr| !addr.is_empty())
                .find_map(|addr| Self::match_rule(label, addr).map(|rule| (addr.clone(), rule)))
                .unwrap_or_else(|| (label.to_string(), MatchRule::Fallback))
        };

        if rule != MatchRule::Exact && candidates.len() > 1 {
            if self.warn_on_ambiguity {
                warn!(
                    "Ambiguous label '{label}' resolved to {address} ({} candidates: {})",
                    candidates.len(),
                    candidates.join(", ")
                );
            } else {
                debug!(
                    "Ambiguous label '{label}' resolved to {address} ({} candidates)",
                    candidates.len()
                );
            }
        }

        Some(Resolution {
            label: label.to_string(),
            address,
            rule,
            candidates,
        })
    }

    /// Resolves a label to an address only.
    #[must_use]
    pub fn resolve_address(&self, label: &str) -> Option<String> {
        self.resolve(label).map(|r| r.address)
    }

    fn match_rule(label: &str, addr: &str) -> Option<MatchRule> {
        if label.ends_with(addr) {
            Some(MatchRule::Suffix)
        } else if label.contains(addr) {
            Some(MatchRule::ContainedInLabel)
        } else if addr.contains(label) {
            Some(MatchRule::ContainsLabel)
        } else {
            None
        }
    }
}

impl Resolution {
    /// Returns true if more than one canonical address could have matched.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.rule != MatchRule::Exact && self.candidates.len() > 1
    }
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Exact => "exact",
            Self::Suffix => "suffix",
            Self::ContainedInLabel => "contained-in-label",
            Self::ContainsLabel => "contains-label",
            Self::Fallback => "fallback",
        };
        write!(f, "{s}")
    }
}
