//! Module tree walks shared by the analyzers.
//!
//! Both walks keep a visited set of module paths. A path seen twice is
//! skipped with a warning, and the walk carries on with what it has. State
//! modules report their own addresses, so a malformed state can repeat one.
//! Configuration paths are built from unique module-call keys and never
//! repeat; the guard there is defensive only.

use std::collections::HashSet;
use tracing::warn;

use crate::plan::{ConfigModule, StateModule};

/// Visits every configuration module depth-first with its address prefix.
///
/// The root has an empty prefix; each module call nests `module.<name>`.
/// Prefixes are unique per tree, so the visited check never skips here.
pub fn walk_config<F>(root: Option<&ConfigModule>, mut visit: F)
where
    F: FnMut(&str, &ConfigModule),
{
    let Some(root) = root else {
        return;
    };
    let mut visited = HashSet::new();
    walk_config_inner(root, "", &mut visited, &mut visit);
}

fn walk_config_inner<F>(
    module: &ConfigModule,
    prefix: &str,
    visited: &mut HashSet<String>,
    visit: &mut F,
) where
    F: FnMut(&str, &ConfigModule),
{
    if !visited.insert(prefix.to_string()) {
        warn!("Configuration module '{prefix}' already visited, skipping");
        return;
    }

    visit(prefix, module);

    for (name, call) in &module.module_calls {
        if let Some(child) = &call.module {
            let child_prefix = qualify(prefix, &format!("module.{name}"));
            walk_config_inner(child, &child_prefix, visited, visit);
        }
    }
}

/// Visits every state module depth-first with its address prefix.
///
/// The root has an empty prefix; each child uses its own reported address.
pub fn walk_state<F>(root: Option<&StateModule>, mut visit: F)
where
    F: FnMut(&str, &StateModule),
{
    let Some(root) = root else {
        return;
    };
    let mut visited = HashSet::new();
    walk_state_inner(root, "", &mut visited, &mut visit);
}

fn walk_state_inner<F>(
    module: &StateModule,
    prefix: &str,
    visited: &mut HashSet<String>,
    visit: &mut F,
) where
    F: FnMut(&str, &StateModule),
{
    visit(prefix, module);

    for child in &module.child_modules {
        let child_prefix = child.address.as_deref().unwrap_or_default();
        if !child_prefix.is_empty() && !visited.insert(child_prefix.to_string()) {
            warn!("State module '{child_prefix}' already visited, skipping");
            continue;
        }
        walk_state_inner(child, child_prefix, visited, visit);
    }
}

/// Joins a module prefix and a relative address.
#[must_use]
pub fn qualify(prefix: &str, address: &str) -> String {
    if prefix.is_empty() {
        address.to_string()
    } else {
        format!("{prefix}.{address}")
    }
}

/// Joins a state module prefix and a resource address, unless the address
/// already carries the prefix.
#[must_use]
pub fn qualify_state(prefix: &str, address: &str) -> String {
    if prefix.is_empty()
        || address
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
    {
        address.to_string()
    } else {
        format!("{prefix}.{address}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ChangePlan;
    use serde_json::json;

    #[test]
    fn test_config_prefixes() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "configuration": { "root_module": {
                "module_calls": {
                    "network": { "module": {
                        "module_calls": { "subnets": { "module": {} } }
                    }},
                    "empty": {}
                }
            }}
        }))
        .unwrap();

        let mut prefixes = Vec::new();
        walk_config(plan.config_root(), |prefix, _| prefixes.push(prefix.to_string()));
        assert_eq!(prefixes, vec!["", "module.network", "module.network.module.subnets"]);
    }

    #[test]
    fn test_state_duplicate_module_is_skipped() {
        let plan: ChangePlan = serde_json::from_value(json!({
            "prior_state": { "values": { "root_module": {
                "child_modules": [
                    { "address": "module.a", "resources": [{ "address": "module.a.x.one" }] },
                    { "address": "module.a", "resources": [{ "address": "module.a.x.two" }] },
                    { "resources": [{ "address": "y.three" }] }
                ]
            }}}
        }))
        .unwrap();

        let mut seen = Vec::new();
        walk_state(plan.prior_root(), |prefix, module| {
            for r in &module.resources {
                seen.push(qualify_state(prefix, &r.address));
            }
        });
        assert_eq!(seen, vec!["module.a.x.one", "y.three"]);
    }

    #[test]
    fn test_qualify_state() {
        assert_eq!(qualify_state("", "aws_s3_bucket.a"), "aws_s3_bucket.a");
        assert_eq!(qualify_state("module.a", "aws_s3_bucket.a"), "module.a.aws_s3_bucket.a");
        assert_eq!(qualify_state("module.a", "module.a.aws_s3_bucket.a"), "module.a.aws_s3_bucket.a");
        assert_eq!(qualify_state("module.a", "module.ab.aws_s3_bucket.a"), "module.a.module.ab.aws_s3_bucket.a");
    }
}
