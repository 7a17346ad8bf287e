//! Dependency resolution
//!
//! Iterative depth-first traversal with an explicit frame stack, so cycle
//! detection works on all inputs and the call depth is bounded. The output
//! plan lists dependencies before dependents, each package at most once.
//! Resolution is pure over the index: the same index and requirement always
//! produce the same plan, regardless of what is installed.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::index::PackageIndex;
use crate::version::Requirement;

/// One step of an install plan: package name and chosen version.
pub type PlanEntry = (String, String);

struct Frame {
    package: String,
    requirement: String,
    deps: Vec<(String, String)>,
    next: usize,
    entered: bool,
}

impl Frame {
    fn new(package: &str, requirement: &str) -> Frame {
        Frame {
            package: package.to_string(),
            requirement: requirement.to_string(),
            deps: Vec::new(),
            next: 0,
            entered: false,
        }
    }
}

/// Resolve a single root package against a requirement string.
pub fn resolve(index: &PackageIndex, package: &str, requirement: &str) -> Result<Vec<PlanEntry>> {
    resolve_many(index, &[(package.to_string(), requirement.to_string())])
}

/// Resolve several roots into one plan. Shared dependencies are chosen once;
/// a later requirement that the existing choice cannot satisfy is a
/// [`Error::VersionConflict`].
pub fn resolve_many(index: &PackageIndex, roots: &[(String, String)]) -> Result<Vec<PlanEntry>> {
    let mut plan: Vec<PlanEntry> = Vec::new();
    let mut chosen: IndexMap<String, String> = IndexMap::new();
    let mut visiting: HashSet<String> = HashSet::new();

    for (package, requirement) in roots {
        let mut stack = vec![Frame::new(package, requirement)];
        while !stack.is_empty() {
            let top = stack.len() - 1;
            if !stack[top].entered {
                let name = stack[top].package.clone();
                if visiting.contains(&name) {
                    return Err(Error::DependencyCycle(name));
                }
                let requirement = Requirement::parse(&stack[top].requirement);
                if let Some(existing) = chosen.get(&name) {
                    if !requirement.matches(existing) {
                        return Err(Error::VersionConflict {
                            package: name,
                            chosen: existing.clone(),
                            requirement: requirement.to_string(),
                        });
                    }
                    // Already planned, dependencies included.
                    stack.pop();
                    continue;
                }
                let entry = index
                    .entry(&name)
                    .ok_or_else(|| Error::PackageNotFound(name.clone()))?;
                let record = entry.best_match(&requirement).ok_or_else(|| {
                    Error::NoSatisfyingVersion {
                        package: name.clone(),
                        requirement: requirement.to_string(),
                    }
                })?;
                chosen.insert(name.clone(), record.version.clone());
                stack[top].deps = record
                    .deps
                    .iter()
                    .map(|(dep, req)| (dep.clone(), req.clone()))
                    .collect();
                stack[top].entered = true;
                visiting.insert(name);
            }
            if stack[top].next < stack[top].deps.len() {
                let (dep, requirement) = stack[top].deps[stack[top].next].clone();
                stack[top].next += 1;
                stack.push(Frame::new(&dep, &requirement));
            } else if let Some(frame) = stack.pop() {
                visiting.remove(&frame.package);
                if let Some(version) = chosen.get(&frame.package) {
                    plan.push((frame.package, version.clone()));
                }
            }
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(json: &str) -> PackageIndex {
        PackageIndex::parse(json).unwrap()
    }

    #[test]
    fn test_leaf_package() {
        let index = index(r#"{"foo": {"versions": [{"version": "1.0", "url": "u"}]}}"#);
        let plan = resolve(&index, "foo", "").unwrap();
        assert_eq!(plan, vec![("foo".to_string(), "1.0".to_string())]);
    }

    #[test]
    fn test_dependencies_come_first() {
        let index = index(
            r#"{
                "app": {"versions": [{"version": "2.0", "url": "u", "deps": {"lib": ">=1.0"}}]},
                "lib": {"versions": [
                    {"version": "1.0", "url": "u"},
                    {"version": "1.1", "url": "u"}
                ]}
            }"#,
        );
        let plan = resolve(&index, "app", "").unwrap();
        assert_eq!(
            plan,
            vec![
                ("lib".to_string(), "1.1".to_string()),
                ("app".to_string(), "2.0".to_string())
            ]
        );
    }

    #[test]
    fn test_shared_dependency_planned_once() {
        let index = index(
            r#"{
                "a": {"versions": [{"version": "1.0", "url": "u", "deps": {"c": ""}}]},
                "b": {"versions": [{"version": "1.0", "url": "u", "deps": {"c": ""}}]},
                "c": {"versions": [{"version": "1.0", "url": "u"}]}
            }"#,
        );
        let roots = vec![
            ("a".to_string(), String::new()),
            ("b".to_string(), String::new()),
        ];
        let plan = resolve_many(&index, &roots).unwrap();
        assert_eq!(plan.iter().filter(|(name, _)| name == "c").count(), 1);
        let pos = |name: &str| plan.iter().position(|(n, _)| n == name).unwrap();
        assert!(pos("c") < pos("a"));
        assert!(pos("c") < pos("b"));
    }

    #[test]
    fn test_conflicting_requirements() {
        // a wants c>=1.0 (picks 1.1), b then demands exactly 1.0.
        let index = index(
            r#"{
                "a": {"versions": [{"version": "1.0", "url": "u", "deps": {"c": ">=1.0"}}]},
                "b": {"versions": [{"version": "1.0", "url": "u", "deps": {"c": "=1.0"}}]},
                "c": {"versions": [
                    {"version": "1.0", "url": "u"},
                    {"version": "1.1", "url": "u"}
                ]}
            }"#,
        );
        let roots = vec![
            ("a".to_string(), String::new()),
            ("b".to_string(), String::new()),
        ];
        let err = resolve_many(&index, &roots).unwrap_err();
        match err {
            Error::VersionConflict {
                package, chosen, ..
            } => {
                assert_eq!(package, "c");
                assert_eq!(chosen, "1.1");
            }
            other => panic!("expected VersionConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_detected() {
        let index = index(
            r#"{
                "a": {"versions": [{"version": "1.0", "url": "u", "deps": {"b": ""}}]},
                "b": {"versions": [{"version": "1.0", "url": "u", "deps": {"a": ""}}]}
            }"#,
        );
        assert!(matches!(
            resolve(&index, "a", "").unwrap_err(),
            Error::DependencyCycle(_)
        ));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let index = index(
            r#"{"a": {"versions": [{"version": "1.0", "url": "u", "deps": {"a": ""}}]}}"#,
        );
        assert!(matches!(
            resolve(&index, "a", "").unwrap_err(),
            Error::DependencyCycle(_)
        ));
    }

    #[test]
    fn test_unknown_package() {
        let index = index("{}");
        assert!(matches!(
            resolve(&index, "ghost", "").unwrap_err(),
            Error::PackageNotFound(_)
        ));
    }

    #[test]
    fn test_no_satisfying_version() {
        let index = index(r#"{"foo": {"versions": [{"version": "1.0", "url": "u"}]}}"#);
        let err = resolve(&index, "foo", ">1.0").unwrap_err();
        assert!(matches!(err, Error::NoSatisfyingVersion { .. }));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let index = index(
            r#"{
                "app": {"versions": [{"version": "1.0", "url": "u", "deps": {"x": "", "y": ""}}]},
                "x": {"versions": [{"version": "1.0", "url": "u"}]},
                "y": {"versions": [{"version": "1.0", "url": "u"}]}
            }"#,
        );
        let first = resolve(&index, "app", "").unwrap();
        let second = resolve(&index, "app", "").unwrap();
        assert_eq!(first, second);
        // Dependency order follows the record's map order.
        assert_eq!(first[0].0, "x");
        assert_eq!(first[1].0, "y");
    }
}
