// src/hierarchy.rs
//! Package hierarchy derivation from dotted identifiers
//!
//! A document with id `s1.s2...sn` belongs to every ancestor package
//! `s1`, `s1.s2`, ..., `s1...s(n-1)`: package `a.b` contains `a.b.c` and
//! `a.b.c.d` alike. Single-segment ids belong to no package.

use std::collections::BTreeMap;
use tracing::debug;

/// Membership map for one package: member dotted id -> member relative path
pub type PackageMembers = BTreeMap<String, String>;

/// All ancestor package ids for a dotted identifier
///
/// ```
/// use svd_index::hierarchy::ancestor_packages;
///
/// assert_eq!(ancestor_packages("a.b.c"), vec!["a", "a.b"]);
/// assert!(ancestor_packages("standalone").is_empty());
/// ```
pub fn ancestor_packages(dotted_id: &str) -> Vec<String> {
    let segments: Vec<&str> = dotted_id.split('.').collect();
    (1..segments.len())
        .map(|i| segments[..i].join("."))
        .collect()
}

/// Derive the package membership map from a set of documents
///
/// Pure and order-independent: input is a set of `(dotted_id, relative_path)`
/// pairs, output is keyed by package id with members as sorted maps, so any
/// input permutation yields an identical result.
pub fn resolve_packages<'a, I>(documents: I) -> BTreeMap<String, PackageMembers>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut packages: BTreeMap<String, PackageMembers> = BTreeMap::new();

    for (dotted_id, relative_path) in documents {
        for package in ancestor_packages(dotted_id) {
            packages
                .entry(package)
                .or_default()
                .insert(dotted_id.to_string(), relative_path.to_string());
        }
    }

    debug!("resolved {} packages", packages.len());
    packages
}
