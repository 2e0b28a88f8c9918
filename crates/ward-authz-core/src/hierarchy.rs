// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type and classification closure expansion.
//!
//! Policies are written against a type or classification name, but a
//! resource must match policies written for any of its ancestors too. The
//! closure of a name is the name itself plus every transitive ancestor the
//! caller's lookup reports.

use std::collections::BTreeSet;

/// Supplies the transitive ancestors of a type or classification name.
///
/// Unknown names yield an empty set.
pub trait AncestorLookup {
	fn ancestors_of(&self, name: &str) -> BTreeSet<String>;
}

impl<F> AncestorLookup for F
where
	F: Fn(&str) -> BTreeSet<String>,
{
	fn ancestors_of(&self, name: &str) -> BTreeSet<String> {
		self(name)
	}
}

/// Returns `{name} ∪ ancestors_of(name)`.
pub fn expand<L>(name: &str, lookup: &L) -> BTreeSet<String>
where
	L: AncestorLookup + ?Sized,
{
	let mut closure = lookup.ancestors_of(name);
	closure.insert(name.to_string());
	closure
}

/// Union of the closures of every name in `names`.
pub fn expand_all<'a, I, L>(names: I, lookup: &L) -> BTreeSet<String>
where
	I: IntoIterator<Item = &'a String>,
	L: AncestorLookup + ?Sized,
{
	names
		.into_iter()
		.flat_map(|name| expand(name, lookup))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn pii_lookup(name: &str) -> BTreeSet<String> {
		match name {
			"PII_EMAIL" => ["PII".to_string(), "SENSITIVE".to_string()].into(),
			"PII" => ["SENSITIVE".to_string()].into(),
			_ => BTreeSet::new(),
		}
	}

	#[test]
	fn expand_includes_self_and_ancestors() {
		let closure = expand("PII_EMAIL", &pii_lookup);
		let expected: BTreeSet<String> = ["PII_EMAIL", "PII", "SENSITIVE"]
			.iter()
			.map(|s| s.to_string())
			.collect();
		assert_eq!(closure, expected);
	}

	#[test]
	fn unknown_name_expands_to_itself() {
		let closure = expand("hive_table", &pii_lookup);
		assert_eq!(closure.len(), 1);
		assert!(closure.contains("hive_table"));
	}

	#[test]
	fn expand_all_unions_closures() {
		let names = vec!["PII".to_string(), "FINANCE".to_string()];
		let closure = expand_all(&names, &pii_lookup);
		let expected: BTreeSet<String> = ["PII", "SENSITIVE", "FINANCE"]
			.iter()
			.map(|s| s.to_string())
			.collect();
		assert_eq!(closure, expected);
	}

	#[test]
	fn expand_all_of_nothing_is_empty() {
		let names: Vec<String> = Vec::new();
		assert!(expand_all(&names, &pii_lookup).is_empty());
	}

	proptest! {
		#[test]
		fn closure_always_contains_name(
			name in "[A-Za-z_]{1,16}",
			ancestors in proptest::collection::btree_set("[A-Za-z_]{1,16}", 0..8),
		) {
			let lookup = |_: &str| ancestors.clone();
			let closure = expand(&name, &lookup);
			prop_assert!(closure.contains(&name));
			prop_assert!(ancestors.is_subset(&closure));
			prop_assert!(closure.len() <= ancestors.len() + 1);
		}
	}
}
