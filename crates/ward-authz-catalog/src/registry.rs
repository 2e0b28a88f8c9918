// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supertype lookups for entity types and classifications.

use std::collections::{BTreeSet, HashMap, VecDeque};

use parking_lot::RwLock;

/// Transitive ancestor queries over the catalog's type system.
///
/// Unknown names have no ancestors.
pub trait TypeRegistry: Send + Sync {
	fn entity_type_ancestors(&self, type_name: &str) -> BTreeSet<String>;

	fn classification_ancestors(&self, classification: &str) -> BTreeSet<String>;
}

/// Registry over directly declared supertypes.
///
/// Types may be (re)declared at any time; queries see the latest
/// declarations.
#[derive(Debug, Default)]
pub struct InMemoryTypeRegistry {
	entity_types: RwLock<HashMap<String, BTreeSet<String>>>,
	classifications: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl InMemoryTypeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_entity_type<I, S>(self, name: &str, supertypes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.declare_entity_type(name, supertypes);
		self
	}

	pub fn with_classification<I, S>(self, name: &str, supertypes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.declare_classification(name, supertypes);
		self
	}

	pub fn declare_entity_type<I, S>(&self, name: &str, supertypes: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let supertypes = supertypes.into_iter().map(Into::into).collect();
		self.entity_types.write().insert(name.to_string(), supertypes);
	}

	pub fn declare_classification<I, S>(&self, name: &str, supertypes: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let supertypes = supertypes.into_iter().map(Into::into).collect();
		self
			.classifications
			.write()
			.insert(name.to_string(), supertypes);
	}
}

impl TypeRegistry for InMemoryTypeRegistry {
	fn entity_type_ancestors(&self, type_name: &str) -> BTreeSet<String> {
		transitive_supertypes(&self.entity_types.read(), type_name)
	}

	fn classification_ancestors(&self, classification: &str) -> BTreeSet<String> {
		transitive_supertypes(&self.classifications.read(), classification)
	}
}

/// Breadth-first walk over declared supertypes. Cycles terminate; `name`
/// itself is never reported as its own ancestor.
fn transitive_supertypes(declared: &HashMap<String, BTreeSet<String>>, name: &str) -> BTreeSet<String> {
	let mut ancestors = BTreeSet::new();
	let mut pending: VecDeque<&str> = VecDeque::from([name]);

	while let Some(current) = pending.pop_front() {
		let Some(supertypes) = declared.get(current) else {
			continue;
		};
		for supertype in supertypes {
			if supertype != name && ancestors.insert(supertype.clone()) {
				pending.push_back(supertype);
			}
		}
	}

	ancestors
}
