// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canonical resource descriptors.
//!
//! A [`ResourceDescriptor`] is the caller-agnostic encoding of "what is being
//! accessed": a mapping from dimension name to a scalar or set value. The
//! dimension names come from a fixed, caller-specific vocabulary whose order
//! is also the order used when rendering the descriptor as a path.
//!
//! Unset dimensions are absent; there is no null value.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::warn;

/// Separator used by [`ResourceDescriptor::as_path_string`].
pub const PATH_SEPARATOR: &str = "/";

/// Value bound to a single resource dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceValue {
	Single(String),
	Set(BTreeSet<String>),
}

impl ResourceValue {
	/// Returns true if `candidate` is (one of) the bound values.
	pub fn contains(&self, candidate: &str) -> bool {
		match self {
			ResourceValue::Single(value) => value == candidate,
			ResourceValue::Set(values) => values.contains(candidate),
		}
	}

	pub fn as_single(&self) -> Option<&str> {
		match self {
			ResourceValue::Single(value) => Some(value),
			ResourceValue::Set(_) => None,
		}
	}

	pub fn as_set(&self) -> Option<&BTreeSet<String>> {
		match self {
			ResourceValue::Single(_) => None,
			ResourceValue::Set(values) => Some(values),
		}
	}
}

impl fmt::Display for ResourceValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceValue::Single(value) => write!(f, "{value}"),
			ResourceValue::Set(values) => {
				let joined = values.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
				write!(f, "[{joined}]")
			}
		}
	}
}

impl From<String> for ResourceValue {
	fn from(value: String) -> Self {
		ResourceValue::Single(value)
	}
}

impl From<&str> for ResourceValue {
	fn from(value: &str) -> Self {
		ResourceValue::Single(value.to_string())
	}
}

impl From<BTreeSet<String>> for ResourceValue {
	fn from(values: BTreeSet<String>) -> Self {
		ResourceValue::Set(values)
	}
}

/// Immutable canonical resource descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
	#[serde(skip)]
	vocabulary: &'static [&'static str],
	values: BTreeMap<&'static str, ResourceValue>,
	/// Owning principal of the resource. Consumed by owner-based policy
	/// rules; never a resource dimension.
	owner_user: Option<String>,
}

impl ResourceDescriptor {
	/// Starts a descriptor over the given dimension vocabulary.
	pub fn builder(vocabulary: &'static [&'static str]) -> ResourceDescriptorBuilder {
		ResourceDescriptorBuilder {
			descriptor: ResourceDescriptor {
				vocabulary,
				values: BTreeMap::new(),
				owner_user: None,
			},
		}
	}

	pub fn vocabulary(&self) -> &'static [&'static str] {
		self.vocabulary
	}

	pub fn get(&self, dimension: &str) -> Option<&ResourceValue> {
		self.values.get(dimension)
	}

	pub fn contains_dimension(&self, dimension: &str) -> bool {
		self.values.contains_key(dimension)
	}

	/// Dimensions that carry a value, in vocabulary order.
	pub fn dimensions(&self) -> impl Iterator<Item = (&'static str, &ResourceValue)> + '_ {
		self
			.vocabulary
			.iter()
			.filter_map(move |dim| self.values.get(dim).map(|value| (*dim, value)))
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn owner_user(&self) -> Option<&str> {
		self.owner_user.as_deref()
	}

	/// Returns a copy of this descriptor with `dimension` rebound to `value`.
	///
	/// Used by multi-check requests that vary one dimension across
	/// sub-checks while the rest of the resource stays fixed.
	pub fn with_value(&self, dimension: &'static str, value: impl Into<ResourceValue>) -> Self {
		let mut next = self.clone();
		next.insert(dimension, value.into());
		next
	}

	/// Renders bound values in vocabulary order, joined with `/`.
	pub fn as_path_string(&self) -> String {
		self
			.dimensions()
			.map(|(_, value)| value.to_string())
			.collect::<Vec<_>>()
			.join(PATH_SEPARATOR)
	}

	/// Dimensions outside the vocabulary are dropped.
	fn insert(&mut self, dimension: &'static str, value: ResourceValue) {
		if !self.vocabulary.contains(&dimension) {
			warn!(dimension, "dimension is not part of the resource vocabulary, ignored");
			return;
		}
		self.values.insert(dimension, value);
	}
}

impl fmt::Display for ResourceDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{")?;
		for (i, (dim, value)) in self.dimensions().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{dim}={value}")?;
		}
		write!(f, "}}")
	}
}

/// Builder for [`ResourceDescriptor`].
#[derive(Debug, Clone)]
pub struct ResourceDescriptorBuilder {
	descriptor: ResourceDescriptor,
}

impl ResourceDescriptorBuilder {
	pub fn value(mut self, dimension: &'static str, value: impl Into<ResourceValue>) -> Self {
		self.descriptor.insert(dimension, value.into());
		self
	}

	/// Binds `dimension` only when a value is present.
	pub fn optional<V>(self, dimension: &'static str, value: Option<V>) -> Self
	where
		V: Into<ResourceValue>,
	{
		match value {
			Some(value) => self.value(dimension, value),
			None => self,
		}
	}

	pub fn owner_user(mut self, owner: Option<String>) -> Self {
		self.descriptor.owner_user = owner;
		self
	}

	pub fn build(self) -> ResourceDescriptor {
		self.descriptor
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const VOCAB: &[&str] = &["database", "table", "column"];

	#[test]
	fn unset_dimensions_are_absent() {
		let descriptor = ResourceDescriptor::builder(VOCAB)
			.value("database", "sales")
			.optional::<String>("table", None)
			.build();

		assert_eq!(descriptor.len(), 1);
		assert!(!descriptor.contains_dimension("table"));
		assert!(descriptor.get("table").is_none());
	}

	#[test]
	fn path_string_follows_vocabulary_order() {
		let columns: BTreeSet<String> = ["id".to_string(), "amount".to_string()].into();
		let descriptor = ResourceDescriptor::builder(VOCAB)
			.value("column", columns)
			.value("table", "orders")
			.value("database", "sales")
			.build();

		assert_eq!(descriptor.as_path_string(), "sales/orders/[amount, id]");
	}

	#[test]
	fn with_value_leaves_original_untouched() {
		let original = ResourceDescriptor::builder(VOCAB)
			.value("database", "sales")
			.build();
		let varied = original.with_value("table", "orders");

		assert!(!original.contains_dimension("table"));
		assert_eq!(
			varied.get("table").and_then(ResourceValue::as_single),
			Some("orders")
		);
		assert_eq!(varied.get("database"), original.get("database"));
	}

	#[test]
	fn owner_is_not_a_dimension() {
		let descriptor = ResourceDescriptor::builder(VOCAB)
			.value("database", "sales")
			.owner_user(Some("alice".to_string()))
			.build();

		assert_eq!(descriptor.owner_user(), Some("alice"));
		assert_eq!(descriptor.len(), 1);
		assert_eq!(descriptor.to_string(), "{database=sales}");
	}

	#[test]
	fn unknown_dimension_is_ignored() {
		let descriptor = ResourceDescriptor::builder(VOCAB)
			.value("database", "sales")
			.value("udf", "to_upper")
			.build();
		let varied = descriptor.with_value("schema", "public");

		assert_eq!(descriptor.len(), 1);
		assert!(descriptor.get("udf").is_none());
		assert_eq!(varied, descriptor);
		assert_eq!(varied.as_path_string(), "sales");
	}

	#[test]
	fn set_values_match_members() {
		let value = ResourceValue::from(BTreeSet::from(["a".to_string(), "b".to_string()]));
		assert!(value.contains("a"));
		assert!(!value.contains("c"));
		assert!(value.as_single().is_none());
	}
}
