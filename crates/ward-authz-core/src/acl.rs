// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ACL aggregation.
//!
//! The engine reports a resource's full ACL matrix keyed by free-form
//! privilege names and raw result codes. Callers only understand a closed
//! privilege enumeration, so the matrix is reshaped into typed results and
//! every privilege name outside that enumeration is dropped.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{AccessOutcome, RawAccessCode, RawAclMap, RawResourceAcls};

/// Typed ACL entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AclAccessResult {
	Allowed,
	NotAllowed,
	ConditionalAllowed,
}

impl AclAccessResult {
	/// Codes outside the engine contract map to `NotAllowed`.
	pub fn from_raw(code: RawAccessCode) -> Self {
		match code.outcome() {
			Some(outcome) => outcome.into(),
			None => {
				warn!(code = %code, "unrecognized engine result code, treating as not allowed");
				AclAccessResult::NotAllowed
			}
		}
	}
}

impl AclAccessResult {
	/// `NotAllowed` beats `ConditionalAllowed`, which beats `Allowed`.
	pub fn most_restrictive(self, other: Self) -> Self {
		fn rank(result: AclAccessResult) -> u8 {
			match result {
				AclAccessResult::NotAllowed => 2,
				AclAccessResult::ConditionalAllowed => 1,
				AclAccessResult::Allowed => 0,
			}
		}

		if rank(other) > rank(self) {
			other
		} else {
			self
		}
	}
}

impl From<AccessOutcome> for AclAccessResult {
	fn from(outcome: AccessOutcome) -> Self {
		match outcome {
			AccessOutcome::Allowed => AclAccessResult::Allowed,
			AccessOutcome::Denied => AclAccessResult::NotAllowed,
			AccessOutcome::Conditional => AclAccessResult::ConditionalAllowed,
		}
	}
}

/// A caller's closed privilege enumeration.
pub trait Privilege: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
	fn all() -> &'static [Self];

	/// Canonical name as used in policies.
	fn name(self) -> &'static str;
}

/// Case-insensitive lookup table over a [`Privilege`] enumeration.
///
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct KnownPrivileges<P> {
	by_name: HashMap<String, P>,
}

impl<P: Privilege> KnownPrivileges<P> {
	pub fn new() -> Self {
		let by_name = P::all()
			.iter()
			.map(|privilege| (privilege.name().to_ascii_lowercase(), *privilege))
			.collect();
		Self { by_name }
	}

	pub fn lookup(&self, name: &str) -> Option<P> {
		self.by_name.get(&name.to_ascii_lowercase()).copied()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.lookup(name).is_some()
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}

impl<P: Privilege> Default for KnownPrivileges<P> {
	fn default() -> Self {
		Self::new()
	}
}

/// principal -> privilege -> typed result.
pub type PermissionMap<P> = BTreeMap<String, BTreeMap<P, AclAccessResult>>;

/// Typed, filtered ACLs of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceAcls<P: Ord> {
	pub user_permissions: PermissionMap<P>,
	pub group_permissions: PermissionMap<P>,
}

impl<P: Ord> Default for ResourceAcls<P> {
	fn default() -> Self {
		Self {
			user_permissions: BTreeMap::new(),
			group_permissions: BTreeMap::new(),
		}
	}
}

impl<P: Privilege> ResourceAcls<P> {
	pub fn user(&self, user: &str, privilege: P) -> Option<AclAccessResult> {
		self
			.user_permissions
			.get(user)
			.and_then(|perms| perms.get(&privilege))
			.copied()
	}

	pub fn group(&self, group: &str, privilege: P) -> Option<AclAccessResult> {
		self
			.group_permissions
			.get(group)
			.and_then(|perms| perms.get(&privilege))
			.copied()
	}
}

/// Reshapes the engine's raw user and group ACL maps.
pub fn aggregate<P: Privilege>(raw: &RawResourceAcls, known: &KnownPrivileges<P>) -> ResourceAcls<P> {
	ResourceAcls {
		user_permissions: convert(&raw.user_acls, known),
		group_permissions: convert(&raw.group_acls, known),
	}
}

/// Names that differ only in case collapse onto one privilege; the most
/// restrictive of their results is kept.
fn convert<P: Privilege>(raw: &RawAclMap, known: &KnownPrivileges<P>) -> PermissionMap<P> {
	raw
		.iter()
		.map(|(principal, privileges)| {
			let mut permissions = BTreeMap::new();
			for (name, code) in privileges {
				let Some(privilege) = known.lookup(name) else {
					continue;
				};
				let result = AclAccessResult::from_raw(*code);
				permissions
					.entry(privilege)
					.and_modify(|current: &mut AclAccessResult| *current = current.most_restrictive(result))
					.or_insert(result);
			}
			(principal.clone(), permissions)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
	enum TestPrivilege {
		Select,
		Update,
	}

	impl Privilege for TestPrivilege {
		fn all() -> &'static [Self] {
			&[TestPrivilege::Select, TestPrivilege::Update]
		}

		fn name(self) -> &'static str {
			match self {
				TestPrivilege::Select => "select",
				TestPrivilege::Update => "update",
			}
		}
	}

	fn raw_map(entries: Vec<(&str, Vec<(&str, i32)>)>) -> RawAclMap {
		entries
			.into_iter()
			.map(|(principal, privileges)| {
				let privileges = privileges
					.into_iter()
					.map(|(name, code)| (name.to_string(), RawAccessCode::new(code)))
					.collect();
				(principal.to_string(), privileges)
			})
			.collect()
	}

	#[test]
	fn unknown_privileges_are_dropped() {
		let raw = RawResourceAcls {
			user_acls: raw_map(vec![("alice", vec![("select", 1), ("bogus", 1)])]),
			group_acls: RawAclMap::new(),
		};
		let acls = aggregate(&raw, &KnownPrivileges::<TestPrivilege>::new());

		let alice = &acls.user_permissions["alice"];
		assert_eq!(alice.len(), 1);
		assert_eq!(alice[&TestPrivilege::Select], AclAccessResult::Allowed);
	}

	#[test]
	fn privilege_names_match_case_insensitively() {
		let raw = RawResourceAcls {
			user_acls: RawAclMap::new(),
			group_acls: raw_map(vec![("analysts", vec![("SELECT", 2), ("Update", 0)])]),
		};
		let acls = aggregate(&raw, &KnownPrivileges::<TestPrivilege>::new());

		assert_eq!(
			acls.group("analysts", TestPrivilege::Select),
			Some(AclAccessResult::ConditionalAllowed)
		);
		assert_eq!(
			acls.group("analysts", TestPrivilege::Update),
			Some(AclAccessResult::NotAllowed)
		);
	}

	#[test]
	fn unrecognized_code_is_not_allowed() {
		assert_eq!(
			AclAccessResult::from_raw(RawAccessCode::new(42)),
			AclAccessResult::NotAllowed
		);
	}

	#[test]
	fn code_mapping_is_total() {
		assert_eq!(AclAccessResult::from_raw(RawAccessCode::ALLOWED), AclAccessResult::Allowed);
		assert_eq!(AclAccessResult::from_raw(RawAccessCode::DENIED), AclAccessResult::NotAllowed);
		assert_eq!(
			AclAccessResult::from_raw(RawAccessCode::CONDITIONAL),
			AclAccessResult::ConditionalAllowed
		);
	}

	#[test]
	fn principal_with_only_unknown_privileges_is_kept_empty() {
		let raw = RawResourceAcls {
			user_acls: raw_map(vec![("bob", vec![("bogus", 1)])]),
			group_acls: RawAclMap::new(),
		};
		let acls = aggregate(&raw, &KnownPrivileges::<TestPrivilege>::new());
		assert!(acls.user_permissions["bob"].is_empty());
	}

	#[test]
	fn case_colliding_names_keep_most_restrictive() {
		for _ in 0..32 {
			let raw = RawResourceAcls {
				user_acls: raw_map(vec![("alice", vec![("select", 1), ("SELECT", 0), ("Select", 2)])]),
				group_acls: raw_map(vec![("analysts", vec![("update", 1), ("UPDATE", 2)])]),
			};
			let acls = aggregate(&raw, &KnownPrivileges::<TestPrivilege>::new());

			assert_eq!(acls.user("alice", TestPrivilege::Select), Some(AclAccessResult::NotAllowed));
			assert_eq!(
				acls.group("analysts", TestPrivilege::Update),
				Some(AclAccessResult::ConditionalAllowed)
			);
		}
	}

	#[test]
	fn most_restrictive_is_symmetric() {
		use AclAccessResult::*;
		let all = [Allowed, NotAllowed, ConditionalAllowed];
		for a in all {
			for b in all {
				assert_eq!(a.most_restrictive(b), b.most_restrictive(a));
			}
		}
		assert_eq!(Allowed.most_restrictive(ConditionalAllowed), ConditionalAllowed);
		assert_eq!(ConditionalAllowed.most_restrictive(NotAllowed), NotAllowed);
	}

	proptest! {
		#[test]
		fn aggregation_is_deterministic_and_filtered(
			entries in proptest::collection::hash_map(
				"[a-z]{1,6}",
				proptest::collection::hash_map(
					prop_oneof![Just("select".to_string()), Just("UPDATE".to_string()), "[a-z]{1,6}"],
					-1i32..4,
					0..5,
				),
				0..5,
			)
		) {
			let user_acls: RawAclMap = entries
				.into_iter()
				.map(|(principal, privileges)| {
					let privileges = privileges
						.into_iter()
						.map(|(name, code)| (name, RawAccessCode::new(code)))
						.collect();
					(principal, privileges)
				})
				.collect();
			let raw = RawResourceAcls { user_acls, group_acls: RawAclMap::new() };
			let known = KnownPrivileges::<TestPrivilege>::new();

			let first = aggregate(&raw, &known);
			let second = aggregate(&raw, &known);
			prop_assert_eq!(&first, &second);

			for (principal, perms) in &first.user_permissions {
				let raw_perms = &raw.user_acls[principal];
				for privilege in perms.keys() {
					prop_assert!(raw_perms.keys().any(|name| name.eq_ignore_ascii_case(privilege.name())));
				}
			}
		}
	}
}
