// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ward_authz_core::{KnownPrivileges, Privilege};

/// Operations the catalog asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogPrivilege {
	TypeCreate,
	TypeUpdate,
	TypeDelete,
	EntityRead,
	EntityCreate,
	EntityUpdate,
	EntityDelete,
	EntityReadClassification,
	EntityAddClassification,
	EntityUpdateClassification,
	EntityRemoveClassification,
	AdminExport,
	AdminImport,
	AddRelationship,
	UpdateRelationship,
	RemoveRelationship,
}

impl CatalogPrivilege {
	pub const ALL: &'static [CatalogPrivilege] = &[
		CatalogPrivilege::TypeCreate,
		CatalogPrivilege::TypeUpdate,
		CatalogPrivilege::TypeDelete,
		CatalogPrivilege::EntityRead,
		CatalogPrivilege::EntityCreate,
		CatalogPrivilege::EntityUpdate,
		CatalogPrivilege::EntityDelete,
		CatalogPrivilege::EntityReadClassification,
		CatalogPrivilege::EntityAddClassification,
		CatalogPrivilege::EntityUpdateClassification,
		CatalogPrivilege::EntityRemoveClassification,
		CatalogPrivilege::AdminExport,
		CatalogPrivilege::AdminImport,
		CatalogPrivilege::AddRelationship,
		CatalogPrivilege::UpdateRelationship,
		CatalogPrivilege::RemoveRelationship,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			CatalogPrivilege::TypeCreate => "type-create",
			CatalogPrivilege::TypeUpdate => "type-update",
			CatalogPrivilege::TypeDelete => "type-delete",
			CatalogPrivilege::EntityRead => "entity-read",
			CatalogPrivilege::EntityCreate => "entity-create",
			CatalogPrivilege::EntityUpdate => "entity-update",
			CatalogPrivilege::EntityDelete => "entity-delete",
			CatalogPrivilege::EntityReadClassification => "entity-read-classification",
			CatalogPrivilege::EntityAddClassification => "entity-add-classification",
			CatalogPrivilege::EntityUpdateClassification => "entity-update-classification",
			CatalogPrivilege::EntityRemoveClassification => "entity-remove-classification",
			CatalogPrivilege::AdminExport => "admin-export",
			CatalogPrivilege::AdminImport => "admin-import",
			CatalogPrivilege::AddRelationship => "add-relationship",
			CatalogPrivilege::UpdateRelationship => "update-relationship",
			CatalogPrivilege::RemoveRelationship => "remove-relationship",
		}
	}
}

impl fmt::Display for CatalogPrivilege {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown catalog privilege '{0}'")]
pub struct UnknownPrivilege(pub String);

impl FromStr for CatalogPrivilege {
	type Err = UnknownPrivilege;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		known_privileges()
			.lookup(s)
			.ok_or_else(|| UnknownPrivilege(s.to_string()))
	}
}

impl From<CatalogPrivilege> for String {
	fn from(privilege: CatalogPrivilege) -> Self {
		privilege.as_str().to_string()
	}
}

impl Privilege for CatalogPrivilege {
	fn all() -> &'static [Self] {
		Self::ALL
	}

	fn name(self) -> &'static str {
		self.as_str()
	}
}

static KNOWN_PRIVILEGES: OnceLock<KnownPrivileges<CatalogPrivilege>> = OnceLock::new();

pub fn known_privileges() -> &'static KnownPrivileges<CatalogPrivilege> {
	KNOWN_PRIVILEGES.get_or_init(KnownPrivileges::new)
}
