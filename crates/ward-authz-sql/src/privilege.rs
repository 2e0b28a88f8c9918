// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ward_authz_core::{KnownPrivileges, Privilege};

/// Privileges the SQL engine understands in resource ACLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlPrivilege {
	Select,
	Update,
	Create,
	Drop,
	Alter,
	Index,
	Lock,
	Read,
	Write,
}

impl SqlPrivilege {
	pub const ALL: &'static [SqlPrivilege] = &[
		SqlPrivilege::Select,
		SqlPrivilege::Update,
		SqlPrivilege::Create,
		SqlPrivilege::Drop,
		SqlPrivilege::Alter,
		SqlPrivilege::Index,
		SqlPrivilege::Lock,
		SqlPrivilege::Read,
		SqlPrivilege::Write,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			SqlPrivilege::Select => "select",
			SqlPrivilege::Update => "update",
			SqlPrivilege::Create => "create",
			SqlPrivilege::Drop => "drop",
			SqlPrivilege::Alter => "alter",
			SqlPrivilege::Index => "index",
			SqlPrivilege::Lock => "lock",
			SqlPrivilege::Read => "read",
			SqlPrivilege::Write => "write",
		}
	}
}

impl fmt::Display for SqlPrivilege {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown SQL privilege '{0}'")]
pub struct UnknownSqlPrivilege(pub String);

impl FromStr for SqlPrivilege {
	type Err = UnknownSqlPrivilege;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		known_privileges()
			.lookup(s)
			.ok_or_else(|| UnknownSqlPrivilege(s.to_string()))
	}
}

impl Privilege for SqlPrivilege {
	fn all() -> &'static [Self] {
		Self::ALL
	}

	fn name(self) -> &'static str {
		self.as_str()
	}
}

static KNOWN_PRIVILEGES: OnceLock<KnownPrivileges<SqlPrivilege>> = OnceLock::new();

/// Process-wide lookup table, built on first use.
pub fn known_privileges() -> &'static KnownPrivileges<SqlPrivilege> {
	KNOWN_PRIVILEGES.get_or_init(KnownPrivileges::new)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_privilege_is_known() {
		assert_eq!(known_privileges().len(), SqlPrivilege::ALL.len());
		for privilege in SqlPrivilege::ALL {
			assert_eq!(privilege.as_str().parse::<SqlPrivilege>(), Ok(*privilege));
		}
	}

	#[test]
	fn parsing_ignores_case() {
		assert_eq!("SELECT".parse::<SqlPrivilege>(), Ok(SqlPrivilege::Select));
		assert!("all".parse::<SqlPrivilege>().is_err());
	}

	#[test]
	fn serializes_as_upper_case() {
		assert_eq!(serde_json::to_string(&SqlPrivilege::Drop).unwrap(), r#""DROP""#);
	}
}
