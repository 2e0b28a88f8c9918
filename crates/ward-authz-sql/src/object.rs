// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQL privilege objects and their resource descriptors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ward_authz_core::ResourceDescriptor;

pub const DATABASE: &str = "database";
pub const TABLE: &str = "table";
pub const UDF: &str = "udf";
pub const COLUMN: &str = "column";
pub const URL: &str = "url";
pub const SERVICE: &str = "hiveservice";

/// Dimension order of every SQL resource.
pub const VOCABULARY: &[&str] = &[DATABASE, TABLE, UDF, COLUMN, URL, SERVICE];

/// Object an ACL query is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SqlObject {
	Database {
		database: String,
	},
	Table {
		database: String,
		table: String,
	},
	Column {
		database: String,
		table: String,
		columns: BTreeSet<String>,
	},
	Function {
		database: String,
		function: String,
	},
	Url {
		url: String,
	},
	Service {
		service: String,
	},
}

impl SqlObject {
	pub fn database(database: impl Into<String>) -> Self {
		SqlObject::Database {
			database: database.into(),
		}
	}

	pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
		SqlObject::Table {
			database: database.into(),
			table: table.into(),
		}
	}

	pub fn columns<I, S>(database: impl Into<String>, table: impl Into<String>, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		SqlObject::Column {
			database: database.into(),
			table: table.into(),
			columns: columns.into_iter().map(Into::into).collect(),
		}
	}

	pub fn to_resource(&self) -> ResourceDescriptor {
		let builder = ResourceDescriptor::builder(VOCABULARY);

		match self {
			SqlObject::Database { database } => builder.value(DATABASE, database.as_str()),
			SqlObject::Table { database, table } => builder
				.value(DATABASE, database.as_str())
				.value(TABLE, table.as_str()),
			SqlObject::Column {
				database,
				table,
				columns,
			} => builder
				.value(DATABASE, database.as_str())
				.value(TABLE, table.as_str())
				.value(COLUMN, columns.clone()),
			SqlObject::Function { database, function } => builder
				.value(DATABASE, database.as_str())
				.value(UDF, function.as_str()),
			SqlObject::Url { url } => builder.value(URL, url.as_str()),
			SqlObject::Service { service } => builder.value(SERVICE, service.as_str()),
		}
		.build()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ward_authz_core::ResourceValue;

	#[test]
	fn table_resource() {
		let resource = SqlObject::table("sales", "orders").to_resource();
		assert_eq!(resource.as_path_string(), "sales/orders");
		assert!(!resource.contains_dimension(COLUMN));
	}

	#[test]
	fn column_resource_keeps_every_column() {
		let resource = SqlObject::columns("sales", "orders", ["total", "email"]).to_resource();
		assert_eq!(
			resource.get(COLUMN),
			Some(&ResourceValue::Set(
				["email".to_string(), "total".to_string()].into()
			))
		);
	}

	#[test]
	fn function_uses_udf_dimension() {
		let object = SqlObject::Function {
			database: "sales".to_string(),
			function: "to_upper".to_string(),
		};
		let resource = object.to_resource();
		assert_eq!(resource.to_string(), "{database=sales, udf=to_upper}");
	}

	#[test]
	fn serde_is_tagged() {
		let json = serde_json::to_value(SqlObject::database("sales")).unwrap();
		assert_eq!(json["type"], "database");
		assert_eq!(json["database"], "sales");
	}
}
