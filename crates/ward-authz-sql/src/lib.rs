// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ward resource ACL provider for the SQL engine.

pub mod object;
pub mod privilege;
pub mod provider;

pub use object::SqlObject;
pub use privilege::{known_privileges, SqlPrivilege, UnknownSqlPrivilege};
pub use provider::SqlPolicyProvider;
