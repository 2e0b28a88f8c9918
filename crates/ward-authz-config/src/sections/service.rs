// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity of the authorizer towards the policy engine.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVICE_TYPE: &str = "atlas";
pub const DEFAULT_APP_ID: &str = "ward-authz";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfigLayer {
	pub service_type: Option<String>,
	pub app_id: Option<String>,
	pub cluster_name: Option<String>,
}

impl ServiceConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.service_type.is_some() {
			self.service_type = other.service_type;
		}
		if other.app_id.is_some() {
			self.app_id = other.app_id;
		}
		if other.cluster_name.is_some() {
			self.cluster_name = other.cluster_name;
		}
	}

	pub fn finalize(self) -> ServiceConfig {
		ServiceConfig {
			service_type: self
				.service_type
				.unwrap_or_else(|| DEFAULT_SERVICE_TYPE.to_string()),
			app_id: self.app_id.unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
			cluster_name: self.cluster_name,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
	/// Service definition the engine loads policies for.
	pub service_type: String,
	pub app_id: String,
	/// Used when the engine does not report a cluster name.
	pub cluster_name: Option<String>,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		ServiceConfigLayer::default().finalize()
	}
}
