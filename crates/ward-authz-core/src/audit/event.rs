// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{AccessOutcome, AuditRecord};
use crate::request::AccessRequest;

/// One audited authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzAuditEvent {
	pub id: Uuid,
	pub event_time: DateTime<Utc>,
	/// Deciding policy; `None` when no policy matched.
	pub policy_id: Option<i64>,
	pub policy_version: Option<i64>,
	pub access_type: String,
	pub action: Option<String>,
	pub user: Option<String>,
	pub user_groups: Vec<String>,
	pub resource_path: String,
	pub outcome: AccessOutcome,
	pub client_ip: Option<String>,
	pub cluster_name: Option<String>,
	pub service_name: Option<String>,
	pub reason: Option<String>,
}

impl AuthzAuditEvent {
	/// Builds the event for one engine evaluation of `request`.
	pub fn from_evaluation(
		request: &AccessRequest,
		outcome: AccessOutcome,
		record: &AuditRecord,
		service_name: Option<&str>,
	) -> Self {
		Self {
			id: Uuid::new_v4(),
			event_time: request.access_time().unwrap_or_else(Utc::now),
			policy_id: record.policy_id,
			policy_version: record.policy_version,
			access_type: request.access_type().to_string(),
			action: request.action().map(str::to_string),
			user: request.user().map(str::to_string),
			user_groups: request.user_groups().iter().cloned().collect(),
			resource_path: request.resource().as_path_string(),
			outcome,
			client_ip: request.client_ip().map(str::to_string),
			cluster_name: request.cluster_name().map(str::to_string),
			service_name: service_name.map(str::to_string),
			reason: record.reason.clone(),
		}
	}

	pub fn is_allowed(&self) -> bool {
		self.outcome == AccessOutcome::Allowed
	}
}
