// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canonical access requests handed to the policy engine.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::resource::ResourceDescriptor;

/// Wire form of [`AccessType::Any`].
pub const ANY_ACCESS: &str = "_any";

/// The privilege being checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum AccessType {
	/// Matches every privilege. Used for ACL queries.
	Any,
	Named(String),
}

impl AccessType {
	pub fn as_str(&self) -> &str {
		match self {
			AccessType::Any => ANY_ACCESS,
			AccessType::Named(name) => name,
		}
	}

	pub fn is_any(&self) -> bool {
		matches!(self, AccessType::Any)
	}
}

impl fmt::Display for AccessType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<&str> for AccessType {
	fn from(name: &str) -> Self {
		if name == ANY_ACCESS {
			AccessType::Any
		} else {
			AccessType::Named(name.to_string())
		}
	}
}

impl From<String> for AccessType {
	fn from(name: String) -> Self {
		if name == ANY_ACCESS {
			AccessType::Any
		} else {
			AccessType::Named(name)
		}
	}
}

impl From<AccessType> for String {
	fn from(access_type: AccessType) -> Self {
		match access_type {
			AccessType::Any => ANY_ACCESS.to_string(),
			AccessType::Named(name) => name,
		}
	}
}

/// Client-side metadata propagated unchanged from the domain request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientContext {
	pub client_ip: Option<String>,
	pub access_time: Option<DateTime<Utc>>,
}

impl ClientContext {
	pub fn new(client_ip: Option<String>, access_time: Option<DateTime<Utc>>) -> Self {
		Self {
			client_ip,
			access_time,
		}
	}
}

/// Immutable canonical access request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRequest {
	resource: ResourceDescriptor,
	access_type: AccessType,
	action: Option<String>,
	user: Option<String>,
	user_groups: BTreeSet<String>,
	client: ClientContext,
	cluster_name: Option<String>,
}

impl AccessRequest {
	pub fn builder(resource: ResourceDescriptor, access_type: impl Into<AccessType>) -> AccessRequestBuilder {
		AccessRequestBuilder {
			request: AccessRequest {
				resource,
				access_type: access_type.into(),
				action: None,
				user: None,
				user_groups: BTreeSet::new(),
				client: ClientContext::default(),
				cluster_name: None,
			},
		}
	}

	/// A principal-free request for the full ACL matrix of `resource`.
	pub fn for_resource_acls(resource: ResourceDescriptor) -> Self {
		Self::builder(resource, AccessType::Any).build()
	}

	pub fn resource(&self) -> &ResourceDescriptor {
		&self.resource
	}

	pub fn access_type(&self) -> &AccessType {
		&self.access_type
	}

	pub fn action(&self) -> Option<&str> {
		self.action.as_deref()
	}

	pub fn user(&self) -> Option<&str> {
		self.user.as_deref()
	}

	pub fn user_groups(&self) -> &BTreeSet<String> {
		&self.user_groups
	}

	pub fn client(&self) -> &ClientContext {
		&self.client
	}

	pub fn client_ip(&self) -> Option<&str> {
		self.client.client_ip.as_deref()
	}

	pub fn access_time(&self) -> Option<DateTime<Utc>> {
		self.client.access_time
	}

	pub fn cluster_name(&self) -> Option<&str> {
		self.cluster_name.as_deref()
	}

	/// Same request against a different resource.
	pub fn with_resource(&self, resource: ResourceDescriptor) -> Self {
		Self {
			resource,
			..self.clone()
		}
	}
}

#[derive(Debug, Clone)]
pub struct AccessRequestBuilder {
	request: AccessRequest,
}

impl AccessRequestBuilder {
	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.request.action = Some(action.into());
		self
	}

	pub fn user(mut self, user: Option<String>) -> Self {
		self.request.user = user;
		self
	}

	pub fn user_groups(mut self, groups: BTreeSet<String>) -> Self {
		self.request.user_groups = groups;
		self
	}

	pub fn client(mut self, client: ClientContext) -> Self {
		self.request.client = client;
		self
	}

	pub fn cluster_name(mut self, cluster_name: Option<String>) -> Self {
		self.request.cluster_name = cluster_name;
		self
	}

	pub fn build(self) -> AccessRequest {
		self.request
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const VOCAB: &[&str] = &["service"];

	#[test]
	fn any_access_round_trips_through_wire_name() {
		assert_eq!(AccessType::from(ANY_ACCESS), AccessType::Any);
		assert_eq!(AccessType::Any.as_str(), "_any");
		assert_eq!(String::from(AccessType::from("select")), "select");
	}

	#[test]
	fn acl_request_has_no_principal() {
		let resource = ResourceDescriptor::builder(VOCAB).value("service", "*").build();
		let request = AccessRequest::for_resource_acls(resource);

		assert!(request.access_type().is_any());
		assert!(request.user().is_none());
		assert!(request.user_groups().is_empty());
	}

	#[test]
	fn with_resource_keeps_principal_and_client() {
		let resource = ResourceDescriptor::builder(VOCAB).value("service", "*").build();
		let request = AccessRequest::builder(resource, "install")
			.action("install")
			.user(Some("bob".to_string()))
			.client(ClientContext::new(Some("10.0.0.1".to_string()), None))
			.cluster_name(Some("cl1".to_string()))
			.build();

		let other = ResourceDescriptor::builder(VOCAB).value("service", "svc").build();
		let varied = request.with_resource(other);

		assert_eq!(varied.user(), Some("bob"));
		assert_eq!(varied.client_ip(), Some("10.0.0.1"));
		assert_eq!(varied.cluster_name(), Some("cl1"));
		assert_eq!(
			varied.resource().get("service").and_then(|v| v.as_single()),
			Some("svc")
		);
	}
}
