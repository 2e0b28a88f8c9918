// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog authorizer.
//!
//! Translates catalog requests into canonical requests over the catalog
//! resource vocabulary and decides them through the shared engine.
//!
//! Entity checks are the only multi-check requests: the targeted
//! classification first, then every classification the entity carries (or
//! [`NOT_CLASSIFIED`] when it carries none). All must allow, and the first
//! denial ends the check.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, instrument};
use ward_authz_config::AuthzConfig;
use ward_authz_core::audit::{sink_from_config, ConfiguredAuditSink};
use ward_authz_core::{
	AccessRequest, AuditAggregator, AuditSink, AuthzAuditEvent, AuthzError, EngineSlot,
	PolicyDecisionInvoker, PolicyEngine, ResourceDescriptor, ResourceValue, Result,
};

use crate::privilege::CatalogPrivilege;
use crate::registry::TypeRegistry;
use crate::request::{
	AdminAccessRequest, EntityAccessRequest, RelationshipAccessRequest, RequestContext,
	SearchResultScrubRequest, TypeAccessRequest,
};
use crate::resource::{self, ENTITY_CLASSIFICATION, NOT_CLASSIFIED};

pub struct CatalogAuthorizer {
	invoker: PolicyDecisionInvoker,
	registry: Arc<dyn TypeRegistry>,
	audit_sink: Arc<dyn AuditSink>,
	fallback_cluster_name: Option<String>,
}

impl CatalogAuthorizer {
	pub fn new(slot: Arc<EngineSlot>, registry: Arc<dyn TypeRegistry>, audit_sink: Arc<dyn AuditSink>) -> Self {
		Self {
			invoker: PolicyDecisionInvoker::new(slot),
			registry,
			audit_sink,
			fallback_cluster_name: None,
		}
	}

	/// Builds an authorizer on the process-wide engine slot with the audit
	/// sink selected by `config`.
	///
	/// Returns the queue receiver when the queue sink is configured; the
	/// caller owns draining it.
	pub fn from_config(
		config: &AuthzConfig,
		registry: Arc<dyn TypeRegistry>,
	) -> (Self, Option<mpsc::Receiver<AuthzAuditEvent>>) {
		let ConfiguredAuditSink { sink, receiver } = sink_from_config(&config.audit);
		let authorizer = Self::new(EngineSlot::global(), registry, sink)
			.with_cluster_name(config.service.cluster_name.clone());
		(authorizer, receiver)
	}

	/// Cluster name used when the engine does not report one.
	pub fn with_cluster_name(mut self, cluster_name: Option<String>) -> Self {
		self.fallback_cluster_name = cluster_name;
		self
	}

	/// Initializes the engine on first use. Later calls are no-ops.
	pub fn init<F>(&self, factory: F) -> Result<()>
	where
		F: FnOnce() -> Result<Arc<dyn PolicyEngine>>,
	{
		self.invoker.slot().get_or_try_init(factory).map(|_| ())
	}

	pub fn is_initialized(&self) -> bool {
		self.invoker.slot().is_initialized()
	}

	pub fn cluster_name(&self) -> Option<String> {
		self
			.invoker
			.cluster_name()
			.or_else(|| self.fallback_cluster_name.clone())
	}

	#[instrument(
		level = "debug",
		skip(self, request),
		fields(user = ?request.context.user, action = ?request.action)
	)]
	pub fn is_admin_access_allowed(&self, request: &AdminAccessRequest) -> Result<bool> {
		let action = request
			.action
			.as_deref()
			.ok_or_else(|| AuthzError::missing("action"))?;

		let canonical = self.canonical(resource::service_resource(), action, &request.context);
		let allowed = self
			.invoker
			.decide_logged(&canonical, self.audit_sink.as_ref())
			.is_allowed();

		debug!(allowed, "admin access decided");
		Ok(allowed)
	}

	#[instrument(
		level = "debug",
		skip(self, request),
		fields(
			user = ?request.context().user,
			action = ?request.action(),
			entity_type = ?request.entity_type(),
			entity_id = ?request.entity_id(),
		)
	)]
	pub fn is_entity_access_allowed(&self, request: &EntityAccessRequest) -> Result<bool> {
		// Requests naming no entity are decided without an audit trail.
		let mut audit = (!request.is_empty()).then(|| {
			AuditAggregator::new(
				Arc::clone(&self.audit_sink),
				Some(resource::audit_resource_path(request)),
			)
		});

		let allowed = self.entity_verdict(request, audit.as_mut())?;
		debug!(allowed, "entity access decided");
		Ok(allowed)
	}

	#[instrument(
		level = "debug",
		skip(self, request),
		fields(user = ?request.context.user, action = ?request.action)
	)]
	pub fn is_type_access_allowed(&self, request: &TypeAccessRequest) -> Result<bool> {
		let action = request.action.ok_or_else(|| AuthzError::missing("action"))?;

		let resource = resource::type_resource(request.type_def.as_ref());
		let canonical = self.canonical(resource, action.as_str(), &request.context);
		let allowed = self
			.invoker
			.decide_logged(&canonical, self.audit_sink.as_ref())
			.is_allowed();

		debug!(allowed, "type access decided");
		Ok(allowed)
	}

	#[instrument(
		level = "debug",
		skip(self, request),
		fields(
			user = ?request.context.user,
			action = ?request.action,
			relationship_type = ?request.relationship_type,
		)
	)]
	pub fn is_relationship_access_allowed(&self, request: &RelationshipAccessRequest) -> Result<bool> {
		let action = request.action.ok_or_else(|| AuthzError::missing("action"))?;

		let resource = resource::relationship_resource(
			request.relationship_type.as_deref(),
			&request.end1,
			&request.end2,
			self.registry.as_ref(),
		);
		let canonical = self.canonical(resource, action.as_str(), &request.context);
		let allowed = self
			.invoker
			.decide_logged(&canonical, self.audit_sink.as_ref())
			.is_allowed();

		debug!(allowed, "relationship access decided");
		Ok(allowed)
	}

	/// Scrubs every entity header in the result the user may not read.
	///
	/// Returns the number of headers scrubbed. The read checks are not
	/// audited.
	#[instrument(level = "debug", skip(self, request), fields(user = ?request.context.user))]
	pub fn scrub_search_results(&self, request: &mut SearchResultScrubRequest) -> Result<usize> {
		let context = request.context.clone();
		let mut scrubbed = 0;

		for header in request.result.headers_mut() {
			let check =
				EntityAccessRequest::for_entity(CatalogPrivilege::EntityRead, header.clone(), context.clone());
			if !self.entity_verdict(&check, None)? {
				header.scrub();
				scrubbed += 1;
			}
		}

		debug!(scrubbed, "search result scrubbed");
		Ok(scrubbed)
	}

	fn entity_verdict(&self, request: &EntityAccessRequest, audit: Option<&mut AuditAggregator>) -> Result<bool> {
		let action = request.action().ok_or_else(|| AuthzError::missing("action"))?;
		let registry = self.registry.as_ref();

		let base = self.canonical(
			resource::entity_resource(request, registry),
			action.as_str(),
			request.context(),
		);

		let sentinel = request
			.entity_classifications()
			.is_empty()
			.then(|| ResourceValue::from(NOT_CLASSIFIED));

		let sub_checks = request
			.classification()
			.into_iter()
			.chain(request.entity_classifications().iter().map(String::as_str))
			.map(|name| resource::classification_closure(name, registry))
			.chain(sentinel)
			.map(|classification| {
				base.with_resource(base.resource().with_value(ENTITY_CLASSIFICATION, classification))
			});

		Ok(self.invoker.decide_all(sub_checks, audit).is_allowed())
	}

	fn canonical(&self, resource: ResourceDescriptor, action: &str, context: &RequestContext) -> AccessRequest {
		AccessRequest::builder(resource, action)
			.action(action)
			.user(context.user.clone())
			.user_groups(context.user_groups.clone())
			.client(context.client())
			.cluster_name(self.cluster_name())
			.build()
	}
}

impl fmt::Debug for CatalogAuthorizer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CatalogAuthorizer")
			.field("invoker", &self.invoker)
			.field("audit_sink", &self.audit_sink.name())
			.field("fallback_cluster_name", &self.fallback_cluster_name)
			.finish()
	}
}
