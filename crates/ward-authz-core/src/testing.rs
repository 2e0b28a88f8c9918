// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test doubles for the engine and audit collaborators.
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream crates' tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::audit::{AuditSink, AuditSinkError, AuthzAuditEvent};
use crate::engine::{
	AccessOutcome, ContextChangeListener, EvaluationResult, PolicyEngine, RawResourceAcls, ServiceDef,
};
use crate::request::AccessRequest;

type DecideFn = dyn Fn(&AccessRequest) -> EvaluationResult + Send + Sync;

/// Engine that answers with a caller-supplied function and records every
/// request it sees.
pub struct ScriptedEngine {
	decide: Box<DecideFn>,
	acls: RawResourceAcls,
	cluster_name: Option<String>,
	service: ServiceDef,
	evaluated: Mutex<Vec<AccessRequest>>,
	acl_requests: Mutex<Vec<AccessRequest>>,
	listeners: Mutex<Vec<Arc<dyn ContextChangeListener>>>,
}

impl ScriptedEngine {
	pub fn new<F>(decide: F) -> Self
	where
		F: Fn(&AccessRequest) -> EvaluationResult + Send + Sync + 'static,
	{
		Self {
			decide: Box::new(decide),
			acls: RawResourceAcls::default(),
			cluster_name: None,
			service: ServiceDef::new("test"),
			evaluated: Mutex::new(Vec::new()),
			acl_requests: Mutex::new(Vec::new()),
			listeners: Mutex::new(Vec::new()),
		}
	}

	pub fn allow_all() -> Self {
		Self::new(|_| EvaluationResult::new(AccessOutcome::Allowed))
	}

	/// Behaves like an engine with no policies at all.
	pub fn deny_all() -> Self {
		Self::new(|_| EvaluationResult::no_match())
	}

	pub fn with_acls(mut self, acls: RawResourceAcls) -> Self {
		self.acls = acls;
		self
	}

	pub fn with_cluster(mut self, cluster_name: impl Into<String>) -> Self {
		self.cluster_name = Some(cluster_name.into());
		self
	}

	pub fn with_service(mut self, name: impl Into<String>) -> Self {
		self.service = ServiceDef::new(name);
		self
	}

	pub fn call_count(&self) -> usize {
		self.evaluated.lock().len()
	}

	/// Requests passed to `evaluate`, in call order.
	pub fn requests(&self) -> Vec<AccessRequest> {
		self.evaluated.lock().clone()
	}

	pub fn acl_requests(&self) -> Vec<AccessRequest> {
		self.acl_requests.lock().clone()
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.lock().len()
	}

	/// Simulates a policy refresh.
	pub fn fire_context_changed(&self) {
		let listeners = self.listeners.lock().clone();
		for listener in listeners {
			listener.context_changed();
		}
	}
}

impl PolicyEngine for ScriptedEngine {
	fn evaluate(&self, request: &AccessRequest) -> EvaluationResult {
		self.evaluated.lock().push(request.clone());
		(self.decide)(request)
	}

	fn resource_acls(&self, request: &AccessRequest) -> RawResourceAcls {
		self.acl_requests.lock().push(request.clone());
		self.acls.clone()
	}

	fn cluster_name(&self) -> Option<String> {
		self.cluster_name.clone()
	}

	fn service_def(&self) -> ServiceDef {
		self.service.clone()
	}

	fn register_context_listener(&self, listener: Arc<dyn ContextChangeListener>) {
		self.listeners.lock().push(listener);
	}
}

/// Sink that keeps every event in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
	events: Mutex<Vec<AuthzAuditEvent>>,
}

impl MemoryAuditSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<AuthzAuditEvent> {
		self.events.lock().clone()
	}
}

impl AuditSink for MemoryAuditSink {
	fn name(&self) -> &str {
		"memory"
	}

	fn log(&self, event: &AuthzAuditEvent) -> Result<(), AuditSinkError> {
		self.events.lock().push(event.clone());
		Ok(())
	}
}
