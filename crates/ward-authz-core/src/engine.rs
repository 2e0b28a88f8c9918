// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The policy evaluation engine collaborator.
//!
//! The engine stores, matches and ranks policies; this crate only calls it.
//! Raw numeric result codes cross this boundary as [`RawAccessCode`] and are
//! converted to [`AccessOutcome`] before anything else looks at them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AuthzError, Result};
use crate::request::AccessRequest;

/// Tri-state outcome of a single policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
	Allowed,
	Denied,
	/// Allowed only if conditions the engine cannot evaluate here hold.
	Conditional,
}

/// Result code as reported by the engine in ACL maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAccessCode(i32);

impl RawAccessCode {
	pub const DENIED: RawAccessCode = RawAccessCode(0);
	pub const ALLOWED: RawAccessCode = RawAccessCode(1);
	pub const CONDITIONAL: RawAccessCode = RawAccessCode(2);

	pub fn new(code: i32) -> Self {
		Self(code)
	}

	pub fn value(self) -> i32 {
		self.0
	}

	/// Returns `None` for codes outside the engine contract.
	pub fn outcome(self) -> Option<AccessOutcome> {
		match self {
			Self::ALLOWED => Some(AccessOutcome::Allowed),
			Self::DENIED => Some(AccessOutcome::Denied),
			Self::CONDITIONAL => Some(AccessOutcome::Conditional),
			_ => None,
		}
	}
}

impl From<i32> for RawAccessCode {
	fn from(code: i32) -> Self {
		Self(code)
	}
}

impl fmt::Display for RawAccessCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Audit details attached by the engine to an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
	/// Id of the deciding policy; `None` when no policy matched.
	pub policy_id: Option<i64>,
	pub policy_version: Option<i64>,
	pub reason: Option<String>,
}

/// Output of [`PolicyEngine::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
	pub outcome: AccessOutcome,
	/// Present when the matching policy requires auditing.
	pub audit: Option<AuditRecord>,
}

impl EvaluationResult {
	pub fn new(outcome: AccessOutcome) -> Self {
		Self {
			outcome,
			audit: None,
		}
	}

	/// No policy matched; the request is denied and nothing is audited.
	pub fn no_match() -> Self {
		Self::new(AccessOutcome::Denied)
	}

	pub fn with_audit(mut self, audit: AuditRecord) -> Self {
		self.audit = Some(audit);
		self
	}

	pub fn is_allowed(&self) -> bool {
		self.outcome == AccessOutcome::Allowed
	}
}

/// principal -> privilege name -> raw result code.
pub type RawAclMap = HashMap<String, HashMap<String, RawAccessCode>>;

/// Full ACL matrix of one resource as computed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResourceAcls {
	pub user_acls: RawAclMap,
	pub group_acls: RawAclMap,
}

/// Opaque service definition descriptor, used only to stamp audit records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDef {
	pub name: String,
	pub id: Option<i64>,
}

impl ServiceDef {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			id: None,
		}
	}
}

/// Receives "policies changed" notifications from the engine.
///
/// Called with no payload, at arbitrary times, on an arbitrary thread.
pub trait ContextChangeListener: Send + Sync {
	fn context_changed(&self);
}

/// The policy evaluation engine.
///
/// Evaluation is a fast, in-memory computation over loaded policy state;
/// callers never retry and apply no timeout.
pub trait PolicyEngine: Send + Sync {
	fn evaluate(&self, request: &AccessRequest) -> EvaluationResult;

	fn resource_acls(&self, request: &AccessRequest) -> RawResourceAcls;

	fn cluster_name(&self) -> Option<String>;

	fn service_def(&self) -> ServiceDef;

	fn register_context_listener(&self, listener: Arc<dyn ContextChangeListener>);
}

/// Process-wide engine handle, initialized at most once.
///
/// Readers never lock. Concurrent first use serializes on an init lock and
/// re-checks before constructing, so the factory runs at most once.
#[derive(Default)]
pub struct EngineSlot {
	engine: OnceLock<Arc<dyn PolicyEngine>>,
	init_lock: Mutex<()>,
}

static GLOBAL_SLOT: OnceLock<Arc<EngineSlot>> = OnceLock::new();

impl EngineSlot {
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide slot shared by every authorizer that does not bring
	/// its own.
	pub fn global() -> Arc<EngineSlot> {
		Arc::clone(GLOBAL_SLOT.get_or_init(|| Arc::new(EngineSlot::new())))
	}

	pub fn get(&self) -> Option<&Arc<dyn PolicyEngine>> {
		self.engine.get()
	}

	pub fn is_initialized(&self) -> bool {
		self.engine.get().is_some()
	}

	/// Returns the engine, constructing it with `factory` on first use.
	pub fn get_or_try_init<F>(&self, factory: F) -> Result<&Arc<dyn PolicyEngine>>
	where
		F: FnOnce() -> Result<Arc<dyn PolicyEngine>>,
	{
		if let Some(engine) = self.engine.get() {
			return Ok(engine);
		}

		let _guard = self.init_lock.lock();

		if let Some(engine) = self.engine.get() {
			debug!("policy engine initialized concurrently");
			return Ok(engine);
		}

		let engine = factory()?;
		info!(service = %engine.service_def().name, "policy engine initialized");
		Ok(self.engine.get_or_init(|| engine))
	}

	/// Publishes an already constructed engine.
	pub fn install(&self, engine: Arc<dyn PolicyEngine>) -> Result<()> {
		let _guard = self.init_lock.lock();
		self
			.engine
			.set(engine)
			.map_err(|_| AuthzError::AlreadyInitialized)
	}
}

impl fmt::Debug for EngineSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EngineSlot")
			.field("initialized", &self.is_initialized())
			.finish()
	}
}
