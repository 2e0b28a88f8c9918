// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy decision invocation.
//!
//! Every canonical request costs exactly one engine call. A missing engine
//! is a configuration fault and always yields [`Verdict::Denied`]; nothing
//! is retried.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::audit::{AuditAggregator, AuditSink, AuthzAuditEvent};
use crate::engine::{AccessOutcome, EngineSlot, RawResourceAcls, ServiceDef};
use crate::request::AccessRequest;

/// Boolean admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
	Allowed,
	Denied,
}

impl Verdict {
	pub fn is_allowed(self) -> bool {
		self == Verdict::Allowed
	}
}

/// Conditional outcomes are not admissions.
impl From<AccessOutcome> for Verdict {
	fn from(outcome: AccessOutcome) -> Self {
		match outcome {
			AccessOutcome::Allowed => Verdict::Allowed,
			AccessOutcome::Denied | AccessOutcome::Conditional => Verdict::Denied,
		}
	}
}

impl From<Verdict> for bool {
	fn from(verdict: Verdict) -> Self {
		verdict.is_allowed()
	}
}

/// Calls the engine held by an [`EngineSlot`] and normalizes its output.
#[derive(Debug, Clone)]
pub struct PolicyDecisionInvoker {
	slot: Arc<EngineSlot>,
}

impl PolicyDecisionInvoker {
	pub fn new(slot: Arc<EngineSlot>) -> Self {
		Self { slot }
	}

	pub fn slot(&self) -> &Arc<EngineSlot> {
		&self.slot
	}

	pub fn cluster_name(&self) -> Option<String> {
		self.slot.get().and_then(|engine| engine.cluster_name())
	}

	pub fn service_def(&self) -> Option<ServiceDef> {
		self.slot.get().map(|engine| engine.service_def())
	}

	/// Single unaudited decision.
	pub fn decide(&self, request: &AccessRequest) -> Verdict {
		self.decide_audited(request, None)
	}

	/// Single decision, reporting the outcome to `audit` when given.
	pub fn decide_audited(&self, request: &AccessRequest, audit: Option<&mut AuditAggregator>) -> Verdict {
		let Some((verdict, event)) = self.evaluate(request, audit.is_some()) else {
			return Verdict::Denied;
		};

		if let Some(audit) = audit {
			audit.record(verdict.is_allowed(), event);
		}

		verdict
	}

	/// Single decision whose audit event, allowed or denied, goes straight
	/// to `sink`.
	pub fn decide_logged(&self, request: &AccessRequest, sink: &dyn AuditSink) -> Verdict {
		let Some((verdict, event)) = self.evaluate(request, true) else {
			return Verdict::Denied;
		};

		if let Some(event) = event {
			if let Err(e) = sink.log(&event) {
				warn!(sink = sink.name(), error = %e, "audit sink rejected event");
			}
		}

		verdict
	}

	/// Logical AND over `requests`, stopping at the first denial.
	///
	/// Requests are produced lazily, so nothing after the first denial is
	/// built or evaluated. An empty sequence is denied.
	pub fn decide_all<I>(&self, requests: I, mut audit: Option<&mut AuditAggregator>) -> Verdict
	where
		I: IntoIterator<Item = AccessRequest>,
	{
		let mut evaluated = 0usize;

		for request in requests {
			evaluated += 1;
			if !self.decide_audited(&request, audit.as_deref_mut()).is_allowed() {
				debug!(evaluated, "sub-check denied, short-circuiting");
				return Verdict::Denied;
			}
		}

		if evaluated == 0 {
			warn!("multi-check request produced no sub-checks, access blocked");
			return Verdict::Denied;
		}

		Verdict::Allowed
	}

	/// `None` when no engine is installed.
	fn evaluate(&self, request: &AccessRequest, with_event: bool) -> Option<(Verdict, Option<AuthzAuditEvent>)> {
		let Some(engine) = self.slot.get() else {
			warn!(
				fault = "configuration",
				resource = %request.resource(),
				access_type = %request.access_type(),
				"policy engine not initialized, access blocked"
			);
			return None;
		};

		let result = engine.evaluate(request);
		let verdict = Verdict::from(result.outcome);

		debug!(
			resource = %request.resource(),
			access_type = %request.access_type(),
			user = ?request.user(),
			outcome = ?result.outcome,
			"policy evaluated"
		);

		let event = match (&result.audit, with_event) {
			(Some(record), true) => {
				let service = engine.service_def();
				Some(AuthzAuditEvent::from_evaluation(
					request,
					result.outcome,
					record,
					Some(&service.name),
				))
			}
			_ => None,
		};

		Some((verdict, event))
	}

	/// Raw ACL matrix for a principal-free request; `None` when the engine
	/// is not initialized.
	pub fn resource_acls(&self, request: &AccessRequest) -> Option<RawResourceAcls> {
		match self.slot.get() {
			Some(engine) => Some(engine.resource_acls(request)),
			None => {
				warn!(
					fault = "configuration",
					resource = %request.resource(),
					"policy engine not initialized, no ACLs computed"
				);
				None
			}
		}
	}
}
