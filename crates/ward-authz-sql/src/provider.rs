// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource ACL provider for the SQL engine.
//!
//! Answers "who may do what on this object" from the engine's ACL matrix,
//! and relays the engine's policy refreshes to registered listeners so
//! cached ACLs can be dropped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, instrument};
use ward_authz_core::{
	aggregate, AccessRequest, ContextChangeListener, EngineSlot, PolicyChangeBus, PolicyChangeListener,
	PolicyChanged, PolicyDecisionInvoker, PolicyEngine, ResourceAcls, Result, Subscription,
};

use crate::object::SqlObject;
use crate::privilege::{known_privileges, SqlPrivilege};

pub struct SqlPolicyProvider {
	invoker: PolicyDecisionInvoker,
	bus: PolicyChangeBus,
	bus_attached: AtomicBool,
}

impl SqlPolicyProvider {
	pub fn new(slot: Arc<EngineSlot>) -> Self {
		Self {
			invoker: PolicyDecisionInvoker::new(slot),
			bus: PolicyChangeBus::new(),
			bus_attached: AtomicBool::new(false),
		}
	}

	/// Provider on the process-wide engine slot.
	pub fn global() -> Self {
		Self::new(EngineSlot::global())
	}

	/// Initializes the engine on first use. Later calls are no-ops.
	///
	/// Listeners registered before the engine came up are attached here.
	pub fn init<F>(&self, factory: F) -> Result<()>
	where
		F: FnOnce() -> Result<Arc<dyn PolicyEngine>>,
	{
		self.invoker.slot().get_or_try_init(factory)?;
		if self.bus.has_audience() {
			self.attach_bus();
		}
		Ok(())
	}

	/// Typed ACLs of `object`.
	///
	/// Empty when the engine is not initialized.
	#[instrument(level = "debug", skip(self), fields(resource = tracing::field::Empty))]
	pub fn resource_acls(&self, object: &SqlObject) -> ResourceAcls<SqlPrivilege> {
		let resource = object.to_resource();
		tracing::Span::current().record("resource", tracing::field::display(&resource));

		let request = AccessRequest::for_resource_acls(resource);
		let Some(raw) = self.invoker.resource_acls(&request) else {
			return ResourceAcls::default();
		};

		let acls = aggregate(&raw, known_privileges());
		debug!(
			users = acls.user_permissions.len(),
			groups = acls.group_permissions.len(),
			"resource ACLs computed"
		);
		acls
	}

	/// Registers `listener` for policy refreshes.
	///
	/// The provider's own bus is attached to the engine once, on the first
	/// registration or [`init`](Self::init) that finds the engine up.
	pub fn register_policy_change_listener(&self, listener: Arc<dyn PolicyChangeListener>) -> Subscription {
		let subscription = self.bus.register(listener);
		self.attach_bus();
		subscription
	}

	/// Receiver for async consumers of policy refreshes.
	pub fn subscribe(&self) -> broadcast::Receiver<PolicyChanged> {
		let receiver = self.bus.subscribe();
		self.attach_bus();
		receiver
	}

	pub fn listener_count(&self) -> usize {
		self.bus.listener_count()
	}

	fn attach_bus(&self) {
		if self.bus_attached.load(Ordering::Acquire) {
			return;
		}

		let Some(engine) = self.invoker.slot().get() else {
			error!(
				fault = "configuration",
				"policy engine not initialized, policy change listener not attached"
			);
			return;
		};

		if self
			.bus_attached
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_ok()
		{
			engine.register_context_listener(Arc::new(self.bus.clone()) as Arc<dyn ContextChangeListener>);
			debug!("policy change bus attached to engine");
		}
	}
}

impl fmt::Debug for SqlPolicyProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SqlPolicyProvider")
			.field("initialized", &self.invoker.slot().is_initialized())
			.field("listeners", &self.bus.listener_count())
			.field("attached", &self.bus_attached.load(Ordering::Acquire))
			.finish()
	}
}
