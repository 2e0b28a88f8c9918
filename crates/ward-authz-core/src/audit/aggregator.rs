// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request audit aggregation.
//!
//! A logical request that spans several engine calls (an entity checked once
//! per classification) produces at most one audit entry per
//! `(policy-id, access-type)` pair. The first denial clears everything
//! buffered so far and latches: nothing recorded afterwards is kept.
//!
//! The aggregator flushes to its sink when dropped, so every exit path of
//! the logical request emits the buffer exactly once.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::event::AuthzAuditEvent;
use super::sink::AuditSink;

/// Buffer key: deciding policy and access type.
pub type AuditKey = (Option<i64>, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
	Accumulating,
	DenyLatched,
}

pub struct AuditAggregator {
	sink: Arc<dyn AuditSink>,
	resource_path: Option<String>,
	events: BTreeMap<AuditKey, AuthzAuditEvent>,
	state: AggregatorState,
	flushed: bool,
}

impl AuditAggregator {
	/// `resource_path` overrides the path of every recorded event with the
	/// user-facing form of the original request.
	pub fn new(sink: Arc<dyn AuditSink>, resource_path: Option<String>) -> Self {
		Self {
			sink,
			resource_path,
			events: BTreeMap::new(),
			state: AggregatorState::Accumulating,
			flushed: false,
		}
	}

	pub fn state(&self) -> AggregatorState {
		self.state
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	pub fn resource_path(&self) -> Option<&str> {
		self.resource_path.as_deref()
	}

	/// Buffered events in key order.
	pub fn events(&self) -> impl Iterator<Item = &AuthzAuditEvent> {
		self.events.values()
	}

	/// Records the outcome of one sub-check.
	///
	/// `event` is the audit entry for the sub-check, if the engine asked for
	/// one. A denial latches the aggregator whether or not it was audited.
	pub fn record(&mut self, allowed: bool, event: Option<AuthzAuditEvent>) {
		if self.state == AggregatorState::DenyLatched {
			return;
		}

		if !allowed {
			debug!(
				discarded = self.events.len(),
				"denial recorded, discarding buffered audit events"
			);
			self.state = AggregatorState::DenyLatched;
			self.events.clear();
			return;
		}

		if let Some(mut event) = event {
			if let Some(path) = &self.resource_path {
				event.resource_path = path.clone();
			}
			let key = (event.policy_id, event.access_type.clone());
			self.events.insert(key, event);
		}
	}

	/// Emits every buffered event to the sink.
	///
	/// Sink failures are logged and swallowed. Returns the number of events
	/// the sink accepted. Only the first call emits anything.
	pub fn flush(&mut self) -> usize {
		if self.flushed {
			return 0;
		}
		self.flushed = true;

		let mut accepted = 0;
		for (_, event) in std::mem::take(&mut self.events) {
			match self.sink.log(&event) {
				Ok(()) => accepted += 1,
				Err(e) => {
					warn!(sink = self.sink.name(), error = %e, "audit sink rejected event");
				}
			}
		}
		accepted
	}
}

impl Drop for AuditAggregator {
	fn drop(&mut self) {
		self.flush();
	}
}

impl std::fmt::Debug for AuditAggregator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuditAggregator")
			.field("sink", &self.sink.name())
			.field("resource_path", &self.resource_path)
			.field("buffered", &self.events.len())
			.field("state", &self.state)
			.field("flushed", &self.flushed)
			.finish()
	}
}
