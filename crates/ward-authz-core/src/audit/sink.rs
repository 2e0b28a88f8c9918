// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit sinks.
//!
//! Transport and persistence live outside this crate. A sink either records
//! the event itself ([`TracingAuditSink`]) or hands it to a bounded queue
//! drained by an external transport ([`QueuedAuditSink`]).

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};
use ward_authz_config::{AuditConfig, AuditSinkKind, QueueOverflowPolicy};

use super::event::AuthzAuditEvent;

#[derive(Error, Debug)]
pub enum AuditSinkError {
	#[error("transient error: {0}")]
	Transient(String),

	#[error("permanent error: {0}")]
	Permanent(String),
}

pub trait AuditSink: Send + Sync {
	fn name(&self) -> &str;

	fn log(&self, event: &AuthzAuditEvent) -> Result<(), AuditSinkError>;
}

/// Discards every event. Used when auditing is disabled.
#[derive(Debug, Clone, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
	fn name(&self) -> &str {
		"noop"
	}

	fn log(&self, _event: &AuthzAuditEvent) -> Result<(), AuditSinkError> {
		Ok(())
	}
}

/// Writes each event as a structured `tracing` record on the `audit` target.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
	fn name(&self) -> &str {
		"tracing"
	}

	fn log(&self, event: &AuthzAuditEvent) -> Result<(), AuditSinkError> {
		info!(
			target: "audit",
			event_id = %event.id,
			policy_id = ?event.policy_id,
			access_type = %event.access_type,
			user = ?event.user,
			resource = %event.resource_path,
			outcome = ?event.outcome,
			client_ip = ?event.client_ip,
			cluster = ?event.cluster_name,
			service = ?event.service_name,
			"authorization audit"
		);
		Ok(())
	}
}

/// Hands events to a bounded queue drained by an external transport.
pub struct QueuedAuditSink {
	tx: mpsc::Sender<AuthzAuditEvent>,
	overflow_policy: QueueOverflowPolicy,
}

impl QueuedAuditSink {
	pub fn new(
		capacity: usize,
		overflow_policy: QueueOverflowPolicy,
	) -> (Self, mpsc::Receiver<AuthzAuditEvent>) {
		let (tx, rx) = mpsc::channel(capacity.max(1));
		(
			Self {
				tx,
				overflow_policy,
			},
			rx,
		)
	}
}

impl AuditSink for QueuedAuditSink {
	fn name(&self) -> &str {
		"queue"
	}

	/// # Overflow Policy Behavior
	///
	/// - `DropNewest` / `DropOldest`: the new event is rejected when the queue is full.
	/// - `Block`: waits for capacity, unless called from inside a tokio runtime where
	///   blocking is not allowed; there it behaves like `DropNewest`.
	fn log(&self, event: &AuthzAuditEvent) -> Result<(), AuditSinkError> {
		let event = event.clone();

		let blocking = self.overflow_policy == QueueOverflowPolicy::Block
			&& tokio::runtime::Handle::try_current().is_err();

		if blocking {
			return self
				.tx
				.blocking_send(event)
				.map_err(|_| AuditSinkError::Permanent("audit queue closed".to_string()));
		}

		self.tx.try_send(event).map_err(|e| match e {
			TrySendError::Full(_) => AuditSinkError::Transient("audit queue is at capacity".to_string()),
			TrySendError::Closed(_) => AuditSinkError::Permanent("audit queue closed".to_string()),
		})
	}
}

/// Sink selected by configuration, plus the queue receiver when the queue
/// sink was chosen.
pub struct ConfiguredAuditSink {
	pub sink: Arc<dyn AuditSink>,
	pub receiver: Option<mpsc::Receiver<AuthzAuditEvent>>,
}

pub fn sink_from_config(config: &AuditConfig) -> ConfiguredAuditSink {
	if !config.enabled {
		return ConfiguredAuditSink {
			sink: Arc::new(NoopAuditSink),
			receiver: None,
		};
	}

	match config.sink {
		AuditSinkKind::Tracing => ConfiguredAuditSink {
			sink: Arc::new(TracingAuditSink),
			receiver: None,
		},
		AuditSinkKind::Queue => {
			let (sink, rx) = QueuedAuditSink::new(config.queue_capacity, config.queue_overflow_policy);
			ConfiguredAuditSink {
				sink: Arc::new(sink),
				receiver: Some(rx),
			}
		}
		AuditSinkKind::None => {
			warn!("audit enabled with no sink configured; events will be discarded");
			ConfiguredAuditSink {
				sink: Arc::new(NoopAuditSink),
				receiver: None,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::AccessOutcome;
	use chrono::Utc;
	use uuid::Uuid;

	fn event() -> AuthzAuditEvent {
		AuthzAuditEvent {
			id: Uuid::new_v4(),
			event_time: Utc::now(),
			policy_id: Some(3),
			policy_version: Some(1),
			access_type: "select".to_string(),
			action: None,
			user: Some("alice".to_string()),
			user_groups: vec!["analysts".to_string()],
			resource_path: "sales/orders".to_string(),
			outcome: AccessOutcome::Allowed,
			client_ip: None,
			cluster_name: Some("cl1".to_string()),
			service_name: Some("hive".to_string()),
			reason: None,
		}
	}

	#[test]
	fn queued_sink_delivers_to_receiver() {
		let (sink, mut rx) = QueuedAuditSink::new(4, QueueOverflowPolicy::DropNewest);
		let sent = event();
		sink.log(&sent).unwrap();

		let received = rx.try_recv().unwrap();
		assert_eq!(received.id, sent.id);
	}

	#[test]
	fn full_queue_rejects_with_transient_error() {
		let (sink, _rx) = QueuedAuditSink::new(1, QueueOverflowPolicy::DropNewest);
		sink.log(&event()).unwrap();

		let result = sink.log(&event());
		assert!(matches!(result, Err(AuditSinkError::Transient(_))));
	}

	#[test]
	fn closed_queue_is_permanent() {
		let (sink, rx) = QueuedAuditSink::new(1, QueueOverflowPolicy::Block);
		drop(rx);

		let result = sink.log(&event());
		assert!(matches!(result, Err(AuditSinkError::Permanent(_))));
	}

	#[tokio::test]
	async fn block_policy_inside_runtime_does_not_block() {
		let (sink, _rx) = QueuedAuditSink::new(1, QueueOverflowPolicy::Block);
		sink.log(&event()).unwrap();

		let result = sink.log(&event());
		assert!(matches!(result, Err(AuditSinkError::Transient(_))));
	}

	#[test]
	fn disabled_config_selects_noop() {
		let config = AuditConfig {
			enabled: false,
			..Default::default()
		};
		let configured = sink_from_config(&config);
		assert_eq!(configured.sink.name(), "noop");
		assert!(configured.receiver.is_none());
	}

	#[test]
	fn queue_config_exposes_receiver() {
		let config = AuditConfig {
			sink: AuditSinkKind::Queue,
			queue_capacity: 8,
			..Default::default()
		};
		let configured = sink_from_config(&config);
		assert_eq!(configured.sink.name(), "queue");
		assert!(configured.receiver.is_some());
	}

	#[test]
	fn tracing_sink_accepts_events() {
		assert!(TracingAuditSink.log(&event()).is_ok());
	}
}
