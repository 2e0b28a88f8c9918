// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization audit: event records, per-request aggregation, and sinks.

pub mod aggregator;
pub mod event;
pub mod sink;

pub use aggregator::{AggregatorState, AuditAggregator, AuditKey};
pub use event::AuthzAuditEvent;
pub use sink::{
	sink_from_config, AuditSink, AuditSinkError, ConfiguredAuditSink, NoopAuditSink,
	QueuedAuditSink, TracingAuditSink,
};
