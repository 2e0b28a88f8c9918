// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_QUEUE_CAPACITY: usize = 10000;

fn default_queue_capacity() -> usize {
	DEFAULT_QUEUE_CAPACITY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueOverflowPolicy {
	#[default]
	DropNewest,
	DropOldest,
	Block,
}

impl QueueOverflowPolicy {
	/// Unknown names fall back to the default.
	pub fn from_name(name: &str) -> Self {
		match name.to_lowercase().as_str() {
			"drop_oldest" => QueueOverflowPolicy::DropOldest,
			"block" => QueueOverflowPolicy::Block,
			_ => QueueOverflowPolicy::DropNewest,
		}
	}
}

/// Where aggregated audit events go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
	#[default]
	Tracing,
	Queue,
	None,
}

impl std::str::FromStr for AuditSinkKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"tracing" => Ok(AuditSinkKind::Tracing),
			"queue" => Ok(AuditSinkKind::Queue),
			"none" => Ok(AuditSinkKind::None),
			other => Err(format!("unknown audit sink '{other}'")),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditConfigLayer {
	pub enabled: Option<bool>,
	pub sink: Option<AuditSinkKind>,
	pub queue_capacity: Option<usize>,
	pub queue_overflow_policy: Option<QueueOverflowPolicy>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.sink.is_some() {
			self.sink = other.sink;
		}
		if other.queue_capacity.is_some() {
			self.queue_capacity = other.queue_capacity;
		}
		if other.queue_overflow_policy.is_some() {
			self.queue_overflow_policy = other.queue_overflow_policy;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		AuditConfig {
			enabled: self.enabled.unwrap_or(true),
			sink: self.sink.unwrap_or_default(),
			queue_capacity: self.queue_capacity.unwrap_or_else(default_queue_capacity),
			queue_overflow_policy: self.queue_overflow_policy.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
	pub enabled: bool,
	pub sink: AuditSinkKind,
	pub queue_capacity: usize,
	pub queue_overflow_policy: QueueOverflowPolicy,
}

impl Default for AuditConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			sink: AuditSinkKind::default(),
			queue_capacity: default_queue_capacity(),
			queue_overflow_policy: QueueOverflowPolicy::default(),
		}
	}
}
