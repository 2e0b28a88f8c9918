// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::sections::{AuditConfigLayer, LoggingConfigLayer, ServiceConfigLayer};

/// Partial configuration as produced by a single source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfigLayer {
	pub service: Option<ServiceConfigLayer>,
	pub audit: Option<AuditConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

impl AuthzConfigLayer {
	/// Overlays `other` on top of `self`; set fields in `other` win.
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.service, other.service, ServiceConfigLayer::merge);
		merge_section(&mut self.audit, other.audit, AuditConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(base), Some(other)) => merge(base, other),
		(None, Some(other)) => *base = Some(other),
		(_, None) => {}
	}
}
