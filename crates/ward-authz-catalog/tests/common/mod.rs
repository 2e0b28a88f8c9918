// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::sync::Arc;

use ward_authz_catalog::resource::ENTITY_CLASSIFICATION;
use ward_authz_catalog::{CatalogAuthorizer, InMemoryTypeRegistry};
use ward_authz_core::testing::{MemoryAuditSink, ScriptedEngine};
use ward_authz_core::{AccessOutcome, AccessRequest, AuditRecord, EngineSlot, EvaluationResult};

pub struct Harness {
	pub authorizer: CatalogAuthorizer,
	pub engine: Arc<ScriptedEngine>,
	pub sink: Arc<MemoryAuditSink>,
}

pub fn registry() -> InMemoryTypeRegistry {
	InMemoryTypeRegistry::new()
		.with_entity_type("hive_table", ["DataSet"])
		.with_entity_type("hive_column", ["DataSet"])
		.with_entity_type("DataSet", ["Referenceable"])
		.with_classification("PII_EMAIL", ["PII"])
		.with_classification("PII", ["SENSITIVE"])
}

pub fn harness(engine: ScriptedEngine) -> Harness {
	let engine = Arc::new(engine);
	let slot = Arc::new(EngineSlot::new());
	slot.install(engine.clone()).unwrap();

	let sink = Arc::new(MemoryAuditSink::new());
	let authorizer = CatalogAuthorizer::new(slot, Arc::new(registry()), sink.clone());

	Harness {
		authorizer,
		engine,
		sink,
	}
}

/// Engine that denies any request whose classification dimension mentions
/// one of `denied`, and audits every decision under policy 100 (allow) or
/// 200 (deny).
pub fn classification_engine(denied: &'static [&'static str]) -> ScriptedEngine {
	ScriptedEngine::new(move |request: &AccessRequest| {
		let is_denied = request
			.resource()
			.get(ENTITY_CLASSIFICATION)
			.map(|value| denied.iter().any(|name| value.contains(name)))
			.unwrap_or(false);

		let (outcome, policy_id) = if is_denied {
			(AccessOutcome::Denied, 200)
		} else {
			(AccessOutcome::Allowed, 100)
		};

		EvaluationResult::new(outcome).with_audit(AuditRecord {
			policy_id: Some(policy_id),
			..Default::default()
		})
	})
	.with_service("atlas")
}

pub fn classification_of(request: &AccessRequest) -> String {
	request
		.resource()
		.get(ENTITY_CLASSIFICATION)
		.map(|value| value.to_string())
		.unwrap_or_default()
}
