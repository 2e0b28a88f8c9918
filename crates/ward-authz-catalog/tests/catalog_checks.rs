// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod common;

use std::sync::Arc;

use common::{harness, registry};
use ward_authz_catalog::resource::{
	END1_ENTITY_CLASSIFICATION, END1_ENTITY_TYPE, END2_ENTITY_ID, RELATIONSHIP_TYPE, SERVICE,
	TYPE_CATEGORY, TYPE_NAME,
};
use ward_authz_catalog::{
	AdminAccessRequest, CatalogAuthorizer, CatalogPrivilege, EntityHeader, FullTextHit,
	RelationshipAccessRequest, RelationshipEnd, RequestContext, SearchResult,
	SearchResultScrubRequest, TypeAccessRequest, TypeCategory, TypeDefHeader,
};
use ward_authz_core::testing::{MemoryAuditSink, ScriptedEngine};
use ward_authz_core::{
	AccessOutcome, AccessRequest, AuditRecord, EngineSlot, EvaluationResult, ResourceValue,
};

#[test]
fn admin_install_on_wildcard_service() {
	let h = harness(ScriptedEngine::new(|request: &AccessRequest| {
		match request.resource().get(SERVICE) {
			Some(service) if service.contains("*") => EvaluationResult::new(AccessOutcome::Allowed),
			_ => EvaluationResult::no_match(),
		}
	}));

	let request = AdminAccessRequest::new("install", RequestContext::for_user("bob"));
	assert!(h.authorizer.is_admin_access_allowed(&request).unwrap());

	let calls = h.engine.requests();
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].resource().to_string(), "{service=*}");
	assert_eq!(calls[0].action(), Some("install"));
	assert_eq!(calls[0].access_type().as_str(), "install");
	assert_eq!(calls[0].user(), Some("bob"));
}

#[test]
fn no_matching_policy_denies() {
	let h = harness(ScriptedEngine::deny_all());

	let admin = AdminAccessRequest::new("admin-export", RequestContext::for_user("bob"));
	assert!(!h.authorizer.is_admin_access_allowed(&admin).unwrap());

	let type_check = TypeAccessRequest::new(
		CatalogPrivilege::TypeDelete,
		TypeDefHeader::new("hive_table", TypeCategory::Entity),
		RequestContext::for_user("bob"),
	);
	assert!(!h.authorizer.is_type_access_allowed(&type_check).unwrap());
}

#[test]
fn uninitialized_engine_denies_everything() {
	let authorizer = CatalogAuthorizer::new(
		Arc::new(EngineSlot::new()),
		Arc::new(registry()),
		Arc::new(MemoryAuditSink::new()),
	);

	let admin = AdminAccessRequest::new("admin-import", RequestContext::for_user("root"));
	assert!(!authorizer.is_admin_access_allowed(&admin).unwrap());

	let relationship = RelationshipAccessRequest::new(
		CatalogPrivilege::AddRelationship,
		"hive_table_columns",
		RelationshipEnd::new("hive_table", "t1"),
		RelationshipEnd::new("hive_column", "c1"),
		RequestContext::for_user("root"),
	);
	assert!(!authorizer.is_relationship_access_allowed(&relationship).unwrap());
}

#[test]
fn type_check_carries_name_and_category() {
	let h = harness(ScriptedEngine::allow_all());

	let request = TypeAccessRequest::new(
		CatalogPrivilege::TypeCreate,
		TypeDefHeader::new("PII", TypeCategory::Classification),
		RequestContext::for_user("alice"),
	);
	assert!(h.authorizer.is_type_access_allowed(&request).unwrap());

	let resource = h.engine.requests()[0].resource().clone();
	assert_eq!(resource.get(TYPE_NAME), Some(&ResourceValue::from("PII")));
	assert_eq!(
		resource.get(TYPE_CATEGORY),
		Some(&ResourceValue::from("CLASSIFICATION"))
	);
	assert_eq!(resource.len(), 2);
}

#[test]
fn relationship_check_expands_both_ends() {
	let h = harness(ScriptedEngine::allow_all());

	let request = RelationshipAccessRequest::new(
		CatalogPrivilege::AddRelationship,
		"hive_table_columns",
		RelationshipEnd::new("hive_table", "t1").with_classification("PII_EMAIL"),
		RelationshipEnd::new("hive_column", "c1"),
		RequestContext::for_user("alice"),
	);
	assert!(h.authorizer.is_relationship_access_allowed(&request).unwrap());
	assert_eq!(h.engine.call_count(), 1);

	let resource = h.engine.requests()[0].resource().clone();
	assert_eq!(
		resource.get(RELATIONSHIP_TYPE),
		Some(&ResourceValue::from("hive_table_columns"))
	);
	assert!(resource.get(END1_ENTITY_TYPE).unwrap().contains("Referenceable"));
	let end1_classifications = resource.get(END1_ENTITY_CLASSIFICATION).unwrap();
	for name in ["PII_EMAIL", "PII", "SENSITIVE"] {
		assert!(end1_classifications.contains(name));
	}
	assert_eq!(resource.get(END2_ENTITY_ID), Some(&ResourceValue::from("c1")));
}

#[test]
fn single_checks_audit_denials() {
	let h = harness(
		ScriptedEngine::new(|_: &AccessRequest| {
			EvaluationResult::new(AccessOutcome::Denied).with_audit(AuditRecord {
				policy_id: Some(9),
				..Default::default()
			})
		})
		.with_service("atlas"),
	);

	let request = AdminAccessRequest::new("admin-export", RequestContext::for_user("mallory"));
	assert!(!h.authorizer.is_admin_access_allowed(&request).unwrap());

	let events = h.sink.events();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].outcome, AccessOutcome::Denied);
	assert_eq!(events[0].resource_path, "*");
}

#[test]
fn search_results_are_scrubbed_for_denied_entities() {
	let h = harness(ScriptedEngine::new(|request: &AccessRequest| {
		match request.resource().get("classification") {
			Some(value) if value.contains("PII") => EvaluationResult::no_match(),
			_ => EvaluationResult::new(AccessOutcome::Allowed),
		}
	}));

	let visible = EntityHeader::new("hive_table")
		.with_guid("guid-1")
		.with_qualified_name("sales.orders@cl1");
	let secret = EntityHeader::new("hive_column")
		.with_guid("guid-2")
		.with_qualified_name("sales.orders.email@cl1")
		.with_attribute("name", "email")
		.with_attribute("description", "customer email")
		.with_classification("PII_EMAIL");

	let mut request = SearchResultScrubRequest::new(
		SearchResult {
			entities: vec![visible.clone()],
			full_text_result: vec![
				FullTextHit {
					entity: Some(secret.clone()),
					score: 0.9,
				},
				FullTextHit {
					entity: None,
					score: 0.1,
				},
			],
			referred_entities: [("guid-2".to_string(), secret)].into(),
		},
		RequestContext::for_user("alice"),
	);

	assert_eq!(h.authorizer.scrub_search_results(&mut request).unwrap(), 2);

	assert_eq!(request.result.entities[0], visible);

	let hit = request.result.full_text_result[0].entity.as_ref().unwrap();
	assert!(hit.scrubbed);
	assert_eq!(hit.guid.as_deref(), Some("-1"));
	assert!(hit.classification_names.is_empty());
	assert!(hit.attributes.contains_key("name"));
	assert!(!hit.attributes.contains_key("description"));

	assert!(request.result.referred_entities["guid-2"].scrubbed);
	assert!(h.sink.events().is_empty());
}
