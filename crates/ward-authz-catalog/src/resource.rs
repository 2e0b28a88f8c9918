// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog resource dimensions and descriptor construction.

use std::collections::BTreeSet;

use ward_authz_core::{hierarchy, ResourceDescriptor, ResourceValue};

use crate::registry::TypeRegistry;
use crate::request::{EntityAccessRequest, RelationshipEnd, TypeDefHeader};

pub const SERVICE: &str = "service";
pub const TYPE_CATEGORY: &str = "type-category";
pub const TYPE_NAME: &str = "type-name";
pub const ENTITY_TYPE: &str = "entity-type";
pub const ENTITY_CLASSIFICATION: &str = "classification";
pub const ENTITY_ID: &str = "entity-id";
pub const RELATIONSHIP_TYPE: &str = "relationship-type";
pub const END1_ENTITY_TYPE: &str = "end1-entity-type";
pub const END1_ENTITY_CLASSIFICATION: &str = "end1-entity-classification";
pub const END1_ENTITY_ID: &str = "end1-entity-id";
pub const END2_ENTITY_TYPE: &str = "end2-entity-type";
pub const END2_ENTITY_CLASSIFICATION: &str = "end2-entity-classification";
pub const END2_ENTITY_ID: &str = "end2-entity-id";

/// Dimension order of every catalog resource.
pub const VOCABULARY: &[&str] = &[
	SERVICE,
	TYPE_CATEGORY,
	TYPE_NAME,
	ENTITY_TYPE,
	ENTITY_CLASSIFICATION,
	ENTITY_ID,
	RELATIONSHIP_TYPE,
	END1_ENTITY_TYPE,
	END1_ENTITY_CLASSIFICATION,
	END1_ENTITY_ID,
	END2_ENTITY_TYPE,
	END2_ENTITY_CLASSIFICATION,
	END2_ENTITY_ID,
];

/// Classification value of entities that carry no classification.
pub const NOT_CLASSIFIED: &str = "_NOT_CLASSIFIED";

/// Entity attribute naming the owning user.
pub const OWNER_ATTRIBUTE: &str = "owner";

const ANY_SERVICE: &str = "*";

/// Wildcard service resource used by administrative checks.
pub fn service_resource() -> ResourceDescriptor {
	ResourceDescriptor::builder(VOCABULARY)
		.value(SERVICE, ANY_SERVICE)
		.build()
}

pub fn type_resource(type_def: Option<&TypeDefHeader>) -> ResourceDescriptor {
	ResourceDescriptor::builder(VOCABULARY)
		.optional(TYPE_NAME, type_def.map(|t| t.name.clone()))
		.optional(TYPE_CATEGORY, type_def.map(|t| t.category.to_string()))
		.build()
}

/// Entity resource without a classification dimension; the entity check
/// fills that in per sub-check.
pub fn entity_resource(request: &EntityAccessRequest, registry: &dyn TypeRegistry) -> ResourceDescriptor {
	let entity_types = request
		.entity_type()
		.map(|type_name| hierarchy::expand(type_name, &|name: &str| registry.entity_type_ancestors(name)));

	ResourceDescriptor::builder(VOCABULARY)
		.optional(ENTITY_TYPE, entity_types)
		.optional(ENTITY_ID, request.entity_id().map(str::to_string))
		.owner_user(request.owner_user().map(str::to_string))
		.build()
}

pub fn classification_closure(classification: &str, registry: &dyn TypeRegistry) -> ResourceValue {
	ResourceValue::Set(hierarchy::expand(classification, &|name: &str| {
		registry.classification_ancestors(name)
	}))
}

pub fn relationship_resource(
	relationship_type: Option<&str>,
	end1: &RelationshipEnd,
	end2: &RelationshipEnd,
	registry: &dyn TypeRegistry,
) -> ResourceDescriptor {
	let builder = ResourceDescriptor::builder(VOCABULARY)
		.optional(RELATIONSHIP_TYPE, relationship_type.map(str::to_string));

	let (end1_types, end1_classifications) = end_closures(end1, registry);
	let (end2_types, end2_classifications) = end_closures(end2, registry);

	builder
		.value(END1_ENTITY_TYPE, end1_types)
		.value(END1_ENTITY_CLASSIFICATION, end1_classifications)
		.optional(END1_ENTITY_ID, end1.entity_id.clone())
		.value(END2_ENTITY_TYPE, end2_types)
		.value(END2_ENTITY_CLASSIFICATION, end2_classifications)
		.optional(END2_ENTITY_ID, end2.entity_id.clone())
		.build()
}

fn end_closures(end: &RelationshipEnd, registry: &dyn TypeRegistry) -> (BTreeSet<String>, BTreeSet<String>) {
	let types = end
		.entity_type
		.as_deref()
		.map(|type_name| hierarchy::expand(type_name, &|name: &str| registry.entity_type_ancestors(name)))
		.unwrap_or_default();
	let classifications = hierarchy::expand_all(&end.classifications, &|name: &str| {
		registry.classification_ancestors(name)
	});
	(types, classifications)
}

/// User-facing path of an entity request, as written to audit events.
///
/// Uses the raw entity type and renders the classifications as the
/// secondary list followed by `,<primary>` when a primary is present.
pub fn audit_resource_path(request: &EntityAccessRequest) -> String {
	let secondaries = ResourceValue::Set(request.entity_classifications().clone()).to_string();
	let classifications = match request.classification() {
		Some(primary) => format!("{secondaries},{primary}"),
		None => secondaries,
	};

	ResourceDescriptor::builder(VOCABULARY)
		.optional(ENTITY_TYPE, request.entity_type().map(str::to_string))
		.value(ENTITY_CLASSIFICATION, classifications)
		.optional(ENTITY_ID, request.entity_id().map(str::to_string))
		.build()
		.as_path_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::InMemoryTypeRegistry;
	use crate::request::{EntityHeader, RequestContext, TypeCategory};
	use crate::CatalogPrivilege;

	fn registry() -> InMemoryTypeRegistry {
		InMemoryTypeRegistry::new()
			.with_entity_type("hive_table", ["DataSet"])
			.with_classification("PII", ["SENSITIVE"])
	}

	fn set(values: &[&str]) -> ResourceValue {
		ResourceValue::Set(values.iter().map(|v| v.to_string()).collect())
	}

	#[test]
	fn service_resource_is_wildcard() {
		let resource = service_resource();
		assert_eq!(resource.len(), 1);
		assert_eq!(resource.get(SERVICE), Some(&ResourceValue::from("*")));
	}

	#[test]
	fn type_resource_uses_category_name() {
		let header = TypeDefHeader::new("hive_table", TypeCategory::Entity);
		let resource = type_resource(Some(&header));
		assert_eq!(resource.get(TYPE_NAME), Some(&ResourceValue::from("hive_table")));
		assert_eq!(resource.get(TYPE_CATEGORY), Some(&ResourceValue::from("ENTITY")));

		assert!(type_resource(None).is_empty());
	}

	#[test]
	fn entity_resource_expands_type_and_keeps_owner_aside() {
		let entity = EntityHeader::new("hive_table")
			.with_qualified_name("sales.orders@cl1")
			.with_attribute(OWNER_ATTRIBUTE, "carol");
		let request =
			EntityAccessRequest::for_entity(CatalogPrivilege::EntityRead, entity, RequestContext::default());
		let resource = entity_resource(&request, &registry());

		assert_eq!(resource.get(ENTITY_TYPE), Some(&set(&["DataSet", "hive_table"])));
		assert_eq!(
			resource.get(ENTITY_ID),
			Some(&ResourceValue::from("sales.orders@cl1"))
		);
		assert!(!resource.contains_dimension(ENTITY_CLASSIFICATION));
		assert!(!resource.contains_dimension(OWNER_ATTRIBUTE));
		assert_eq!(resource.owner_user(), Some("carol"));
	}

	#[test]
	fn relationship_resource_sets_every_endpoint_dimension() {
		let end1 = RelationshipEnd::new("hive_table", "t1").with_classification("PII");
		let end2 = RelationshipEnd::new("hive_column", "c1");
		let resource = relationship_resource(Some("hive_table_columns"), &end1, &end2, &registry());

		assert_eq!(resource.len(), 7);
		assert_eq!(resource.get(END1_ENTITY_TYPE), Some(&set(&["DataSet", "hive_table"])));
		assert_eq!(
			resource.get(END1_ENTITY_CLASSIFICATION),
			Some(&set(&["PII", "SENSITIVE"]))
		);
		assert_eq!(resource.get(END2_ENTITY_CLASSIFICATION), Some(&set(&[])));
		assert_eq!(resource.get(END2_ENTITY_ID), Some(&ResourceValue::from("c1")));
	}

	#[test]
	fn audit_path_uses_raw_request_values() {
		let request = EntityAccessRequest::new(CatalogPrivilege::EntityUpdate, RequestContext::default())
			.with_entity_type("hive_table")
			.with_entity_id("guid-1")
			.with_entity_classifications(["SENSITIVE", "PII"])
			.with_classification("FINANCE");

		assert_eq!(
			audit_resource_path(&request),
			"hive_table/[PII, SENSITIVE],FINANCE/guid-1"
		);
	}

	#[test]
	fn audit_path_without_classifications() {
		let request = EntityAccessRequest::new(CatalogPrivilege::EntityRead, RequestContext::default())
			.with_entity_id("guid-2");
		assert_eq!(audit_resource_path(&request), "[]/guid-2");
	}
}
