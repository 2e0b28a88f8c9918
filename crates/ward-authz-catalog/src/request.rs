// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog access request variants.
//!
//! These carry only the attributes authorization reads; the catalog's own
//! object model stays on the caller's side.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ward_authz_core::ClientContext;

use crate::privilege::CatalogPrivilege;
use crate::resource::OWNER_ATTRIBUTE;

pub const NAME_ATTRIBUTE: &str = "name";
pub const QUALIFIED_NAME_ATTRIBUTE: &str = "qualifiedName";
pub const SCRUBBED_GUID: &str = "-1";

/// Who is asking, and from where.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
	pub user: Option<String>,
	pub user_groups: BTreeSet<String>,
	pub client_ip: Option<String>,
	pub access_time: Option<DateTime<Utc>>,
}

impl RequestContext {
	pub fn for_user(user: impl Into<String>) -> Self {
		Self {
			user: Some(user.into()),
			..Default::default()
		}
	}

	pub fn with_groups<I, S>(mut self, groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.user_groups = groups.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
		self.client_ip = Some(client_ip.into());
		self
	}

	pub fn with_access_time(mut self, access_time: DateTime<Utc>) -> Self {
		self.access_time = Some(access_time);
		self
	}

	pub fn client(&self) -> ClientContext {
		ClientContext::new(self.client_ip.clone(), self.access_time)
	}
}

/// Administrative operation on the catalog service as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccessRequest {
	/// Free-form action name, e.g. `admin-export` or `install`.
	pub action: Option<String>,
	pub context: RequestContext,
}

impl AdminAccessRequest {
	pub fn new(action: impl Into<String>, context: RequestContext) -> Self {
		Self {
			action: Some(action.into()),
			context,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeCategory {
	Primitive,
	ObjectIdType,
	Enum,
	Struct,
	Classification,
	Entity,
	Array,
	Map,
	Relationship,
	BusinessMetadata,
}

impl TypeCategory {
	pub fn as_str(self) -> &'static str {
		match self {
			TypeCategory::Primitive => "PRIMITIVE",
			TypeCategory::ObjectIdType => "OBJECT_ID_TYPE",
			TypeCategory::Enum => "ENUM",
			TypeCategory::Struct => "STRUCT",
			TypeCategory::Classification => "CLASSIFICATION",
			TypeCategory::Entity => "ENTITY",
			TypeCategory::Array => "ARRAY",
			TypeCategory::Map => "MAP",
			TypeCategory::Relationship => "RELATIONSHIP",
			TypeCategory::BusinessMetadata => "BUSINESS_METADATA",
		}
	}
}

impl fmt::Display for TypeCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefHeader {
	pub name: String,
	pub category: TypeCategory,
}

impl TypeDefHeader {
	pub fn new(name: impl Into<String>, category: TypeCategory) -> Self {
		Self {
			name: name.into(),
			category,
		}
	}
}

/// Create, update or delete of a type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAccessRequest {
	pub action: Option<CatalogPrivilege>,
	pub type_def: Option<TypeDefHeader>,
	pub context: RequestContext,
}

impl TypeAccessRequest {
	pub fn new(action: CatalogPrivilege, type_def: TypeDefHeader, context: RequestContext) -> Self {
		Self {
			action: Some(action),
			type_def: Some(type_def),
			context,
		}
	}
}

/// Header of a catalog entity as returned by reads and searches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityHeader {
	pub guid: Option<String>,
	pub type_name: String,
	pub attributes: BTreeMap<String, Value>,
	pub classification_names: Vec<String>,
	pub scrubbed: bool,
}

impl EntityHeader {
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			..Default::default()
		}
	}

	pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
		self.guid = Some(guid.into());
		self
	}

	pub fn with_qualified_name(self, qualified_name: impl Into<String>) -> Self {
		self.with_attribute(QUALIFIED_NAME_ATTRIBUTE, qualified_name.into())
	}

	pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
		self.attributes.insert(name.to_string(), value.into());
		self
	}

	pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
		self.classification_names.push(classification.into());
		self
	}

	fn string_attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).and_then(Value::as_str)
	}

	pub fn qualified_name(&self) -> Option<&str> {
		self.string_attribute(QUALIFIED_NAME_ATTRIBUTE)
	}

	pub fn owner(&self) -> Option<&str> {
		self.string_attribute(OWNER_ATTRIBUTE)
	}

	/// Identifier used for the `entity-id` dimension: the qualified name,
	/// or the guid when there is none.
	pub fn entity_id(&self) -> Option<&str> {
		self.qualified_name().or(self.guid.as_deref())
	}

	/// Strips everything but the entity's names.
	pub fn scrub(&mut self) {
		self.guid = Some(SCRUBBED_GUID.to_string());
		self
			.attributes
			.retain(|name, _| name == NAME_ATTRIBUTE || name == QUALIFIED_NAME_ATTRIBUTE);
		self.classification_names.clear();
		self.scrubbed = true;
	}
}

/// Operation on one entity, or on one classification of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAccessRequest {
	action: Option<CatalogPrivilege>,
	entity: Option<EntityHeader>,
	entity_type: Option<String>,
	entity_id: Option<String>,
	classification: Option<String>,
	entity_classifications: BTreeSet<String>,
	context: RequestContext,
}

impl EntityAccessRequest {
	pub fn new(action: impl Into<Option<CatalogPrivilege>>, context: RequestContext) -> Self {
		Self {
			action: action.into(),
			entity: None,
			entity_type: None,
			entity_id: None,
			classification: None,
			entity_classifications: BTreeSet::new(),
			context,
		}
	}

	/// Request on `entity`, taking type, id and classifications from it.
	pub fn for_entity(
		action: impl Into<Option<CatalogPrivilege>>,
		entity: EntityHeader,
		context: RequestContext,
	) -> Self {
		let mut request = Self::new(action, context);
		request.entity_type = Some(entity.type_name.clone());
		request.entity_id = entity.entity_id().map(str::to_string);
		request.entity_classifications = entity.classification_names.iter().cloned().collect();
		request.entity = Some(entity);
		request
	}

	pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
		self.entity_type = Some(entity_type.into());
		self
	}

	pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
		self.entity_id = Some(entity_id.into());
		self
	}

	/// Classification the operation targets, checked before the entity's
	/// own classifications.
	pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
		self.classification = Some(classification.into());
		self
	}

	pub fn with_entity_classifications<I, S>(mut self, classifications: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.entity_classifications = classifications.into_iter().map(Into::into).collect();
		self
	}

	pub fn action(&self) -> Option<CatalogPrivilege> {
		self.action
	}

	pub fn entity(&self) -> Option<&EntityHeader> {
		self.entity.as_ref()
	}

	pub fn entity_type(&self) -> Option<&str> {
		self.entity_type.as_deref()
	}

	pub fn entity_id(&self) -> Option<&str> {
		self.entity_id.as_deref().filter(|id| !id.is_empty())
	}

	/// The targeted classification; empty names count as absent.
	pub fn classification(&self) -> Option<&str> {
		self.classification.as_deref().filter(|c| !c.is_empty())
	}

	pub fn entity_classifications(&self) -> &BTreeSet<String> {
		&self.entity_classifications
	}

	pub fn owner_user(&self) -> Option<&str> {
		self.entity.as_ref().and_then(EntityHeader::owner)
	}

	pub fn context(&self) -> &RequestContext {
		&self.context
	}

	/// True when the request names no entity at all.
	pub fn is_empty(&self) -> bool {
		self.entity_id().is_none() && self.classification.is_none() && self.entity.is_none()
	}
}

/// One side of a relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEnd {
	pub entity_type: Option<String>,
	pub entity_id: Option<String>,
	pub classifications: BTreeSet<String>,
}

impl RelationshipEnd {
	pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
		Self {
			entity_type: Some(entity_type.into()),
			entity_id: Some(entity_id.into()),
			classifications: BTreeSet::new(),
		}
	}

	pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
		self.classifications.insert(classification.into());
		self
	}
}

impl From<&EntityHeader> for RelationshipEnd {
	fn from(entity: &EntityHeader) -> Self {
		Self {
			entity_type: Some(entity.type_name.clone()),
			entity_id: entity.entity_id().map(str::to_string),
			classifications: entity.classification_names.iter().cloned().collect(),
		}
	}
}

/// Add, update or remove of a relationship between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipAccessRequest {
	pub action: Option<CatalogPrivilege>,
	pub relationship_type: Option<String>,
	pub end1: RelationshipEnd,
	pub end2: RelationshipEnd,
	pub context: RequestContext,
}

impl RelationshipAccessRequest {
	pub fn new(
		action: CatalogPrivilege,
		relationship_type: impl Into<String>,
		end1: RelationshipEnd,
		end2: RelationshipEnd,
		context: RequestContext,
	) -> Self {
		Self {
			action: Some(action),
			relationship_type: Some(relationship_type.into()),
			end1,
			end2,
			context,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullTextHit {
	pub entity: Option<EntityHeader>,
	pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchResult {
	pub entities: Vec<EntityHeader>,
	pub full_text_result: Vec<FullTextHit>,
	pub referred_entities: BTreeMap<String, EntityHeader>,
}

impl SearchResult {
	/// Every entity header in the result, in result order.
	pub fn headers_mut(&mut self) -> impl Iterator<Item = &mut EntityHeader> {
		self
			.entities
			.iter_mut()
			.chain(self.full_text_result.iter_mut().filter_map(|hit| hit.entity.as_mut()))
			.chain(self.referred_entities.values_mut())
	}
}

/// Search result to be filtered for the requesting user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultScrubRequest {
	pub result: SearchResult,
	pub context: RequestContext,
}

impl SearchResultScrubRequest {
	pub fn new(result: SearchResult, context: RequestContext) -> Self {
		Self { result, context }
	}
}
