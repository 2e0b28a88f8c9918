// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ward authorizer for the metadata catalog.
//!
//! Answers admin, entity, type-definition and relationship access checks,
//! and scrubs search results, by translating them into canonical requests
//! over the catalog resource vocabulary in [`resource`].

pub mod authorizer;
pub mod privilege;
pub mod registry;
pub mod request;
pub mod resource;

pub use authorizer::CatalogAuthorizer;
pub use privilege::{known_privileges, CatalogPrivilege, UnknownPrivilege};
pub use registry::{InMemoryTypeRegistry, TypeRegistry};
pub use request::{
	AdminAccessRequest, EntityAccessRequest, EntityHeader, FullTextHit, RelationshipAccessRequest,
	RelationshipEnd, RequestContext, SearchResult, SearchResultScrubRequest, TypeAccessRequest,
	TypeCategory, TypeDefHeader,
};
