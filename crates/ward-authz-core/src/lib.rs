// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core of the Ward authorization adapters.
//!
//! Domain authorizers (the metadata catalog, the SQL engine) translate their
//! requests into canonical [`AccessRequest`]s over a [`ResourceDescriptor`],
//! and this crate takes it from there:
//!
//! - [`hierarchy`]: type and classification closure expansion
//! - [`PolicyDecisionInvoker`]: one engine call per request, deny-short-circuit
//!   across multi-check requests, fail-closed when no engine is present
//! - [`acl`]: reshaping the engine's raw ACL matrix into typed, filtered ACLs
//! - [`audit`]: per-request audit deduplication with deny latching
//! - [`PolicyChangeBus`]: fan-out of the engine's "policies changed" signal
//!
//! The policy engine itself is a collaborator behind the [`PolicyEngine`]
//! trait, held in an [`EngineSlot`] that is initialized at most once.

pub mod acl;
pub mod audit;
pub mod decision;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod listener;
pub mod request;
pub mod resource;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use acl::{aggregate, AclAccessResult, KnownPrivileges, PermissionMap, Privilege, ResourceAcls};
pub use audit::{AuditAggregator, AuditSink, AuditSinkError, AuthzAuditEvent};
pub use decision::{PolicyDecisionInvoker, Verdict};
pub use engine::{
	AccessOutcome, AuditRecord, ContextChangeListener, EngineSlot, EvaluationResult, PolicyEngine,
	RawAccessCode, RawAclMap, RawResourceAcls, ServiceDef,
};
pub use error::{AuthzError, Result};
pub use hierarchy::AncestorLookup;
pub use listener::{PolicyChangeBus, PolicyChangeListener, PolicyChanged, Subscription};
pub use request::{AccessRequest, AccessType, ClientContext, ANY_ACCESS};
pub use resource::{ResourceDescriptor, ResourceValue};
