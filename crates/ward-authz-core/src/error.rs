// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthzError>;

/// Faults surfaced to callers.
///
/// A denial is never an error. Only malformed requests and engine start-up
/// problems are reported through this type.
#[derive(Error, Debug)]
pub enum AuthzError {
	#[error("malformed request: missing {field}")]
	MissingField { field: &'static str },

	#[error("policy engine initialization failed: {0}")]
	EngineInit(String),

	#[error("policy engine already initialized")]
	AlreadyInitialized,
}

impl AuthzError {
	pub fn missing(field: &'static str) -> Self {
		Self::MissingField { field }
	}
}
