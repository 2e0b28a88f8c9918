// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for Ward authorizers.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Consistent environment variable naming (`WARD_AUTHZ_*`)
//! - `tracing` subscriber initialization from the logging section
//!
//! # Usage
//!
//! ```ignore
//! use ward_authz_config::{init_tracing, load_config};
//!
//! let config = load_config()?;
//! init_tracing(&config.logging)?;
//! ```

pub mod error;
pub mod layer;
pub mod logging;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::AuthzConfigLayer;
pub use logging::init_tracing;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved authorizer configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthzConfig {
	pub service: ServiceConfig,
	pub audit: AuditConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARD_AUTHZ_*`)
/// 2. Config file (`/etc/ward/authz.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<AuthzConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<AuthzConfig, ConfigError> {
	load_from_sources(vec![Box::new(EnvSource)])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<AuthzConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merges `sources` in precedence order and resolves the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<AuthzConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = AuthzConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: AuthzConfigLayer) -> Result<AuthzConfig, ConfigError> {
	let service = layer.service.unwrap_or_default().finalize();
	let audit = layer.audit.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&service, &audit)?;

	info!(
		service_type = %service.service_type,
		app_id = %service.app_id,
		cluster_name = ?service.cluster_name,
		audit_enabled = audit.enabled,
		audit_sink = ?audit.sink,
		"Authorizer configuration loaded"
	);

	Ok(AuthzConfig {
		service,
		audit,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(service: &ServiceConfig, audit: &AuditConfig) -> Result<(), ConfigError> {
	if service.service_type.trim().is_empty() {
		return Err(ConfigError::Validation(
			"service_type must not be empty".to_string(),
		));
	}

	if audit.enabled && audit.sink == AuditSinkKind::Queue && audit.queue_capacity == 0 {
		return Err(ConfigError::Validation(
			"audit.queue_capacity must be greater than 0 when the queue sink is used".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_layer_resolves_to_defaults() {
		let config = finalize(AuthzConfigLayer::default()).unwrap();
		assert_eq!(config, AuthzConfig::default());
	}

	#[test]
	fn test_blank_service_type_is_rejected() {
		let layer = AuthzConfigLayer {
			service: Some(ServiceConfigLayer {
				service_type: Some("  ".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		let result = finalize(layer);
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_zero_capacity_queue_is_rejected() {
		let layer = AuthzConfigLayer {
			audit: Some(AuditConfigLayer {
				sink: Some(AuditSinkKind::Queue),
				queue_capacity: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(err.to_string().contains("queue_capacity"));
	}

	#[test]
	fn test_zero_capacity_without_queue_is_fine() {
		let layer = AuthzConfigLayer {
			audit: Some(AuditConfigLayer {
				queue_capacity: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(finalize(layer).is_ok());
	}
}
