// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::AuthzConfigLayer;
use crate::sections::{
	AuditConfigLayer, AuditSinkKind, LogFormat, LoggingConfigLayer, QueueOverflowPolicy,
	ServiceConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<AuthzConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<AuthzConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(AuthzConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/ward/authz.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<AuthzConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(AuthzConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: AuthzConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: WARD_AUTHZ_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<AuthzConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_vars(env_var)
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Builds a layer from a variable lookup; `get` returns `None` for unset
/// or empty variables.
pub(crate) fn layer_from_vars<F>(get: F) -> Result<AuthzConfigLayer, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let vars = Vars(get);
	Ok(AuthzConfigLayer {
		service: Some(load_service(&vars)),
		audit: Some(load_audit(&vars)?),
		logging: Some(load_logging(&vars)),
	})
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
	fn string(&self, name: &str) -> Option<String> {
		(self.0)(name)
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self
			.string(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn usize(&self, name: &str) -> Result<Option<usize>, ConfigError> {
		match self.string(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid unsigned integer value '{v}'"),
			}),
			None => Ok(None),
		}
	}
}

fn load_service<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> ServiceConfigLayer {
	ServiceConfigLayer {
		service_type: vars.string("WARD_AUTHZ_SERVICE_TYPE"),
		app_id: vars.string("WARD_AUTHZ_APP_ID"),
		cluster_name: vars.string("WARD_AUTHZ_CLUSTER_NAME"),
	}
}

fn load_audit<F: Fn(&str) -> Option<String>>(
	vars: &Vars<F>,
) -> Result<AuditConfigLayer, ConfigError> {
	let sink = match vars.string("WARD_AUTHZ_AUDIT_SINK") {
		Some(v) => Some(
			v.parse::<AuditSinkKind>()
				.map_err(|message| ConfigError::InvalidValue {
					key: "WARD_AUTHZ_AUDIT_SINK".to_string(),
					message,
				})?,
		),
		None => None,
	};

	Ok(AuditConfigLayer {
		enabled: vars.bool("WARD_AUTHZ_AUDIT_ENABLED"),
		sink,
		queue_capacity: vars.usize("WARD_AUTHZ_AUDIT_QUEUE_CAPACITY")?,
		queue_overflow_policy: vars
			.string("WARD_AUTHZ_AUDIT_QUEUE_OVERFLOW_POLICY")
			.map(|v| QueueOverflowPolicy::from_name(&v)),
	})
}

fn load_logging<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: vars.string("WARD_AUTHZ_LOG_LEVEL"),
		format: vars
			.string("WARD_AUTHZ_LOG_FORMAT")
			.map(|v| LogFormat::from_name(&v)),
	}
}
