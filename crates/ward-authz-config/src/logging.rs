// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Global `tracing` subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ConfigError;
use crate::sections::{LogFormat, LoggingConfig};

/// Builds the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the process-wide subscriber.
///
/// Fails with [`ConfigError::LoggingInit`] if a global subscriber is
/// already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
	let registry = tracing_subscriber::registry().with(env_filter(config));

	let result = match config.format {
		LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
		LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
	};

	result.map_err(|e| ConfigError::LoggingInit(e.to_string()))
}
