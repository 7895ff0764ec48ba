// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the authorization route layer.

use http::StatusCode;
use thiserror::Error;

/// Status returned when a policy denies the request.
pub const DEFAULT_DENIED_STATUS: StatusCode = StatusCode::UNAUTHORIZED;
/// Status returned when policy code raised an error.
pub const DEFAULT_FAILED_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

pub const DENIED_STATUS_ENV_VAR: &str = "VISA_AUTHZ_DENIED_STATUS";
pub const FAILED_STATUS_ENV_VAR: &str = "VISA_AUTHZ_FAILED_STATUS";
pub const TRUST_FORWARDED_FOR_ENV_VAR: &str = "VISA_AUTHZ_TRUST_FORWARDED_FOR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("{var} must be an HTTP status code, got '{value}'")]
	InvalidStatus { var: &'static str, value: String },

	#[error("{var} must be a 4xx or 5xx status, got {status}")]
	NotAnErrorStatus { var: &'static str, status: StatusCode },

	#[error("{var} must be a boolean, got '{value}'")]
	InvalidBool { var: &'static str, value: String },
}

/// How decisions are turned into responses and where the client address
/// comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeConfig {
	pub denied_status: StatusCode,
	pub failed_status: StatusCode,
	/// Take the client address from the first `X-Forwarded-For` entry.
	/// Only enable behind a proxy that sets the header.
	pub trust_forwarded_for: bool,
}

impl Default for AuthorizeConfig {
	fn default() -> Self {
		Self {
			denied_status: DEFAULT_DENIED_STATUS,
			failed_status: DEFAULT_FAILED_STATUS,
			trust_forwarded_for: false,
		}
	}
}

impl AuthorizeConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads `VISA_AUTHZ_*` variables; unset variables keep their defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|var| std::env::var(var).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let mut config = Self::default();

		if let Some(value) = lookup(DENIED_STATUS_ENV_VAR) {
			config.denied_status = parse_error_status(DENIED_STATUS_ENV_VAR, &value)?;
		}
		if let Some(value) = lookup(FAILED_STATUS_ENV_VAR) {
			config.failed_status = parse_error_status(FAILED_STATUS_ENV_VAR, &value)?;
		}
		if let Some(value) = lookup(TRUST_FORWARDED_FOR_ENV_VAR) {
			config.trust_forwarded_for = parse_bool(TRUST_FORWARDED_FOR_ENV_VAR, &value)?;
		}

		Ok(config)
	}

	pub fn with_denied_status(mut self, status: StatusCode) -> Self {
		self.denied_status = status;
		self
	}

	pub fn with_failed_status(mut self, status: StatusCode) -> Self {
		self.failed_status = status;
		self
	}

	pub fn with_trust_forwarded_for(mut self, enabled: bool) -> Self {
		self.trust_forwarded_for = enabled;
		self
	}
}

fn parse_error_status(var: &'static str, value: &str) -> Result<StatusCode, ConfigError> {
	let status = value
		.trim()
		.parse::<u16>()
		.ok()
		.and_then(|code| StatusCode::from_u16(code).ok())
		.ok_or_else(|| ConfigError::InvalidStatus {
			var,
			value: value.to_string(),
		})?;

	if !(status.is_client_error() || status.is_server_error()) {
		return Err(ConfigError::NotAnErrorStatus { var, status });
	}
	Ok(status)
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidBool {
			var,
			value: value.to_string(),
		}),
	}
}
