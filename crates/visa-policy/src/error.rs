// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::types::BoxError;

/// Failure raised by policy code during an evaluation.
///
/// The error produced by the application's predicate or resolver is kept
/// intact as the [`source`](std::error::Error::source) and can be recovered
/// with [`EvaluationError::into_source`].
#[derive(Debug, Error)]
pub enum EvaluationError {
	#[error("resolving references for resource '{resource}' failed: {source}")]
	Resolution {
		resource: String,
		#[source]
		source: BoxError,
	},

	#[error("predicate '{operation}' on resource '{resource}' failed: {source}")]
	Predicate {
		resource: String,
		operation: String,
		#[source]
		source: BoxError,
	},

	#[error("resolver for resource '{resource}' returned {actual} objects for {expected} references")]
	CountMismatch {
		resource: String,
		expected: usize,
		actual: usize,
	},
}

impl EvaluationError {
	/// The resource whose policy code failed.
	pub fn resource(&self) -> &str {
		match self {
			Self::Resolution { resource, .. }
			| Self::Predicate { resource, .. }
			| Self::CountMismatch { resource, .. } => resource,
		}
	}

	/// Borrow the error raised by application code, if any.
	pub fn policy_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
		match self {
			Self::Resolution { source, .. } | Self::Predicate { source, .. } => Some(source.as_ref()),
			Self::CountMismatch { .. } => None,
		}
	}

	/// Take back the error raised by application code, if any.
	pub fn into_source(self) -> Option<BoxError> {
		match self {
			Self::Resolution { source, .. } | Self::Predicate { source, .. } => Some(source),
			Self::CountMismatch { .. } => None,
		}
	}
}

/// Error returned by [`PolicyRegistry::resolve`](crate::PolicyRegistry::resolve).
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("resource not configured: {0}")]
	NotConfigured(String),

	#[error(transparent)]
	Failed(#[from] EvaluationError),
}
