// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy evaluation.
//!
//! [`Evaluator::evaluate`] walks one descriptor through a fixed sequence:
//!
//! ```text
//! resource lookup ──missing──▶ Denied
//!       │
//! operation lookup ─missing──▶ Denied
//!       │
//! resolve references ─error──▶ Failed
//!       │
//! invoke predicate ──true────▶ Allowed
//!                  ──false───▶ Denied
//!                  ──error───▶ Failed
//! ```
//!
//! Missing configuration is a denial, never an error: a typo in a policy must
//! not open access or surface as a server failure. Errors are reserved for
//! policy code that raised.
//!
//! Steps run in order and each may await. Nothing is retried or cached.

use tracing::{debug, instrument};

use crate::descriptor::Descriptor;
use crate::error::EvaluationError;
use crate::registry::PolicyRegistry;
use crate::resolver::resolve_objects;
use crate::types::{EvaluationContext, Reference};

/// Why an evaluation ended in a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
	ResourceNotConfigured,
	OperationNotConfigured,
	PredicateRejected,
}

impl DenyReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			DenyReason::ResourceNotConfigured => "resource_not_configured",
			DenyReason::OperationNotConfigured => "operation_not_configured",
			DenyReason::PredicateRejected => "predicate_rejected",
		}
	}
}

impl std::fmt::Display for DenyReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Terminal outcome of one evaluation.
#[derive(Debug)]
#[must_use]
pub enum Decision {
	Allowed,
	Denied(DenyReason),
	Failed(EvaluationError),
}

impl Decision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allowed)
	}

	pub fn is_denied(&self) -> bool {
		matches!(self, Decision::Denied(_))
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, Decision::Failed(_))
	}

	/// `Ok(true)` for allowed, `Ok(false)` for denied, `Err` for failed.
	pub fn into_result(self) -> Result<bool, EvaluationError> {
		match self {
			Decision::Allowed => Ok(true),
			Decision::Denied(_) => Ok(false),
			Decision::Failed(err) => Err(err),
		}
	}
}

/// Evaluates descriptors against a shared [`PolicyRegistry`].
///
/// Holds no per-request state; clone it freely and call it concurrently.
pub struct Evaluator<S> {
	registry: PolicyRegistry<S>,
}

impl<S> Evaluator<S>
where
	S: Send + Sync,
{
	pub fn new(registry: PolicyRegistry<S>) -> Self {
		Self { registry }
	}

	pub fn registry(&self) -> &PolicyRegistry<S> {
		&self.registry
	}

	/// Decides whether `subject` may perform the descriptor's operation on the
	/// object named by `references`.
	///
	/// With no references the predicate sees no object. With several, only
	/// the first resolved object is passed to the predicate; batch
	/// authorization is not supported.
	#[instrument(
		level = "debug",
		skip_all,
		fields(
			resource = %descriptor.resource(),
			operation = %descriptor.operation(),
			references = references.len(),
		)
	)]
	pub async fn evaluate(
		&self,
		descriptor: &Descriptor,
		subject: Option<&S>,
		references: Vec<Reference>,
		context: &EvaluationContext,
	) -> Decision {
		let Some(definition) = self.registry.resource(descriptor.resource()) else {
			debug!("denied: resource not configured");
			return Decision::Denied(DenyReason::ResourceNotConfigured);
		};

		let Some(predicate) = definition.predicate(descriptor.operation()).cloned() else {
			debug!("denied: operation not configured");
			return Decision::Denied(DenyReason::OperationNotConfigured);
		};

		let objects = match resolve_objects(descriptor.resource(), &definition, references).await {
			Ok(objects) => objects,
			Err(err) => {
				debug!("failed: reference resolution raised");
				return Decision::Failed(err);
			}
		};

		match predicate.check(subject, objects.first(), context).await {
			Ok(true) => {
				debug!("allowed");
				Decision::Allowed
			}
			Ok(false) => {
				debug!("denied: predicate rejected");
				Decision::Denied(DenyReason::PredicateRejected)
			}
			Err(source) => {
				debug!("failed: predicate raised");
				Decision::Failed(EvaluationError::Predicate {
					resource: descriptor.resource().to_string(),
					operation: descriptor.operation().to_string(),
					source,
				})
			}
		}
	}

	/// Shorthand for [`evaluate`](Self::evaluate) followed by
	/// [`Decision::into_result`].
	pub async fn check(
		&self,
		descriptor: &Descriptor,
		subject: Option<&S>,
		references: Vec<Reference>,
		context: &EvaluationContext,
	) -> Result<bool, EvaluationError> {
		self
			.evaluate(descriptor, subject, references, context)
			.await
			.into_result()
	}
}

impl<S> Clone for Evaluator<S> {
	fn clone(&self) -> Self {
		Self {
			registry: self.registry.clone(),
		}
	}
}

impl<S> std::fmt::Debug for Evaluator<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Evaluator")
			.field("registry", &self.registry)
			.finish()
	}
}
