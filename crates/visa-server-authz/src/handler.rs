// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Handler-level authorization.
//!
//! For checks that need data only the handler has (a body field, a value
//! loaded mid-request), call [`check_authorization`] and return its error.
//! Pass the same [`AuthorizeConfig`] the route layers use so both produce the
//! same statuses.
//!
//! ```ignore
//! async fn transfer(
//!     State(state): State<AppState>,
//!     Extension(user): Extension<User>,
//!     Json(req): Json<TransferRequest>,
//! ) -> Result<impl IntoResponse, AuthorizationError> {
//!     check_authorization(
//!         &state.evaluator,
//!         &state.authz_config,
//!         &can!(debit account),
//!         Some(&user),
//!         vec![Reference::new(req.from_account)],
//!         &EvaluationContext::new(),
//!     )
//!     .await?;
//!     // ...
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use visa_policy::{Decision, Descriptor, EvaluationContext, Evaluator, Reference};

use crate::config::AuthorizeConfig;
use crate::layer::{denied_response, failed_response, AuthorizationFailure};

/// A denied or failed handler-level check, with the status it renders as.
#[derive(Debug, Clone, Error)]
pub enum AuthorizationError {
	#[error("access denied: {descriptor}")]
	Denied {
		descriptor: Descriptor,
		status: StatusCode,
	},

	#[error("authorization failed: {}", .failure.error)]
	Failed {
		failure: AuthorizationFailure,
		status: StatusCode,
	},
}

impl AuthorizationError {
	pub fn is_denied(&self) -> bool {
		matches!(self, Self::Denied { .. })
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Self::Denied { status, .. } | Self::Failed { status, .. } => *status,
		}
	}
}

impl IntoResponse for AuthorizationError {
	fn into_response(self) -> Response {
		match self {
			Self::Denied { status, .. } => denied_response(status),
			Self::Failed { failure, status } => failed_response(status, failure),
		}
	}
}

/// Returns `Ok(())` if the evaluation allows, otherwise an error that
/// renders as the same response a route layer with `config` would produce.
#[instrument(skip_all, fields(descriptor = %descriptor))]
pub async fn check_authorization<U>(
	evaluator: &Evaluator<U>,
	config: &AuthorizeConfig,
	descriptor: &Descriptor,
	subject: Option<&U>,
	references: Vec<Reference>,
	context: &EvaluationContext,
) -> Result<(), AuthorizationError>
where
	U: Send + Sync,
{
	match evaluator
		.evaluate(descriptor, subject, references, context)
		.await
	{
		Decision::Allowed => Ok(()),
		Decision::Denied(reason) => {
			tracing::info!(reason = %reason, "handler authorization denied");
			Err(AuthorizationError::Denied {
				descriptor: descriptor.clone(),
				status: config.denied_status,
			})
		}
		Decision::Failed(error) => Err(AuthorizationError::Failed {
			failure: AuthorizationFailure {
				descriptor: descriptor.clone(),
				error: Arc::new(error),
			},
			status: config.failed_status,
		}),
	}
}

/// Inline form of [`check_authorization`]:
/// `authorize!(evaluator, config, user, open account)` or with references and
/// context `authorize!(evaluator, config, user, close account, refs, ctx)`.
#[macro_export]
macro_rules! authorize {
	($evaluator:expr, $config:expr, $subject:expr, $operation:ident $resource:ident) => {
		$crate::check_authorization(
			&$evaluator,
			&$config,
			&$crate::visa_policy::can!($operation $resource),
			$subject,
			::std::vec::Vec::new(),
			&$crate::visa_policy::EvaluationContext::new(),
		)
	};
	($evaluator:expr, $config:expr, $subject:expr, $operation:ident $resource:ident, $references:expr, $context:expr) => {
		$crate::check_authorization(
			&$evaluator,
			&$config,
			&$crate::visa_policy::can!($operation $resource),
			$subject,
			$references,
			$context,
		)
	};
}
