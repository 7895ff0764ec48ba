// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route layer that enforces a descriptor on every request.
//!
//! # Flow
//!
//! ```text
//! Request → subject (extensions) → references → context → Evaluator
//!                                                            │
//!                     Allowed ── inner service ◀─────────────┤
//!                     Denied ─── denied_status (401) ◀───────┤
//!                     Failed ─── failed_status (500) ◀───────┘
//!                                + AuthorizationFailure in response extensions
//! ```
//!
//! The subject is whatever value of type `U` the authentication layer stored
//! in the request extensions. If none is present the predicate receives
//! `None`.
//!
//! Failures are not logged here with their error. The original
//! [`EvaluationError`] travels in the response extensions as an
//! [`AuthorizationFailure`] for the host to report.
//!
//! # Example
//!
//! ```ignore
//! use visa_policy::{can, Evaluator};
//! use visa_server_authz::{Authorize, ReferenceSource};
//!
//! Router::new()
//!     .route("/api/account", post(open_account))
//!     .route_layer(Authorize::<User>::new(evaluator.clone(), can!(open account)))
//!     .route("/api/account/{id}", delete(close_account))
//!     .route_layer(
//!         Authorize::<User>::new(evaluator, can!(close account))
//!             .with_references(ReferenceSource::path_param("id")),
//!     );
//! ```

use axum::{
	body::Body,
	http::{Request, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use futures::future::BoxFuture;
use http::request::Parts;
use serde::Serialize;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use visa_policy::{Decision, Descriptor, EvaluationContext, EvaluationError, Evaluator};

use crate::config::AuthorizeConfig;
use crate::extract::{build_context, ContextHook, ReferenceSource};

/// The error behind a failed authorization, attached to the response
/// extensions so the host can report it.
#[derive(Debug, Clone)]
pub struct AuthorizationFailure {
	pub descriptor: Descriptor,
	pub error: Arc<EvaluationError>,
}

/// JSON body of denied and failed responses. Never includes policy details.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
	pub error: String,
	pub message: String,
}

/// Route layer enforcing one [`Descriptor`].
pub struct Authorize<U> {
	evaluator: Evaluator<U>,
	descriptor: Arc<Descriptor>,
	references: ReferenceSource,
	context_hook: Option<ContextHook>,
	config: AuthorizeConfig,
}

impl<U> Authorize<U>
where
	U: Clone + Send + Sync + 'static,
{
	pub fn new(evaluator: Evaluator<U>, descriptor: Descriptor) -> Self {
		Self {
			evaluator,
			descriptor: Arc::new(descriptor),
			references: ReferenceSource::default(),
			context_hook: None,
			config: AuthorizeConfig::default(),
		}
	}

	/// Chooses where references come from (default: all path parameters).
	pub fn with_references(mut self, references: ReferenceSource) -> Self {
		self.references = references;
		self
	}

	/// Adds application facts to the evaluation context.
	pub fn with_context(
		mut self,
		hook: impl Fn(&Parts, &mut EvaluationContext) + Send + Sync + 'static,
	) -> Self {
		self.context_hook = Some(Arc::new(hook));
		self
	}

	pub fn with_config(mut self, config: AuthorizeConfig) -> Self {
		self.config = config;
		self
	}

	pub fn descriptor(&self) -> &Descriptor {
		&self.descriptor
	}

	/// Evaluates the request and either passes it on or returns the response
	/// that ends it.
	async fn decide(&self, req: Request<Body>) -> Result<Request<Body>, Response> {
		let (mut parts, body) = req.into_parts();

		let subject = parts.extensions.get::<U>().cloned();
		let references = self.references.extract(&mut parts).await;
		let context = build_context(
			&mut parts,
			self.config.trust_forwarded_for,
			self.context_hook.as_ref(),
		)
		.await;

		let decision = self
			.evaluator
			.evaluate(&self.descriptor, subject.as_ref(), references, &context)
			.await;

		match decision {
			Decision::Allowed => {
				tracing::debug!(
					operation = %self.descriptor.operation(),
					resource = %self.descriptor.resource(),
					"authorization allowed"
				);
				Ok(Request::from_parts(parts, body))
			}
			Decision::Denied(reason) => {
				tracing::info!(
					operation = %self.descriptor.operation(),
					resource = %self.descriptor.resource(),
					reason = %reason,
					authenticated = subject.is_some(),
					"authorization denied"
				);
				Err(denied_response(self.config.denied_status))
			}
			Decision::Failed(error) => {
				tracing::debug!(
					operation = %self.descriptor.operation(),
					resource = %self.descriptor.resource(),
					"authorization failed; error forwarded to host"
				);
				Err(failed_response(
					self.config.failed_status,
					AuthorizationFailure {
						descriptor: (*self.descriptor).clone(),
						error: Arc::new(error),
					},
				))
			}
		}
	}
}

impl<U> Clone for Authorize<U> {
	fn clone(&self) -> Self {
		Self {
			evaluator: self.evaluator.clone(),
			descriptor: Arc::clone(&self.descriptor),
			references: self.references.clone(),
			context_hook: self.context_hook.clone(),
			config: self.config.clone(),
		}
	}
}

impl<S, U> Layer<S> for Authorize<U> {
	type Service = AuthorizeService<S, U>;

	fn layer(&self, inner: S) -> Self::Service {
		AuthorizeService {
			inner,
			authorize: Arc::new(self.clone()),
		}
	}
}

/// Service wrapper for [`Authorize`].
pub struct AuthorizeService<S, U> {
	inner: S,
	authorize: Arc<Authorize<U>>,
}

impl<S: Clone, U> Clone for AuthorizeService<S, U> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
			authorize: Arc::clone(&self.authorize),
		}
	}
}

impl<S, U> Service<Request<Body>> for AuthorizeService<S, U>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
	U: Clone + Send + Sync + 'static,
{
	type Response = Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Response, S::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let authorize = Arc::clone(&self.authorize);
		let not_ready_inner = self.inner.clone();
		let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

		Box::pin(async move {
			match authorize.decide(req).await {
				Ok(req) => ready_inner.call(req).await,
				Err(resp) => Ok(resp),
			}
		})
	}
}

/// Shorthand for [`Authorize::new`].
pub fn authorize<U>(evaluator: Evaluator<U>, descriptor: Descriptor) -> Authorize<U>
where
	U: Clone + Send + Sync + 'static,
{
	Authorize::new(evaluator, descriptor)
}

pub(crate) fn denied_response(status: StatusCode) -> Response {
	(
		status,
		Json(ErrorBody {
			error: "access_denied".to_string(),
			message: "Access denied".to_string(),
		}),
	)
		.into_response()
}

pub(crate) fn failed_response(status: StatusCode, failure: AuthorizationFailure) -> Response {
	let mut resp = (
		status,
		Json(ErrorBody {
			error: "authorization_failed".to_string(),
			message: "Authorization could not be evaluated".to_string(),
		}),
	)
		.into_response();
	resp.extensions_mut().insert(failure);
	resp
}
