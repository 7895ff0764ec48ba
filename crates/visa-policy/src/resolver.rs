// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reference resolution.
//!
//! Turns request-supplied [`Reference`]s into domain [`Object`]s by calling the
//! resolver registered on the resource. Resources without a resolver treat
//! each reference as the object itself.
//!
//! Resolution preserves order and count. A resolver that returns a different
//! number of objects than it was given references is reported as a failure.

use async_trait::async_trait;
use std::future::Future;
use tracing::instrument;

use crate::error::{EvaluationError, ResolveError};
use crate::policy::ResourceDefinition;
use crate::registry::PolicyRegistry;
use crate::types::{BoxError, Object, Reference};

/// Maps an ordered sequence of references to the same number of objects.
#[async_trait]
pub trait ResolveReferences: Send + Sync {
	async fn resolve(&self, references: Vec<Reference>) -> Result<Vec<Object>, BoxError>;
}

/// Values a resolver closure may return.
pub trait ResolverOutput {
	fn into_objects(self) -> Result<Vec<Object>, BoxError>;
}

impl ResolverOutput for Vec<Object> {
	fn into_objects(self) -> Result<Vec<Object>, BoxError> {
		Ok(self)
	}
}

impl<E> ResolverOutput for Result<Vec<Object>, E>
where
	E: Into<BoxError>,
{
	fn into_objects(self) -> Result<Vec<Object>, BoxError> {
		self.map_err(Into::into)
	}
}

/// Synchronous resolver closure.
pub struct FnResolver<F>(F);

impl<F> FnResolver<F> {
	pub fn new(f: F) -> Self {
		Self(f)
	}
}

#[async_trait]
impl<F, R> ResolveReferences for FnResolver<F>
where
	F: Fn(&[Reference]) -> R + Send + Sync,
	R: ResolverOutput,
{
	async fn resolve(&self, references: Vec<Reference>) -> Result<Vec<Object>, BoxError> {
		(self.0)(&references).into_objects()
	}
}

/// Asynchronous resolver closure, e.g. a lookup against storage.
pub struct AsyncFnResolver<F>(F);

impl<F> AsyncFnResolver<F> {
	pub fn new(f: F) -> Self {
		Self(f)
	}
}

#[async_trait]
impl<F, Fut, R> ResolveReferences for AsyncFnResolver<F>
where
	F: Fn(Vec<Reference>) -> Fut + Send + Sync,
	Fut: Future<Output = R> + Send,
	R: ResolverOutput,
{
	async fn resolve(&self, references: Vec<Reference>) -> Result<Vec<Object>, BoxError> {
		(self.0)(references).await.into_objects()
	}
}

/// Resolves references against one resource definition.
pub(crate) async fn resolve_objects<S>(
	resource: &str,
	definition: &ResourceDefinition<S>,
	references: Vec<Reference>,
) -> Result<Vec<Object>, EvaluationError> {
	let Some(resolver) = definition.resolver() else {
		return Ok(references.into_iter().map(Reference::into_object).collect());
	};

	let expected = references.len();
	let objects = resolver
		.resolve(references)
		.await
		.map_err(|source| EvaluationError::Resolution {
			resource: resource.to_string(),
			source,
		})?;

	if objects.len() != expected {
		return Err(EvaluationError::CountMismatch {
			resource: resource.to_string(),
			expected,
			actual: objects.len(),
		});
	}

	Ok(objects)
}

impl<S> PolicyRegistry<S> {
	/// Resolves `references` using the resolver registered for `resource`.
	///
	/// Fails with [`ResolveError::NotConfigured`] if the resource is unknown;
	/// errors raised by the resolver are forwarded unchanged inside
	/// [`ResolveError::Failed`].
	#[instrument(level = "debug", skip(self, references), fields(count = references.len()))]
	pub async fn resolve(
		&self,
		resource: &str,
		references: Vec<Reference>,
	) -> Result<Vec<Object>, ResolveError> {
		let definition = self
			.resource(resource)
			.ok_or_else(|| ResolveError::NotConfigured(resource.to_string()))?;
		Ok(resolve_objects(resource, &definition, references).await?)
	}
}
