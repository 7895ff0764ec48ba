// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy structure: resource definitions keyed by resource name.
//!
//! # Example
//!
//! ```
//! use visa_policy::{Policy, Reference};
//! use serde_json::json;
//!
//! #[derive(Clone)]
//! struct Teller {
//!     id: u64,
//!     role: String,
//! }
//!
//! let policy = Policy::<Teller>::builder()
//!     .resource("account", |account| {
//!         account
//!             .resolve_with(|refs: &[Reference]| {
//!                 refs.iter().map(|_| json!({ "ownerId": 999 })).collect::<Vec<_>>()
//!             })
//!             .operation("open", |subject, _, ctx| {
//!                 subject.is_some_and(|s| s.role == "teller") && ctx.is_loopback()
//!             })
//!             .operation("close", |subject, account, _| match (subject, account) {
//!                 (Some(s), Some(a)) => a["ownerId"] == json!(s.id),
//!                 _ => false,
//!             })
//!     })
//!     .build();
//!
//! assert!(policy.get("account").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::predicate::{AsyncFnPredicate, FnPredicate, Predicate, PredicateOutput};
use crate::resolver::{AsyncFnResolver, FnResolver, ResolveReferences, ResolverOutput};
use crate::types::{EvaluationContext, Object, Reference};

/// Everything the engine knows about one resource type.
pub struct ResourceDefinition<S> {
	resolver: Option<Arc<dyn ResolveReferences>>,
	operations: HashMap<String, Arc<dyn Predicate<S>>>,
}

impl<S> ResourceDefinition<S> {
	pub fn new() -> Self {
		Self {
			resolver: None,
			operations: HashMap::new(),
		}
	}

	/// Registers a synchronous predicate for `operation`, replacing any
	/// previous predicate with the same name.
	pub fn operation<F, R>(self, operation: impl Into<String>, predicate: F) -> Self
	where
		S: 'static,
		F: Fn(Option<&S>, Option<&Object>, &EvaluationContext) -> R + Send + Sync + 'static,
		R: PredicateOutput + 'static,
	{
		self.operation_with(operation, FnPredicate::new(predicate))
	}

	/// Registers a predicate that has to wait on something (storage, another
	/// service). It receives owned copies of the subject, object and context.
	pub fn async_operation<F, Fut, R>(self, operation: impl Into<String>, predicate: F) -> Self
	where
		S: Clone + 'static,
		F: Fn(Option<S>, Option<Object>, EvaluationContext) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = R> + Send + 'static,
		R: PredicateOutput + 'static,
	{
		self.operation_with(operation, AsyncFnPredicate::new(predicate))
	}

	/// Registers any [`Predicate`] implementation for `operation`.
	pub fn operation_with(
		mut self,
		operation: impl Into<String>,
		predicate: impl Predicate<S> + 'static,
	) -> Self {
		self.operations.insert(operation.into(), Arc::new(predicate));
		self
	}

	/// Sets a synchronous reference resolver.
	pub fn resolve_with<F, R>(self, resolver: F) -> Self
	where
		F: Fn(&[Reference]) -> R + Send + Sync + 'static,
		R: ResolverOutput + 'static,
	{
		self.with_resolver(FnResolver::new(resolver))
	}

	/// Sets an asynchronous reference resolver.
	pub fn async_resolve_with<F, Fut, R>(self, resolver: F) -> Self
	where
		F: Fn(Vec<Reference>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = R> + Send + 'static,
		R: ResolverOutput + 'static,
	{
		self.with_resolver(AsyncFnResolver::new(resolver))
	}

	/// Sets any [`ResolveReferences`] implementation as the resolver.
	pub fn with_resolver(mut self, resolver: impl ResolveReferences + 'static) -> Self {
		self.resolver = Some(Arc::new(resolver));
		self
	}

	/// Returns the predicate registered for `operation`.
	pub fn predicate(&self, operation: &str) -> Option<&Arc<dyn Predicate<S>>> {
		self.operations.get(operation)
	}

	pub fn resolver(&self) -> Option<&Arc<dyn ResolveReferences>> {
		self.resolver.as_ref()
	}

	pub fn has_resolver(&self) -> bool {
		self.resolver.is_some()
	}

	pub fn operation_names(&self) -> impl Iterator<Item = &str> {
		self.operations.keys().map(String::as_str)
	}
}

impl<S> Default for ResourceDefinition<S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S> Clone for ResourceDefinition<S> {
	fn clone(&self) -> Self {
		Self {
			resolver: self.resolver.clone(),
			operations: self.operations.clone(),
		}
	}
}

impl<S> fmt::Debug for ResourceDefinition<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut operations: Vec<&str> = self.operation_names().collect();
		operations.sort_unstable();
		f.debug_struct("ResourceDefinition")
			.field("has_resolver", &self.has_resolver())
			.field("operations", &operations)
			.finish()
	}
}

/// The full mapping of resource names to definitions.
pub struct Policy<S> {
	resources: HashMap<String, Arc<ResourceDefinition<S>>>,
}

impl<S> Policy<S> {
	/// A policy that knows no resources; every evaluation is denied.
	pub fn empty() -> Self {
		Self {
			resources: HashMap::new(),
		}
	}

	pub fn builder() -> PolicyBuilder<S> {
		PolicyBuilder {
			resources: HashMap::new(),
		}
	}

	pub fn get(&self, resource: &str) -> Option<&Arc<ResourceDefinition<S>>> {
		self.resources.get(resource)
	}

	pub fn contains(&self, resource: &str) -> bool {
		self.resources.contains_key(resource)
	}

	pub fn len(&self) -> usize {
		self.resources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}

	pub fn resource_names(&self) -> impl Iterator<Item = &str> {
		self.resources.keys().map(String::as_str)
	}
}

impl<S> Default for Policy<S> {
	fn default() -> Self {
		Self::empty()
	}
}

impl<S> Clone for Policy<S> {
	fn clone(&self) -> Self {
		Self {
			resources: self.resources.clone(),
		}
	}
}

impl<S> fmt::Debug for Policy<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.resources.iter()).finish()
	}
}

impl<S, N> FromIterator<(N, ResourceDefinition<S>)> for Policy<S>
where
	N: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (N, ResourceDefinition<S>)>>(iter: I) -> Self {
		let mut builder = Policy::builder();
		for (name, definition) in iter {
			builder = builder.define(name, definition);
		}
		builder.build()
	}
}

/// Chainable construction of a [`Policy`].
///
/// Defining the same resource twice keeps only the later definition.
pub struct PolicyBuilder<S> {
	resources: HashMap<String, Arc<ResourceDefinition<S>>>,
}

impl<S> PolicyBuilder<S> {
	/// Defines `resource` by configuring an empty [`ResourceDefinition`].
	pub fn resource(
		self,
		resource: impl Into<String>,
		configure: impl FnOnce(ResourceDefinition<S>) -> ResourceDefinition<S>,
	) -> Self {
		self.define(resource, configure(ResourceDefinition::new()))
	}

	/// Defines `resource` from a ready-made definition.
	pub fn define(mut self, resource: impl Into<String>, definition: ResourceDefinition<S>) -> Self {
		self.resources.insert(resource.into(), Arc::new(definition));
		self
	}

	pub fn build(self) -> Policy<S> {
		Policy {
			resources: self.resources,
		}
	}
}
