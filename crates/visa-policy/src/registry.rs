// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared, replaceable policy state.
//!
//! A [`PolicyRegistry`] is a handle: clones share the same underlying
//! [`Policy`]. Create one at startup, hand clones to every evaluator and
//! pipeline stage, and configure it with [`PolicyRegistry::set_policy`].
//!
//! # Lifecycle
//!
//! `set_policy` and `reset` are meant for setup and teardown. Replacing the
//! policy while requests are being evaluated is not coordinated with those
//! evaluations: an in-flight evaluation keeps using the resource definition it
//! already looked up. Callers that swap policies under live traffic are
//! responsible for ordering that themselves.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::policy::{Policy, ResourceDefinition};

pub struct PolicyRegistry<S> {
	inner: Arc<RwLock<Policy<S>>>,
}

impl<S> PolicyRegistry<S> {
	/// Creates a registry with an empty policy.
	pub fn new() -> Self {
		Self::with_policy(Policy::empty())
	}

	pub fn with_policy(policy: Policy<S>) -> Self {
		Self {
			inner: Arc::new(RwLock::new(policy)),
		}
	}

	/// Replaces the whole policy. Resources missing from `policy` are no longer
	/// known afterwards.
	pub fn set_policy(&self, policy: Policy<S>) {
		let resources = policy.len();
		*self.inner.write() = policy;
		debug!(resources, "policy replaced");
	}

	/// Clears every resource definition.
	pub fn reset(&self) {
		*self.inner.write() = Policy::empty();
		debug!("policy reset");
	}

	/// Looks up the definition for `resource`.
	///
	/// `None` means the resource is not configured; evaluations against it
	/// are denied.
	pub fn resource(&self, resource: &str) -> Option<Arc<ResourceDefinition<S>>> {
		self.inner.read().get(resource).cloned()
	}

	pub fn is_configured(&self, resource: &str) -> bool {
		self.inner.read().contains(resource)
	}

	/// Names of all configured resources, sorted.
	pub fn resource_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self
			.inner
			.read()
			.resource_names()
			.map(str::to_string)
			.collect();
		names.sort_unstable();
		names
	}

	/// A copy of the current policy.
	pub fn snapshot(&self) -> Policy<S> {
		self.inner.read().clone()
	}
}

impl<S> Default for PolicyRegistry<S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S> Clone for PolicyRegistry<S> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<S> std::fmt::Debug for PolicyRegistry<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PolicyRegistry")
			.field("resources", &self.resource_names())
			.finish()
	}
}
