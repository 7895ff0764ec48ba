// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Descriptors: "subject can OPERATION RESOURCE".
//!
//! A [`Descriptor`] names one (operation, resource) pair. It is built once when
//! the pipeline is wired and reused for every request. Nothing is checked
//! against the policy at construction; a descriptor for an unknown resource
//! or operation is valid and simply evaluates to a denial.
//!
//! ```
//! use visa_policy::{can, subject, Descriptor};
//!
//! let fluent = subject().can("open").on("account");
//! let macro_form = can!(open account);
//! let explicit = Descriptor::new("open", "account");
//!
//! assert_eq!(fluent, macro_form);
//! assert_eq!(fluent, explicit);
//! assert_eq!(fluent.to_string(), "can open account");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable (operation, resource) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
	operation: String,
	resource: String,
}

impl Descriptor {
	pub fn new(operation: impl Into<String>, resource: impl Into<String>) -> Self {
		Self {
			operation: operation.into(),
			resource: resource.into(),
		}
	}

	pub fn operation(&self) -> &str {
		&self.operation
	}

	pub fn resource(&self) -> &str {
		&self.resource
	}
}

impl fmt::Display for Descriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "can {} {}", self.operation, self.resource)
	}
}

/// Root of the fluent descriptor path.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectPath;

/// Starts a descriptor for the current request's subject.
pub fn subject() -> SubjectPath {
	SubjectPath
}

/// Alias of [`subject`] for applications whose subjects are users.
pub fn user() -> SubjectPath {
	SubjectPath
}

impl SubjectPath {
	/// Binds the operation name.
	pub fn can(self, operation: impl Into<String>) -> CanPath {
		CanPath {
			operation: operation.into(),
		}
	}
}

/// A descriptor with its operation bound and its resource still open.
#[derive(Debug, Clone)]
pub struct CanPath {
	operation: String,
}

impl CanPath {
	pub fn operation(&self) -> &str {
		&self.operation
	}

	/// Binds the resource name and completes the descriptor.
	pub fn on(self, resource: impl Into<String>) -> Descriptor {
		Descriptor {
			operation: self.operation,
			resource: resource.into(),
		}
	}
}

/// Builds a [`Descriptor`] from bare names or string literals.
///
/// `can!(open account)` is `Descriptor::new("open", "account")`.
#[macro_export]
macro_rules! can {
	($operation:ident $resource:ident) => {
		$crate::Descriptor::new(stringify!($operation), stringify!($resource))
	};
	($operation:expr, $resource:expr) => {
		$crate::Descriptor::new($operation, $resource)
	};
}
