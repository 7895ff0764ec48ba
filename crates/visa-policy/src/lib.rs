// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource/operation authorization policies.
//!
//! Applications declare, per resource type, which operations exist and who may
//! perform them, then ask "can this subject perform OPERATION on RESOURCE?".
//!
//! - [`Policy`] / [`ResourceDefinition`]: predicates and optional reference
//!   resolvers keyed by resource and operation name
//! - [`PolicyRegistry`]: shared handle to the active policy (`set_policy`, `reset`)
//! - [`Descriptor`]: an (operation, resource) pair, built with [`subject`] or [`can!`]
//! - [`Evaluator`]: runs a descriptor against the registry and returns a [`Decision`]
//!
//! # Outcomes
//!
//! Every evaluation ends in exactly one of:
//!
//! - [`Decision::Allowed`]: the predicate returned `true`
//! - [`Decision::Denied`]: the predicate returned `false`, or the resource or
//!   operation is not configured (fail-closed)
//! - [`Decision::Failed`]: the predicate or resolver raised an error, carried
//!   unchanged in [`EvaluationError`]
//!
//! # Example
//!
//! ```
//! use visa_policy::{can, EvaluationContext, Evaluator, Policy, PolicyRegistry};
//!
//! #[derive(Clone)]
//! struct User {
//!     role: String,
//! }
//!
//! # block_on(async {
//! let registry = PolicyRegistry::<User>::new();
//! registry.set_policy(
//!     Policy::<User>::builder()
//!         .resource("account", |account| {
//!             account.operation("open", |user, _, _| user.is_some_and(|u| u.role == "teller"))
//!         })
//!         .build(),
//! );
//!
//! let evaluator = Evaluator::new(registry);
//! let teller = User { role: "teller".into() };
//! let decision = evaluator
//!     .evaluate(&can!(open account), Some(&teller), vec![], &EvaluationContext::new())
//!     .await;
//! assert!(decision.is_allowed());
//! # });
//! # fn block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     futures::executor::block_on(f)
//! # }
//! ```

pub mod descriptor;
pub mod engine;
pub mod error;
pub mod policy;
pub mod predicate;
pub mod registry;
pub mod resolver;
pub mod types;

pub use descriptor::{subject, user, CanPath, Descriptor, SubjectPath};
pub use engine::{Decision, DenyReason, Evaluator};
pub use error::{EvaluationError, ResolveError};
pub use policy::{Policy, PolicyBuilder, ResourceDefinition};
pub use predicate::{AsyncFnPredicate, FnPredicate, Predicate, PredicateOutput};
pub use registry::PolicyRegistry;
pub use resolver::{AsyncFnResolver, FnResolver, ResolveReferences, ResolverOutput};
pub use types::{BoxError, EvaluationContext, Object, Reference, FACT_METHOD, FACT_PATH};
