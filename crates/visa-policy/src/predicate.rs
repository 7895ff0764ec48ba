// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization predicates.
//!
//! A predicate decides one (resource, operation) pair. It sees the subject
//! (absent for anonymous requests), the resolved object (absent when the
//! request carried no reference) and the request context, and answers
//! `Ok(true)`, `Ok(false)` or an error.
//!
//! Most policies are written as closures and registered through
//! [`ResourceDefinition::operation`](crate::ResourceDefinition::operation) or
//! [`ResourceDefinition::async_operation`](crate::ResourceDefinition::async_operation).
//! Implement [`Predicate`] directly when the rule needs its own state.

use futures::future::BoxFuture;
use std::future::Future;
use std::marker::PhantomData;

use crate::types::{BoxError, EvaluationContext, Object};

/// An authorization rule for one operation on one resource.
pub trait Predicate<S>: Send + Sync {
	fn check<'a>(
		&'a self,
		subject: Option<&'a S>,
		object: Option<&'a Object>,
		context: &'a EvaluationContext,
	) -> BoxFuture<'a, Result<bool, BoxError>>;
}

/// Values a predicate closure may return.
///
/// Plain `bool` for rules that cannot fail, `Result<bool, E>` for rules that
/// consult something fallible.
pub trait PredicateOutput {
	fn into_outcome(self) -> Result<bool, BoxError>;
}

impl PredicateOutput for bool {
	fn into_outcome(self) -> Result<bool, BoxError> {
		Ok(self)
	}
}

impl<E> PredicateOutput for Result<bool, E>
where
	E: Into<BoxError>,
{
	fn into_outcome(self) -> Result<bool, BoxError> {
		self.map_err(Into::into)
	}
}

/// Synchronous predicate over borrowed arguments.
pub struct FnPredicate<S, F> {
	f: F,
	_subject: PhantomData<fn(&S)>,
}

impl<S, F> FnPredicate<S, F> {
	pub fn new(f: F) -> Self {
		Self {
			f,
			_subject: PhantomData,
		}
	}
}

impl<S, F, R> Predicate<S> for FnPredicate<S, F>
where
	F: Fn(Option<&S>, Option<&Object>, &EvaluationContext) -> R + Send + Sync,
	R: PredicateOutput,
{
	fn check<'a>(
		&'a self,
		subject: Option<&'a S>,
		object: Option<&'a Object>,
		context: &'a EvaluationContext,
	) -> BoxFuture<'a, Result<bool, BoxError>> {
		let outcome = (self.f)(subject, object, context).into_outcome();
		Box::pin(futures::future::ready(outcome))
	}
}

/// Asynchronous predicate. The closure receives owned copies of its inputs so
/// the returned future can be `'static`.
pub struct AsyncFnPredicate<S, F> {
	f: F,
	_subject: PhantomData<fn(S)>,
}

impl<S, F> AsyncFnPredicate<S, F> {
	pub fn new(f: F) -> Self {
		Self {
			f,
			_subject: PhantomData,
		}
	}
}

impl<S, F, Fut, R> Predicate<S> for AsyncFnPredicate<S, F>
where
	S: Clone,
	F: Fn(Option<S>, Option<Object>, EvaluationContext) -> Fut + Send + Sync,
	Fut: Future<Output = R> + Send + 'static,
	R: PredicateOutput,
{
	fn check<'a>(
		&'a self,
		subject: Option<&'a S>,
		object: Option<&'a Object>,
		context: &'a EvaluationContext,
	) -> BoxFuture<'a, Result<bool, BoxError>> {
		let fut = (self.f)(subject.cloned(), object.cloned(), context.clone());
		Box::pin(async move { fut.await.into_outcome() })
	}
}
