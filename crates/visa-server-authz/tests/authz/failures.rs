// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy code that fails: the request ends with 500 and the original error
//! reaches the host.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use visa_policy::{can, EvaluationError, Policy, Reference};

use super::support::{TestApp, TestUser};

#[derive(Debug)]
struct LedgerUnavailable;

impl std::fmt::Display for LedgerUnavailable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ledger unavailable")
	}
}

impl std::error::Error for LedgerUnavailable {}

#[tokio::test]
async fn predicate_error_is_forwarded_to_host() {
	let app = TestApp::new();
	app.registry.set_policy(
		Policy::builder()
			.resource("account", |account| {
				account.operation("open", |_: Option<&TestUser>, _, _| {
					Err::<bool, _>("test error")
				})
			})
			.build(),
	);

	let resp = app
		.send(Method::POST, "/api/account", Some(TestUser::teller()))
		.await;
	assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
		.await
		.unwrap();
	let json: Value = serde_json::from_slice(&body).unwrap();
	assert_eq!(json["error"], "authorization_failed");
	assert!(!json.to_string().contains("test error"));

	let reported = app.reported();
	assert_eq!(reported.len(), 1);
	assert_eq!(reported[0].descriptor, can!(open account));
	assert!(matches!(
		reported[0].error.as_ref(),
		EvaluationError::Predicate { operation, .. } if operation == "open"
	));
	assert_eq!(
		reported[0].error.policy_error().map(ToString::to_string),
		Some("test error".to_string())
	);
}

#[tokio::test]
async fn resolver_error_keeps_its_type() {
	let app = TestApp::new();
	app.registry.set_policy(
		Policy::builder()
			.resource("account", |account| {
				account
					.resolve_with(|_: &[Reference]| Err::<Vec<Value>, _>(LedgerUnavailable))
					.operation("close", |_: Option<&TestUser>, _, _| true)
			})
			.build(),
	);

	let resp = app
		.send(Method::DELETE, "/api/account/1", Some(TestUser::teller()))
		.await;
	assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let reported = app.reported();
	assert_eq!(reported.len(), 1);
	assert_eq!(reported[0].error.resource(), "account");
	let source = reported[0].error.policy_error().unwrap();
	assert!(source.downcast_ref::<LedgerUnavailable>().is_some());
}

#[tokio::test]
async fn short_resolver_output_fails() {
	let app = TestApp::new();
	app.registry.set_policy(
		Policy::builder()
			.resource("account", |account| {
				account
					.resolve_with(|_: &[Reference]| Vec::<Value>::new())
					.operation("close", |_: Option<&TestUser>, _, _| true)
			})
			.build(),
	);

	let resp = app
		.send(Method::DELETE, "/api/account/1", Some(TestUser::teller()))
		.await;
	assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let reported = app.reported();
	assert!(matches!(
		reported[0].error.as_ref(),
		EvaluationError::CountMismatch {
			expected: 1,
			actual: 0,
			..
		}
	));
}

#[tokio::test]
async fn async_predicate_error_is_forwarded() {
	let app = TestApp::new();
	app.registry.set_policy(
		Policy::builder()
			.resource("account", |account| {
				account
					.resolve_with(|refs: &[Reference]| {
						refs.iter().map(|_| json!({ "ownerId": 999 })).collect::<Vec<_>>()
					})
					.async_operation("close", |_: Option<TestUser>, _, _| async {
						Err::<bool, _>(LedgerUnavailable)
					})
			})
			.build(),
	);

	let resp = app
		.send(Method::DELETE, "/api/account/1", Some(TestUser::teller()))
		.await;
	assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(app.reported().len(), 1);
}

#[tokio::test]
async fn denials_are_not_reported() {
	let app = TestApp::new();
	app.registry.set_policy(
		Policy::builder()
			.resource("account", |account| {
				account.operation("open", |_: Option<&TestUser>, _, _| false)
			})
			.build(),
	);

	let resp = app
		.send(Method::POST, "/api/account", Some(TestUser::teller()))
		.await;
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
	assert!(app.reported().is_empty());
}
