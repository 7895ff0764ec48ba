// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account routes guarded by the teller policy.
//!
//! The routes are built before any policy is set, so every test also checks
//! that the layer reads the registry per request.

use axum::http::{Method, StatusCode};
use std::net::{IpAddr, Ipv4Addr};
use visa_policy::Policy;

use super::support::{run_authz_cases, teller_policy, AuthzCase, TestApp, TestUser};

#[tokio::test]
async fn teller_on_branch_may_open_account() {
	let app = TestApp::new();
	app.registry.set_policy(teller_policy());

	let resp = app
		.send(Method::POST, "/api/account", Some(TestUser::teller()))
		.await;
	assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn manager_may_not_open_account() {
	let app = TestApp::new();
	app.registry.set_policy(teller_policy());

	let resp = app
		.send(Method::POST, "/api/account", Some(TestUser::manager()))
		.await;
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn teller_off_branch_may_not_open_account() {
	let app = TestApp::new().with_peer(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)));
	app.registry.set_policy(teller_policy());

	let resp = app
		.send(Method::POST, "/api/account", Some(TestUser::teller()))
		.await;
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn owner_may_close_resolved_account() {
	let app = TestApp::new();
	app.registry.set_policy(teller_policy());

	let cases = [
		AuthzCase {
			name: "owner closes",
			method: Method::DELETE,
			path: "/api/account/1".to_string(),
			user: Some(TestUser::teller()),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "other teller closes",
			method: Method::DELETE,
			path: "/api/account/1".to_string(),
			user: Some(TestUser::new(7, "teller")),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "anonymous closes",
			method: Method::DELETE,
			path: "/api/account/1".to_string(),
			user: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
	];
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn anonymous_request_sees_no_subject() {
	let app = TestApp::new();
	app.registry.set_policy(
		Policy::builder()
			.resource("account", |account| {
				account.operation("open", |user: Option<&TestUser>, _, _| user.is_none())
			})
			.build(),
	);

	let anonymous = app.send(Method::POST, "/api/account", None).await;
	assert_eq!(anonymous.status(), StatusCode::OK);

	let signed_in = app
		.send(Method::POST, "/api/account", Some(TestUser::teller()))
		.await;
	assert_eq!(signed_in.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unconfigured_policy_denies_everything() {
	let app = TestApp::new();

	let cases = [
		AuthzCase {
			name: "open before any policy",
			method: Method::POST,
			path: "/api/account".to_string(),
			user: Some(TestUser::teller()),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "close before any policy",
			method: Method::DELETE,
			path: "/api/account/1".to_string(),
			user: Some(TestUser::teller()),
			expected_status: StatusCode::UNAUTHORIZED,
		},
	];
	run_authz_cases(&app, &cases).await;
	assert!(app.reported().is_empty());
}

#[tokio::test]
async fn unknown_operation_denies() {
	let app = TestApp::new();
	app.registry.set_policy(
		Policy::builder()
			.resource("account", |account| {
				account.operation("open", |_: Option<&TestUser>, _, _| true)
			})
			.build(),
	);

	let open = app
		.send(Method::POST, "/api/account", Some(TestUser::teller()))
		.await;
	assert_eq!(open.status(), StatusCode::OK);

	let close = app
		.send(Method::DELETE, "/api/account/1", Some(TestUser::teller()))
		.await;
	assert_eq!(close.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reset_revokes_access() {
	let app = TestApp::new();
	app.registry.set_policy(teller_policy());

	let before = app
		.send(Method::POST, "/api/account", Some(TestUser::teller()))
		.await;
	assert_eq!(before.status(), StatusCode::OK);

	app.registry.reset();

	let after = app
		.send(Method::POST, "/api/account", Some(TestUser::teller()))
		.await;
	assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn replacing_policy_takes_effect_on_next_request() {
	let app = TestApp::new();
	let router = app.router(Some(TestUser::manager()));
	app.registry.set_policy(teller_policy());

	let resp = tower::ServiceExt::oneshot(
		router.clone(),
		axum::http::Request::post("/api/account")
			.body(axum::body::Body::empty())
			.unwrap(),
	)
	.await
	.unwrap();
	assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

	app.registry.set_policy(
		Policy::builder()
			.resource("account", |account| {
				account.operation("open", |user: Option<&TestUser>, _, _| {
					user.is_some_and(|u| u.role == "manager")
				})
			})
			.build(),
	);

	let resp = tower::ServiceExt::oneshot(
		router,
		axum::http::Request::post("/api/account")
			.body(axum::body::Body::empty())
			.unwrap(),
	)
	.await
	.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
}
