// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures for authorization integration tests.
//!
//! [`TestApp`] plays the host: it owns a policy registry, attaches an already
//! authenticated subject to every request (standing in for the authentication
//! layer), pretends the connection came from a fixed peer address and records
//! every [`AuthorizationFailure`] that reaches its error path.

use axum::{
	body::Body,
	extract::connect_info::MockConnectInfo,
	http::{Method, Request, StatusCode},
	middleware::map_response,
	response::Response,
	routing::{delete, post},
	Extension, Router,
};
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use visa_policy::{can, Evaluator, Policy, PolicyRegistry, Reference};
use visa_server_authz::{Authorize, AuthorizationFailure, ReferenceSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
	pub id: u64,
	pub role: String,
}

impl TestUser {
	pub fn new(id: u64, role: &str) -> Self {
		Self {
			id,
			role: role.to_string(),
		}
	}

	pub fn teller() -> Self {
		Self::new(999, "teller")
	}

	pub fn manager() -> Self {
		Self::new(1, "manager")
	}
}

/// Tellers may open accounts from the branch itself and close accounts they
/// own. Every account resolves to one owned by user 999.
pub fn teller_policy() -> Policy<TestUser> {
	Policy::builder()
		.resource("account", |account| {
			account
				.resolve_with(|refs: &[Reference]| {
					refs.iter().map(|_| json!({ "ownerId": 999 })).collect::<Vec<_>>()
				})
				.operation("open", |user: Option<&TestUser>, _, ctx| {
					user.is_some_and(|u| u.role == "teller") && ctx.is_loopback()
				})
				.operation("close", |user: Option<&TestUser>, account, _| {
					match (user, account) {
						(Some(u), Some(a)) => a["ownerId"] == json!(u.id),
						_ => false,
					}
				})
		})
		.build()
}

/// `::ffff:127.0.0.1`, the loopback address as seen by a dual-stack listener.
pub fn mapped_loopback() -> IpAddr {
	IpAddr::V6(Ipv4Addr::LOCALHOST.to_ipv6_mapped())
}

pub struct TestApp {
	pub registry: PolicyRegistry<TestUser>,
	pub reported: Arc<Mutex<Vec<AuthorizationFailure>>>,
	peer: IpAddr,
}

impl TestApp {
	pub fn new() -> Self {
		Self {
			registry: PolicyRegistry::new(),
			reported: Arc::new(Mutex::new(Vec::new())),
			peer: mapped_loopback(),
		}
	}

	pub fn with_peer(mut self, peer: IpAddr) -> Self {
		self.peer = peer;
		self
	}

	/// Routes wired before any policy is set, the way pipelines are built at
	/// startup:
	///
	/// - `POST /api/account` requires `can open account`
	/// - `DELETE /api/account/{id}` requires `can close account`
	pub fn router(&self, user: Option<TestUser>) -> Router {
		let evaluator = Evaluator::new(self.registry.clone());

		let mut router = Router::new()
			.route("/api/account", post(ok))
			.route_layer(Authorize::<TestUser>::new(
				evaluator.clone(),
				can!(open account),
			))
			.merge(
				Router::new()
					.route("/api/account/{id}", delete(ok))
					.route_layer(
						Authorize::<TestUser>::new(evaluator, can!(close account))
							.with_references(ReferenceSource::path_param("id")),
					),
			);

		if let Some(user) = user {
			router = router.layer(Extension(user));
		}

		let reported = Arc::clone(&self.reported);
		router
			.layer(map_response(move |resp: Response| {
				let reported = Arc::clone(&reported);
				async move {
					if let Some(failure) = resp.extensions().get::<AuthorizationFailure>() {
						reported.lock().unwrap().push(failure.clone());
					}
					resp
				}
			}))
			.layer(MockConnectInfo(SocketAddr::new(self.peer, 3001)))
	}

	pub async fn send(&self, method: Method, path: &str, user: Option<TestUser>) -> Response {
		let req = Request::builder()
			.method(method)
			.uri(path)
			.body(Body::empty())
			.unwrap();
		self.router(user).oneshot(req).await.unwrap()
	}

	pub fn reported(&self) -> Vec<AuthorizationFailure> {
		self.reported.lock().unwrap().clone()
	}
}

async fn ok() -> &'static str {
	"ok"
}

/// One request and the status it must produce.
pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let resp = app
			.send(case.method.clone(), &case.path, case.user.clone())
			.await;
		assert_eq!(
			resp.status(),
			case.expected_status,
			"case '{}' returned {}",
			case.name,
			resp.status()
		);
	}
}
