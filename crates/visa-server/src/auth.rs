// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Header-based authentication stub.
//!
//! Requests carrying `x-demo-user-id` and `x-demo-role` are treated as signed
//! in as that user. Anything else is anonymous. Never expose this outside a
//! demo: the client chooses who it is.

use axum::{
	extract::Request,
	http::HeaderMap,
	middleware::Next,
	response::Response,
};

pub const X_DEMO_USER_ID: &str = "x-demo-user-id";
pub const X_DEMO_ROLE: &str = "x-demo-role";

/// The authenticated subject handed to policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoUser {
	pub id: u64,
	pub role: String,
}

impl DemoUser {
	pub fn new(id: u64, role: impl Into<String>) -> Self {
		Self {
			id,
			role: role.into(),
		}
	}

	pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
		let id = headers.get(X_DEMO_USER_ID)?.to_str().ok()?.trim().parse().ok()?;
		let role = headers.get(X_DEMO_ROLE)?.to_str().ok()?.trim();
		if role.is_empty() {
			return None;
		}
		Some(Self::new(id, role))
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.role == role
	}
}

/// Middleware attaching the [`DemoUser`] to the request extensions.
pub async fn demo_auth(mut req: Request, next: Next) -> Response {
	if let Some(user) = DemoUser::from_headers(req.headers()) {
		tracing::debug!(user_id = user.id, role = %user.role, "demo user attached");
		req.extensions_mut().insert(user);
	}
	next.run(req).await
}
