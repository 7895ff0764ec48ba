// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::response::Response;
use visa_server_authz::AuthorizationFailure;

/// Logs authorization failures carried by a response. Use with
/// [`axum::middleware::map_response`].
pub async fn report_authorization_failures(resp: Response) -> Response {
	if let Some(failure) = resp.extensions().get::<AuthorizationFailure>() {
		tracing::error!(
			operation = %failure.descriptor.operation(),
			resource = %failure.descriptor.resource(),
			error = %failure.error,
			"authorization failed"
		);
	}
	resp
}
