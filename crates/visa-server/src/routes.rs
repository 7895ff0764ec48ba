// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP routes and their required descriptors.
//!
//! | Route | Descriptor |
//! |-------|------------|
//! | `POST /api/account` | `can open account` |
//! | `GET /api/account/{id}` | `can read account` |
//! | `DELETE /api/account/{id}` | `can close account` |
//! | `GET /health` | none |

use axum::{
	extract::{Path, State},
	http::StatusCode,
	middleware::{from_fn, map_response},
	routing::{delete, get, post},
	Extension, Json, Router,
};
use tower_http::trace::TraceLayer;
use visa_policy::{can, Descriptor, Evaluator, PolicyRegistry};
use visa_server_authz::{Authorize, AuthorizeConfig, ReferenceSource};

use crate::accounts::{Account, AccountStore};
use crate::auth::{demo_auth, DemoUser};
use crate::report::report_authorization_failures;

#[derive(Clone)]
pub struct AppState {
	pub accounts: AccountStore,
}

pub fn create_router(
	registry: PolicyRegistry<DemoUser>,
	accounts: AccountStore,
	config: AuthorizeConfig,
) -> Router {
	let evaluator = Evaluator::new(registry);
	let guard = |descriptor: Descriptor| {
		Authorize::new(evaluator.clone(), descriptor).with_config(config.clone())
	};

	Router::new()
		.route(
			"/api/account",
			post(open_account)
				.route_layer(guard(can!(open account)).with_references(ReferenceSource::None)),
		)
		.route(
			"/api/account/{id}",
			get(read_account)
				.route_layer(guard(can!(read account)))
				.merge(delete(close_account).route_layer(guard(can!(close account)))),
		)
		.layer(map_response(report_authorization_failures))
		.layer(from_fn(demo_auth))
		.route("/health", get(health))
		.layer(TraceLayer::new_for_http())
		.with_state(AppState { accounts })
}

async fn health() -> &'static str {
	"ok"
}

async fn open_account(
	State(state): State<AppState>,
	user: Option<Extension<DemoUser>>,
) -> Result<(StatusCode, Json<Account>), StatusCode> {
	let Some(Extension(user)) = user else {
		return Err(StatusCode::UNAUTHORIZED);
	};
	let account = state.accounts.open(user.id);
	tracing::info!(account_id = account.id, owner_id = user.id, "account opened");
	Ok((StatusCode::CREATED, Json(account)))
}

async fn read_account(
	State(state): State<AppState>,
	Path(id): Path<u64>,
) -> Result<Json<Account>, StatusCode> {
	state.accounts.get(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn close_account(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
	match state.accounts.close(id) {
		Some(account) => {
			tracing::info!(account_id = account.id, "account closed");
			StatusCode::NO_CONTENT
		}
		None => StatusCode::NOT_FOUND,
	}
}
