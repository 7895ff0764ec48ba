// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Enforcing visa policies in an axum request pipeline.
//!
//! - [`Authorize`]: route layer evaluating one descriptor per request
//! - [`ReferenceSource`]: where a route's references come from
//! - [`AuthorizeConfig`]: response statuses and client address handling
//! - [`check_authorization`] / [`authorize!`]: handler-level checks
//!
//! Outcomes map to responses as follows:
//!
//! | Decision | Response |
//! |----------|----------|
//! | Allowed  | request continues to the handler |
//! | Denied   | `denied_status` (401 by default) |
//! | Failed   | `failed_status` (500 by default), [`AuthorizationFailure`] in extensions |

pub mod config;
pub mod extract;
pub mod handler;
pub mod layer;

pub use visa_policy;

pub use config::{AuthorizeConfig, ConfigError};
pub use extract::{client_ip, forwarded_for, ReferenceSource};
pub use handler::{check_authorization, AuthorizationError};
pub use layer::{authorize, Authorize, AuthorizationFailure, AuthorizeService, ErrorBody};
