// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bank-teller demo for visa policies.
//!
//! Tellers open accounts from the branch, owners close their own accounts and
//! managers may read or close any account. Authentication is a header stub;
//! see [`auth`].

pub mod accounts;
pub mod auth;
pub mod policy;
pub mod report;
pub mod routes;

pub use accounts::{Account, AccountStore};
pub use auth::{demo_auth, DemoUser};
pub use policy::bank_policy;
pub use report::report_authorization_failures;
pub use routes::{create_router, AppState};
