// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The bank's authorization policy.
//!
//! | Descriptor            | Allowed when |
//! |-----------------------|--------------|
//! | `can open account`    | teller, request from the branch (loopback) |
//! | `can read account`    | account exists, owner or manager |
//! | `can close account`   | account exists, owner or manager |

use serde_json::Value;
use visa_policy::{EvaluationContext, Object, Policy, Reference};

use crate::accounts::AccountStore;
use crate::auth::DemoUser;

pub fn bank_policy(accounts: AccountStore) -> Policy<DemoUser> {
	Policy::builder()
		.resource("account", move |account| {
			account
				.resolve_with(move |refs: &[Reference]| resolve_accounts(&accounts, refs))
				.operation("open", can_open)
				.operation("read", owner_or_manager)
				.operation("close", owner_or_manager)
		})
		.build()
}

/// Unknown or malformed ids resolve to `null`.
fn resolve_accounts(
	accounts: &AccountStore,
	refs: &[Reference],
) -> Result<Vec<Object>, serde_json::Error> {
	refs
		.iter()
		.map(|r| match r.as_str().parse().ok().and_then(|id| accounts.get(id)) {
			Some(account) => serde_json::to_value(account),
			None => Ok(Value::Null),
		})
		.collect()
}

fn can_open(user: Option<&DemoUser>, _: Option<&Object>, ctx: &EvaluationContext) -> bool {
	user.is_some_and(|u| u.has_role("teller")) && ctx.is_loopback()
}

fn owner_or_manager(user: Option<&DemoUser>, account: Option<&Object>, _: &EvaluationContext) -> bool {
	let (Some(user), Some(account)) = (user, account) else {
		return false;
	};
	if account.is_null() {
		return false;
	}
	user.has_role("manager") || account["ownerId"] == Value::from(user.id)
}
