// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory account storage.

use serde::Serialize;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
	pub id: u64,
	pub owner_id: u64,
}

/// Shared handle to the account table. Clones see the same accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
	accounts: Arc<RwLock<HashMap<u64, Account>>>,
	last_id: Arc<AtomicU64>,
}

impl AccountStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn open(&self, owner_id: u64) -> Account {
		let id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
		let account = Account { id, owner_id };
		self.accounts.write().insert(id, account.clone());
		account
	}

	pub fn get(&self, id: u64) -> Option<Account> {
		self.accounts.read().get(&id).cloned()
	}

	pub fn close(&self, id: u64) -> Option<Account> {
		self.accounts.write().remove(&id)
	}
}
