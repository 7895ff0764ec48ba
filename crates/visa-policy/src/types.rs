// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Value types that flow through a policy evaluation.
//!
//! - [`Reference`]: a raw identifier taken from the request (e.g. a path parameter)
//! - [`Object`]: a resolved domain object, represented as JSON
//! - [`EvaluationContext`]: request-derived facts handed to every predicate
//!
//! Subjects are not defined here; the engine is generic over whatever type the
//! authentication layer attaches to the request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// Boxed error type returned by application-supplied predicates and resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A resolved domain object.
pub type Object = Value;

/// Raw request-supplied identifier denoting a domain object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}

	/// The object a reference stands for when its resource has no resolver.
	pub fn into_object(self) -> Object {
		Value::String(self.0)
	}
}

impl fmt::Display for Reference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for Reference {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for Reference {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

/// Context fact key for the HTTP method of the request.
pub const FACT_METHOD: &str = "method";
/// Context fact key for the request path.
pub const FACT_PATH: &str = "path";

/// Per-request facts available to predicates.
///
/// The originating network address is always a first-class field; everything
/// else the application chooses to surface lives in the fact map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
	ip: Option<IpAddr>,
	facts: BTreeMap<String, Value>,
}

impl EvaluationContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a context for a request that originated from `ip`.
	pub fn from_ip(ip: IpAddr) -> Self {
		Self {
			ip: Some(ip),
			facts: BTreeMap::new(),
		}
	}

	/// The originating network address, if known.
	pub fn ip(&self) -> Option<IpAddr> {
		self.ip
	}

	/// Returns true if the request came from the local host.
	///
	/// IPv4-mapped IPv6 addresses (`::ffff:127.0.0.1`) count as loopback.
	pub fn is_loopback(&self) -> bool {
		self.ip.is_some_and(|ip| ip.to_canonical().is_loopback())
	}

	pub fn set_ip(&mut self, ip: Option<IpAddr>) {
		self.ip = ip;
	}

	pub fn with_ip(mut self, ip: IpAddr) -> Self {
		self.ip = Some(ip);
		self
	}

	/// Looks up an application fact.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.facts.get(key)
	}

	/// Looks up an application fact that is a string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// Adds or replaces an application fact.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.facts.insert(key.into(), value.into());
	}

	pub fn with_fact(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(key, value);
		self
	}

	pub fn facts(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.facts.iter().map(|(k, v)| (k.as_str(), v))
	}
}
