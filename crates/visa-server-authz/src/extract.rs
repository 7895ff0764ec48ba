// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pulling references and context facts out of a request.

use axum::extract::{ConnectInfo, FromRequestParts, Query, RawPathParams};
use http::request::Parts;
use http::HeaderMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use visa_policy::{EvaluationContext, Reference, FACT_METHOD, FACT_PATH};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

type CustomReferences = Arc<dyn Fn(&Parts) -> Vec<Reference> + Send + Sync>;
pub(crate) type ContextHook = Arc<dyn Fn(&Parts, &mut EvaluationContext) + Send + Sync>;

/// Where a route's references come from.
#[derive(Clone, Default)]
pub enum ReferenceSource {
	/// The route carries no references.
	None,
	/// Every path parameter, in the order the route declares them.
	#[default]
	AllPathParams,
	/// A single named path parameter.
	PathParam(String),
	/// A request header.
	Header(String),
	/// Every value of a query-string parameter, in order.
	Query(String),
	/// Application-defined extraction.
	Custom(CustomReferences),
}

impl ReferenceSource {
	pub fn path_param(name: impl Into<String>) -> Self {
		Self::PathParam(name.into())
	}

	pub fn header(name: impl Into<String>) -> Self {
		Self::Header(name.into())
	}

	pub fn query(name: impl Into<String>) -> Self {
		Self::Query(name.into())
	}

	pub fn custom(f: impl Fn(&Parts) -> Vec<Reference> + Send + Sync + 'static) -> Self {
		Self::Custom(Arc::new(f))
	}

	/// Collects references from the request. Missing values yield no
	/// references rather than an error.
	pub async fn extract(&self, parts: &mut Parts) -> Vec<Reference> {
		match self {
			Self::None => Vec::new(),
			Self::AllPathParams => path_params(parts)
				.await
				.into_iter()
				.map(|(_, value)| Reference::new(value))
				.collect(),
			Self::PathParam(name) => path_params(parts)
				.await
				.into_iter()
				.filter(|(key, _)| key == name)
				.map(|(_, value)| Reference::new(value))
				.collect(),
			Self::Header(name) => parts
				.headers
				.get_all(name.as_str())
				.iter()
				.filter_map(|value| value.to_str().ok())
				.map(Reference::from)
				.collect(),
			Self::Query(name) => Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
				.map(|Query(pairs)| {
					pairs
						.into_iter()
						.filter(|(key, _)| key == name)
						.map(|(_, value)| Reference::new(value))
						.collect()
				})
				.unwrap_or_default(),
			Self::Custom(f) => f(parts),
		}
	}
}

impl fmt::Debug for ReferenceSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => write!(f, "None"),
			Self::AllPathParams => write!(f, "AllPathParams"),
			Self::PathParam(name) => f.debug_tuple("PathParam").field(name).finish(),
			Self::Header(name) => f.debug_tuple("Header").field(name).finish(),
			Self::Query(name) => f.debug_tuple("Query").field(name).finish(),
			Self::Custom(_) => write!(f, "Custom(..)"),
		}
	}
}

async fn path_params(parts: &mut Parts) -> Vec<(String, String)> {
	match RawPathParams::from_request_parts(parts, &()).await {
		Ok(params) => params
			.iter()
			.map(|(key, value)| (key.to_string(), value.to_string()))
			.collect(),
		Err(_) => Vec::new(),
	}
}

/// Determines the client address of a request.
///
/// Uses the first `X-Forwarded-For` entry when `trust_forwarded_for` is set
/// and the header parses, otherwise the peer address of the connection.
pub async fn client_ip(parts: &mut Parts, trust_forwarded_for: bool) -> Option<IpAddr> {
	if trust_forwarded_for {
		if let Some(ip) = forwarded_for(&parts.headers) {
			return Some(ip);
		}
	}

	ConnectInfo::<SocketAddr>::from_request_parts(parts, &())
		.await
		.ok()
		.map(|ConnectInfo(addr)| addr.ip())
}

/// Parses the originating client from an `X-Forwarded-For` header.
pub fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
	headers
		.get(X_FORWARDED_FOR)?
		.to_str()
		.ok()?
		.split(',')
		.next()?
		.trim()
		.parse()
		.ok()
}

/// Builds the evaluation context for a request: client address, method and
/// path, then whatever the application hook adds.
pub(crate) async fn build_context(
	parts: &mut Parts,
	trust_forwarded_for: bool,
	hook: Option<&ContextHook>,
) -> EvaluationContext {
	let mut context = EvaluationContext::new();
	context.set_ip(client_ip(parts, trust_forwarded_for).await);
	context.insert(FACT_METHOD, parts.method.as_str());
	context.insert(FACT_PATH, parts.uri.path());

	if let Some(hook) = hook {
		hook(parts, &mut context);
	}
	context
}
