// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Visa demo server binary.

use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use visa_policy::PolicyRegistry;
use visa_server::{bank_policy, create_router, AccountStore, DemoUser};
use visa_server_authz::AuthorizeConfig;

/// Visa server - bank-teller demo guarded by visa policies.
#[derive(Parser, Debug)]
#[command(name = "visa-server", about = "Visa policy demo server", version)]
struct Args {
	/// Address to bind
	#[arg(long, env = "VISA_SERVER_HOST", default_value = "127.0.0.1")]
	host: String,

	/// Port to listen on
	#[arg(long, env = "VISA_SERVER_PORT", default_value_t = 8080)]
	port: u16,

	/// Default log filter, overridden by RUST_LOG
	#[arg(long, env = "VISA_SERVER_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Load .env file if present, before clap reads the environment
	dotenvy::dotenv().ok();

	let args = Args::parse();

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| args.log_level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let authz_config = AuthorizeConfig::from_env()?;
	tracing::info!(
		host = %args.host,
		port = args.port,
		denied_status = %authz_config.denied_status,
		failed_status = %authz_config.failed_status,
		trust_forwarded_for = authz_config.trust_forwarded_for,
		"starting visa-server"
	);

	let registry = PolicyRegistry::<DemoUser>::new();
	let accounts = AccountStore::new();
	let app = create_router(registry.clone(), accounts.clone(), authz_config);

	// Routes are wired; the policy can be installed or swapped at any time.
	registry.set_policy(bank_policy(accounts));
	tracing::info!(resources = ?registry.resource_names(), "policy installed");

	let addr = format!("{}:{}", args.host, args.port);
	let listener = tokio::net::TcpListener::bind(&addr).await?;
	tracing::info!("listening on {}", addr);

	tokio::select! {
		result = axum::serve(
			listener,
			app.into_make_service_with_connect_info::<SocketAddr>(),
		) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
