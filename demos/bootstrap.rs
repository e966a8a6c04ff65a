//! Bootstrap demo: fetch a user, then their tenant, then show a failure.
//!
//! Run with: cargo run --example bootstrap
//! Set RUST_LOG=phunk=debug to see every dispatched action.

use std::time::Duration;

use async_trait::async_trait;
use phunk::{
    action, async_value, sequence, BoxError, Completion, Element, Error, Middleware, Phunk,
    RecordingStore, Recover, ResultTable,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, Error)]
enum DirectoryError {
    #[error("tenant service unavailable")]
    TenantUnavailable,
    #[error("no user to look up a tenant for")]
    NoUser,
}

// ============================================================================
// Tasks
// ============================================================================

/// Fetches the logged-in user.
fn fetch_user(_: &ResultTable) -> Completion {
    Completion::deferred(async {
        println!("  [fetch_user] Fetching logged in user...");
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(json!({"id": 1, "name": "A User", "tenant": 2}))
    })
}

/// Fetches the tenant of the logged-in user.
struct FetchTenant {
    available: bool,
}

#[async_trait]
impl Phunk for FetchTenant {
    async fn run(&self, values: &ResultTable) -> Result<Value, BoxError> {
        let tenant = values
            .get("loggedInUser")
            .and_then(|user| user.get("tenant"))
            .cloned()
            .ok_or(DirectoryError::NoUser)?;

        println!("  [FetchTenant] Fetching tenant {}...", tenant);
        tokio::time::sleep(Duration::from_millis(150)).await;

        if !self.available {
            return Err(DirectoryError::TenantUnavailable.into());
        }
        Ok(json!({"id": tenant, "name": "A Tenant"}))
    }
}

/// Announces the failure before the sequence settles.
struct Announce;

#[async_trait]
impl Recover for Announce {
    async fn recover(&self, error: &Error) -> Result<Value, BoxError> {
        println!("  [Announce] RECOVERING from: {}", error);
        Ok(Value::Null)
    }
}

fn bootstrap(tenant_available: bool) -> Vec<phunk::Dispatch> {
    sequence![
        action!("GETTING_USER"),
        Element::task("loggedInUser", fetch_user),
        action!("GOT_USER", user: async_value("loggedInUser").expect("valid name")),
        action!("GETTING_TENANT"),
        Element::phunk("tenant", FetchTenant { available: tenant_available }),
        action!("GOT_TENANT", tenant: async_value("tenant").expect("valid name")),
        Element::recover_with(Announce),
    ]
}

fn print_actions(store: &RecordingStore) {
    for action in store.actions() {
        println!("  -> {}", action);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Happy path ===");
    let middleware = Middleware::new(RecordingStore::new());
    match middleware.dispatch_sequence(bootstrap(true)).await {
        Ok(values) => println!("Settled with {}", values.to_json()),
        Err(e) => println!("Failed: {}", e),
    }
    print_actions(middleware.store());

    println!();
    println!("=== Tenant service down ===");
    let middleware = Middleware::new(RecordingStore::new());
    match middleware.dispatch_sequence(bootstrap(false)).await {
        Ok(values) => println!("Settled with {}", values.to_json()),
        Err(e) => println!("Failed ({:?}): {}", e.kind(), e),
    }
    print_actions(middleware.store());
}
