//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); log lines identify
//! themselves through structured fields such as `cart_id`, `context_id` and `op`.
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: startup, shutdown, timers disarmed on the way out
//! - **Cart lifecycle**: created, item added/removed, expired by timer, reaped on access
//! - **Mirror**: context created/deleted/evicted (debug)
//! - **Failures**: every rejected request with its error, total mismatches, rollbacks
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run
//!
//! # Request payloads and mirror bookkeeping
//! RUST_LOG=debug cargo run
//!
//! # Only the orchestrator
//! RUST_LOG=telecom_cart::cart_actor=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a short session looks like:
//!
//! ```text
//! INFO Cart system started ttl_ms=300000 environment="development"
//! INFO Cart actor started
//! INFO Cart created cart_id=6f1c.. context_id=a83e.. size=1
//! INFO Item added cart_id=6f1c.. items=1
//! WARN Request failed op="AddItem" cart_id=6f1c.. error=Item with ID 'phone-1' already exists in context 'a83e..'
//! INFO Cart expired cart_id=6f1c.. context_id=a83e..
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
