//! # Telecom Cart
//!
//! > **Short-lived shopping carts kept in lockstep with an external customer context.**
//!
//! A cart is created, items are added and removed, a total is computed, and the cart
//! is destroyed either explicitly or when its time-to-live runs out. Every mutation is
//! mirrored into a customer-context record held by an external CRM, and on expiry both
//! are torn down together.
//!
//! ## 🏗️ Design
//!
//! ### Immutable carts
//! [`Cart`](model::Cart) is a value. `add_item`/`remove_item` return a new cart and never
//! touch the original, so a failed step can always fall back to the cart it started from.
//!
//! ### Mirror first, then local
//! The orchestrator writes to the customer context *before* it touches the local cart.
//! If the mirror refuses (duplicate item, unknown context, context expired) the local cart
//! is untouched. If the local step fails after the mirror accepted, the mirror write is
//! rolled back.
//!
//! ### Two independent clocks
//! The cart and its context each compute their own `expires_at` from the same TTL. They
//! are never assumed to expire at the same instant. Every read re-checks the cart's
//! expiry instead of trusting the timer.
//!
//! ### One writer
//! All state lives inside a single actor task. Requests from clients and expiry timer
//! notices go through the same loop, one at a time. See [`cart_actor::actor`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Entity ([`model`])
//! - **Key items**: [`CartItem`](model::CartItem), [`Cart`](model::Cart), [`CartFactory`](model::CartFactory).
//!
//! ### 2. The Stores ([`store`], [`context`])
//! - [`CartStore`](store::CartStore): authoritative, no TTL logic.
//! - [`CustomerContext`](context::CustomerContext): the mirror contract, with
//!   [`MockContextStore`](context::MockContextStore) as the in-memory CRM.
//!
//! ### 3. Expiry ([`expiry`])
//! - [`ExpiryScheduler`](expiry::ExpiryScheduler): one timer per cart, teardown on the actor loop.
//!
//! ### 4. The Orchestrator ([`cart_actor`])
//! - [`CartService`](cart_actor::CartService): sequencing and consistency rules.
//! - [`CartActor`](cart_actor::CartActor): the single-writer loop around it.
//!
//! ### 5. The Interface ([`clients`], [`view`])
//! - [`CartClient`](clients::CartClient): async, typed handle used by callers.
//! - [`view`]: JSON request/response shapes for a transport layer.
//!
//! ### 6. Wiring ([`lifecycle`], [`config`])
//! - [`CartSystem`](lifecycle::CartSystem): spawns the actor, shuts it down.
//! - [`Config`](config::Config): TTL and mailbox size from the environment.
//!
//! ## 🚀 Running the Demo
//!
//! ```bash
//! RUST_LOG=info CART_EXPIRY_MS=300000 cargo run
//! ```

pub mod cart_actor;
pub mod clients;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod expiry;
pub mod lifecycle;
pub mod model;
pub mod store;
pub mod view;
