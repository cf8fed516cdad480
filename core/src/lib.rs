//! # Llavero Core
//!
//! Domain types and contracts for the llavero shared-key custody tracker.
//!
//! A small fixed community shares one physical key. Whoever takes it is
//! identified by scanning a printed identity token, and every hand-over is
//! recorded as an immutable usage event. This crate holds everything that is
//! independent of a concrete transport or capture device:
//!
//! - [`member`]: the fixed community registry
//! - [`event`]: immutable usage events and period labelling
//! - [`ledger`]: the append/remove/subscribe ledger contract
//! - [`resolver`]: scanned-payload → member resolution
//! - [`aggregate`]: pure per-member / per-period summaries
//! - [`export`]: flat delimited-text export
//! - [`environment`]: injectable clock and actor provider
//!
//! ## Architecture Principles
//!
//! - The ledger is the single source of truth; every view is a pure function
//!   of its latest snapshot.
//! - Observers stay consistent through a push-based live subscription, not
//!   polling or cache invalidation.
//! - External concerns (time, operator identity, the backing store, the
//!   camera) are traits injected at the edges.
//!
//! ## Example
//!
//! ```no_run
//! use llavero_core::environment::ActorId;
//! use llavero_core::ledger::EventLedger;
//! use llavero_core::member::MemberRegistry;
//! use llavero_core::resolver::{resolve, Resolution};
//!
//! async fn handle_scan(
//!     ledger: &dyn EventLedger,
//!     registry: &MemberRegistry,
//!     payload: &str,
//! ) -> Result<(), llavero_core::ledger::LedgerError> {
//!     match resolve(registry, payload) {
//!         Resolution::Member(member) => {
//!             ledger.append(member.id, ActorId::new("operator-1")).await?;
//!         }
//!         Resolution::Unresolved { raw_id } => {
//!             tracing::warn!(%raw_id, "unknown token, prompting rescan");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod aggregate;
pub mod environment;
pub mod event;
pub mod export;
pub mod ledger;
pub mod member;
pub mod resolver;
