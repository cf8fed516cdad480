//! # Llavero App
//!
//! Application glue for the llavero key-custody tracker: everything between
//! the pure domain logic in `llavero-core` and the outer rendering surfaces.
//!
//! - [`watch`]: background consumer of the ledger subscription; keeps the
//!   latest snapshot and its aggregate behind a watch channel
//! - [`service`]: records usages, guards the irreversible delete, exports
//!   the spreadsheet artifact
//! - [`notify`]: transient operator-facing status messages
//! - [`cards`]: printable identity-card data and token-image download
//!
//! ## Control flow
//!
//! A scan session decodes a token and resolves it; the service appends the
//! usage event; the ledger pushes a new snapshot to the watcher; every view
//! re-reads the recomputed aggregate. One one-way loop, no cache
//! invalidation.

pub mod cards;
pub mod notify;
pub mod service;
pub mod watch;

pub use notify::{Notice, NoticeBoard, NoticeLevel};
pub use service::{Confirmed, CsvExport, ServiceError, UsageService};
pub use watch::{LedgerWatcher, WatchState};
