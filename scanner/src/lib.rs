//! # Llavero Scanner
//!
//! Camera capture abstraction and the scan-session state machine.
//!
//! The capture library is an external collaborator behind the
//! [`camera::CameraCapture`] trait; [`session::ScanSession`] owns one
//! acquisition-to-release lifecycle, including the silent rear→front camera
//! fallback and the release-on-every-exit guarantee.
//!
//! ## Example
//!
//! ```no_run
//! use llavero_core::member::MemberRegistry;
//! use llavero_scanner::{ScanEvent, ScanSession};
//! # async fn example(capture: std::sync::Arc<dyn llavero_scanner::CameraCapture>) {
//! let registry = MemberRegistry::default_community();
//! let mut session = ScanSession::new(capture, registry);
//!
//! if session.start().await.is_ok() {
//!     while let Some(event) = session.next_scan().await {
//!         match event {
//!             ScanEvent::Resolved(member) => {
//!                 // hand the member to the ledger, then end the session
//!                 break;
//!             }
//!             ScanEvent::Unresolved { raw_id } => {
//!                 tracing::warn!(%raw_id, "unknown token, keep scanning");
//!             }
//!         }
//!     }
//! }
//! session.stop().await;
//! # }
//! ```

pub mod camera;
pub mod session;

pub use camera::{
    CameraCapture, CameraError, CameraFacing, CaptureGate, CaptureLoader, FrameConfig, FrameMiss,
    FrameStream,
};
pub use session::{ScanEvent, ScanSession, SessionStatus};
