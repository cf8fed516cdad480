//! Camera capture abstraction.
//!
//! The actual capture library (browser camera API, V4L2 wrapper, a vendor
//! SDK) is an external collaborator. The scanner only requires three things
//! of it: request a named camera, receive per-frame decode results, and be
//! told to stop. Everything else — fallback order, state transitions,
//! guaranteed teardown — lives in [`ScanSession`](crate::session::ScanSession).
//!
//! # Dyn Compatibility
//!
//! [`CameraCapture`] uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` so sessions can hold an `Arc<dyn CameraCapture>` without
//! knowing the concrete device.

use futures::Stream;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Which camera to request from the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraFacing {
    /// Rear camera (preferred for scanning printed cards)
    Environment,
    /// Front camera or the platform default webcam
    User,
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Per-frame decode configuration handed to the capture library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    /// Frames per second to sample
    pub fps: u32,
    /// Width and height of the scan box, in pixels
    pub scan_box: (u32, u32),
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            scan_box: (250, 250),
        }
    }
}

/// Outcome of one sampled frame that did not produce a payload.
///
/// These are expected — most frames contain no code at all — and the session
/// absorbs them without any state transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameMiss {
    /// No code was visible in the frame.
    #[error("no code in frame")]
    NoCode,

    /// Something that looked like a code failed to decode.
    #[error("frame decode failed: {0}")]
    DecodeFailed(String),
}

/// Stream of per-frame decode results while a camera is active.
///
/// `Ok` items carry the decoded payload text; `Err` items are misses. The
/// stream ends when the device stops delivering frames.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, FrameMiss>> + Send>>;

/// Errors from camera acquisition and control.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The capture library itself could not be loaded.
    #[error("capture library unavailable: {0}")]
    LibraryUnavailable(String),

    /// One acquisition attempt failed (denied, missing hardware, busy).
    #[error("camera ({facing}) failed to start: {reason}")]
    StartFailed {
        /// Which camera was requested
        facing: CameraFacing,
        /// Device- or platform-reported cause
        reason: String,
    },

    /// Every camera in the fallback order failed to start.
    ///
    /// Terminal for the session. The message is user-actionable: the common
    /// cause is a denied camera permission.
    #[error(
        "no camera could be started (rear: {environment}; front: {user}) - \
         check that camera permission is granted"
    )]
    Acquisition {
        /// Why the rear/environment camera failed
        environment: String,
        /// Why the front/user camera failed
        user: String,
    },

    /// The session was not in a state that allows the requested transition.
    #[error("scan session is {state}, expected {expected}")]
    InvalidState {
        /// Current session state
        state: String,
        /// State the operation requires
        expected: String,
    },
}

/// A camera device that can be started on a chosen facing and stopped.
///
/// # Contract
///
/// - `start` returns the frame stream for exactly one active acquisition;
///   implementations may reject a second `start` while one is active.
/// - `stop` releases the device; it must be safe to call more than once.
/// - `release` is the abrupt-teardown path: synchronous, idempotent, and
///   infallible. [`ScanSession`](crate::session::ScanSession) calls it from
///   `Drop` so the hardware is never left locked for the next session.
pub trait CameraCapture: Send + Sync {
    /// Requests the given camera and begins the per-frame decode loop.
    ///
    /// # Errors
    ///
    /// - [`CameraError::StartFailed`]: this facing is denied, absent, or busy
    fn start(
        &self,
        facing: CameraFacing,
        config: FrameConfig,
    ) -> Pin<Box<dyn Future<Output = Result<FrameStream, CameraError>> + Send + '_>>;

    /// Stops the decode loop and releases the device.
    ///
    /// # Errors
    ///
    /// - [`CameraError::StartFailed`]: the device refused to stop cleanly;
    ///   callers log and move on, the session is over either way
    fn stop(&self) -> Pin<Box<dyn Future<Output = Result<(), CameraError>> + Send + '_>>;

    /// Synchronously releases the device. Idempotent; never fails.
    fn release(&self);
}

/// Loads the capture library, once.
pub trait CaptureLoader: Send + Sync {
    /// Performs the one-time load and hands back the capture device.
    ///
    /// # Errors
    ///
    /// - [`CameraError::LibraryUnavailable`]: the library could not be loaded
    fn load(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn CameraCapture>, CameraError>> + Send + '_>>;
}

/// One-time async load gate for the capture library.
///
/// The gate has its own loaded/not-loaded state, independent of any camera:
/// the library loads at most once, a failed load can be retried, and every
/// session after the first gets the cached handle.
pub struct CaptureGate {
    loader: Arc<dyn CaptureLoader>,
    loaded: OnceCell<Arc<dyn CameraCapture>>,
}

impl CaptureGate {
    /// Creates a gate over the given loader.
    #[must_use]
    pub fn new(loader: Arc<dyn CaptureLoader>) -> Self {
        Self {
            loaded: OnceCell::new(),
            loader,
        }
    }

    /// Whether the library has finished loading.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Returns the capture handle, loading the library on first use.
    ///
    /// Concurrent callers share one load; a failed load leaves the gate
    /// unloaded so a later call can retry.
    ///
    /// # Errors
    ///
    /// - [`CameraError::LibraryUnavailable`]: the load failed
    pub async fn capture(&self) -> Result<Arc<dyn CameraCapture>, CameraError> {
        self.loaded
            .get_or_try_init(|| self.loader.load())
            .await
            .cloned()
    }
}

impl fmt::Debug for CaptureGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureGate")
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
