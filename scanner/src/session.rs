//! Scan session: one camera-acquisition-to-release lifecycle.
//!
//! The session is an explicit state machine with a single owner:
//!
//! ```text
//! Idle ──start()──► Starting ──► Active ──stop()/teardown──► Stopped
//!                      │
//!                      └─(every camera failed)─► Error   (terminal)
//! ```
//!
//! Acquisition tries a declared ordered list of strategies — rear camera
//! first, then front/default — and only surfaces an error once every
//! strategy has failed. The fallback is silent; the user sees nothing unless
//! both attempts fail, in which case the error message is actionable
//! (usually a denied permission).
//!
//! Release of the camera is guaranteed on every exit path: explicit
//! [`stop`](ScanSession::stop), a frame stream that dries up, and abrupt
//! drop of the session (the `Drop` impl calls the capture's synchronous
//! `release`). A failed or cancelled session never touches the ledger —
//! resolved scans are only *returned* to the caller, which decides what to
//! append.
//!
//! `Error` is terminal for a session instance. Underlying permission state
//! may have changed by the time the user retries, so recovery is a fresh
//! session, not a restart of this one.

use crate::camera::{CameraCapture, CameraError, CameraFacing, FrameConfig, FrameStream};
use futures::StreamExt;
use llavero_core::member::{Member, MemberRegistry};
use llavero_core::resolver::{Resolution, resolve};
use std::fmt;
use std::sync::Arc;

/// Ordered acquisition strategies: rear camera preferred, front as fallback.
const ACQUISITION_ORDER: [CameraFacing; 2] = [CameraFacing::Environment, CameraFacing::User];

/// Lifecycle state of a scan session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Created, camera not yet requested
    Idle,
    /// Acquisition strategies are being tried
    Starting,
    /// Camera held, decode loop running
    Active,
    /// Camera released; the session is over
    Stopped,
    /// Every acquisition strategy failed; terminal for this instance
    Error,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Stopped => "stopped",
            Self::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// A decoded frame after resolution against the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanEvent {
    /// The payload matched a registered member.
    Resolved(Member),
    /// The payload decoded but matched nobody; the session stays active so
    /// the user can rescan.
    Unresolved {
        /// The identifier that failed to match
        raw_id: String,
    },
}

/// One camera-acquisition-to-release lifecycle for a single scanning attempt.
///
/// Owned exclusively by the scanning UI for as long as its modal is open.
/// Only one session should hold the camera at a time; that is enforced by
/// ownership at the call site (one modal, one session), not by this type.
pub struct ScanSession {
    capture: Arc<dyn CameraCapture>,
    registry: MemberRegistry,
    config: FrameConfig,
    status: SessionStatus,
    facing: Option<CameraFacing>,
    last_error: Option<String>,
    frames: Option<FrameStream>,
}

impl ScanSession {
    /// Creates an idle session over the given capture device and registry.
    #[must_use]
    pub fn new(capture: Arc<dyn CameraCapture>, registry: MemberRegistry) -> Self {
        Self::with_config(capture, registry, FrameConfig::default())
    }

    /// Creates an idle session with a non-default frame configuration.
    #[must_use]
    pub const fn with_config(
        capture: Arc<dyn CameraCapture>,
        registry: MemberRegistry,
        config: FrameConfig,
    ) -> Self {
        Self {
            capture,
            registry,
            config,
            status: SessionStatus::Idle,
            facing: None,
            last_error: None,
            frames: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Which camera the session ended up holding, once active.
    #[must_use]
    pub const fn facing(&self) -> Option<CameraFacing> {
        self.facing
    }

    /// The user-facing message for the last terminal failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Acquires a camera and starts the decode loop.
    ///
    /// Tries each strategy in [`ACQUISITION_ORDER`]; per-strategy failures
    /// are logged and absorbed until the list is exhausted.
    ///
    /// # Errors
    ///
    /// - [`CameraError::InvalidState`]: the session is not `Idle`
    /// - [`CameraError::Acquisition`]: every strategy failed; the session is
    ///   now `Error` and must be replaced, not restarted
    pub async fn start(&mut self) -> Result<(), CameraError> {
        if self.status != SessionStatus::Idle {
            return Err(CameraError::InvalidState {
                state: self.status.to_string(),
                expected: SessionStatus::Idle.to_string(),
            });
        }
        self.status = SessionStatus::Starting;

        let mut failures: Vec<(CameraFacing, String)> = Vec::new();
        for facing in ACQUISITION_ORDER {
            match self.capture.start(facing, self.config).await {
                Ok(frames) => {
                    tracing::info!(camera = %facing, "camera acquired, decode loop running");
                    self.frames = Some(frames);
                    self.facing = Some(facing);
                    self.status = SessionStatus::Active;
                    return Ok(());
                }
                Err(error) => {
                    tracing::warn!(camera = %facing, %error, "camera start failed, trying next");
                    failures.push((facing, error.to_string()));
                }
            }
        }

        let error = CameraError::Acquisition {
            environment: failure_reason(&failures, CameraFacing::Environment),
            user: failure_reason(&failures, CameraFacing::User),
        };
        tracing::error!(%error, "all camera strategies failed");
        self.last_error = Some(error.to_string());
        self.status = SessionStatus::Error;
        Err(error)
    }

    /// Waits for the next frame that decodes to a payload and resolves it.
    ///
    /// Misses (frames with no code) are absorbed silently and cause no state
    /// transition. Returns `None` when the session is not active or when the
    /// device stops delivering frames — in the latter case the camera is
    /// released and the session moves to `Stopped`.
    ///
    /// Both `Resolved` and `Unresolved` leave the session `Active`: treating
    /// a successful resolution as session-ending is the caller's choice,
    /// made by calling [`stop`](Self::stop).
    pub async fn next_scan(&mut self) -> Option<ScanEvent> {
        loop {
            let frames = self.frames.as_mut()?;
            match frames.next().await {
                Some(Ok(payload)) => match resolve(&self.registry, &payload) {
                    Resolution::Member(member) => {
                        tracing::info!(member = %member.id, "scan resolved");
                        return Some(ScanEvent::Resolved(member));
                    }
                    Resolution::Unresolved { raw_id } => {
                        tracing::warn!(%raw_id, "scan matched no registered member");
                        return Some(ScanEvent::Unresolved { raw_id });
                    }
                },
                Some(Err(miss)) => {
                    tracing::trace!(%miss, "frame miss");
                }
                None => {
                    tracing::info!("frame stream ended, releasing camera");
                    self.frames = None;
                    self.capture.release();
                    self.facing = None;
                    self.status = SessionStatus::Stopped;
                    return None;
                }
            }
        }
    }

    /// Stops the decode loop and releases the camera.
    ///
    /// Safe to call from any state and more than once. A terminal `Error`
    /// stays `Error`; every other state ends at `Stopped`.
    pub async fn stop(&mut self) {
        let was_held = self.frames.take().is_some();
        if was_held {
            if let Err(error) = self.capture.stop().await {
                // The session is over regardless; the sync release below is
                // the backstop for a device that refused a clean stop.
                tracing::warn!(%error, "camera stop reported an error");
                self.capture.release();
            }
            tracing::info!("camera released");
        }
        self.facing = None;
        if self.status != SessionStatus::Error {
            self.status = SessionStatus::Stopped;
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        // Abrupt teardown (modal closed without stop): the synchronous
        // release path keeps the hardware usable for the next session.
        if matches!(self.status, SessionStatus::Starting | SessionStatus::Active) {
            tracing::warn!(status = %self.status, "scan session dropped while camera held");
            self.frames = None;
            self.capture.release();
        }
    }
}

impl fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("status", &self.status)
            .field("facing", &self.facing)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

fn failure_reason(failures: &[(CameraFacing, String)], facing: CameraFacing) -> String {
    failures
        .iter()
        .find(|(f, _)| *f == facing)
        .map_or_else(|| "not attempted".to_string(), |(_, reason)| reason.clone())
}
