//! Scripted camera capture device.
//!
//! Drives [`ScanSession`](llavero_scanner::ScanSession) through every path
//! without hardware: each facing is scripted to either fail to start or to
//! deliver a fixed sequence of frame results, and stop/release calls are
//! recorded for teardown assertions.

use llavero_scanner::camera::{CameraCapture, CameraError, CameraFacing, FrameConfig, FrameMiss, FrameStream};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Frame results one scripted facing will deliver, in order.
pub type ScriptedFrames = Vec<Result<String, FrameMiss>>;

type FacingScript = Result<ScriptedFrames, String>;

/// Camera test double with per-facing scripts.
pub struct ScriptedCamera {
    environment: Mutex<Option<FacingScript>>,
    user: Mutex<Option<FacingScript>>,
    stopped: AtomicBool,
    released: AtomicUsize,
}

impl ScriptedCamera {
    /// A camera whose rear facing starts and delivers the given frames.
    #[must_use]
    pub fn rear_working(frames: ScriptedFrames) -> Self {
        Self::scripted(Ok(frames), Ok(Vec::new()))
    }

    /// A camera whose rear facing is denied but whose front facing delivers
    /// the given frames.
    #[must_use]
    pub fn rear_denied(frames: ScriptedFrames) -> Self {
        Self::scripted(Err("permission denied".to_string()), Ok(frames))
    }

    /// A camera where every facing fails to start.
    #[must_use]
    pub fn all_denied() -> Self {
        Self::scripted(
            Err("permission denied".to_string()),
            Err("no device".to_string()),
        )
    }

    /// Fully scripted constructor.
    #[must_use]
    pub fn scripted(environment: FacingScript, user: FacingScript) -> Self {
        Self {
            environment: Mutex::new(Some(environment)),
            user: Mutex::new(Some(user)),
            stopped: AtomicBool::new(false),
            released: AtomicUsize::new(0),
        }
    }

    /// Whether an async stop was requested.
    #[must_use]
    pub fn was_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// How many times the synchronous release path ran.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn take_script(&self, facing: CameraFacing) -> FacingScript {
        let slot = match facing {
            CameraFacing::Environment => &self.environment,
            CameraFacing::User => &self.user,
        };
        slot.lock()
            .map_or_else(
                |_| Err("script lock poisoned".to_string()),
                |mut script| script.take().unwrap_or_else(|| Err("already started".to_string())),
            )
    }
}

impl CameraCapture for ScriptedCamera {
    fn start(
        &self,
        facing: CameraFacing,
        _config: FrameConfig,
    ) -> Pin<Box<dyn Future<Output = Result<FrameStream, CameraError>> + Send + '_>> {
        Box::pin(async move {
            match self.take_script(facing) {
                Ok(frames) => Ok(Box::pin(futures::stream::iter(frames)) as FrameStream),
                Err(reason) => Err(CameraError::StartFailed { facing, reason }),
            }
        })
    }

    fn stop(&self) -> Pin<Box<dyn Future<Output = Result<(), CameraError>> + Send + '_>> {
        Box::pin(async {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
