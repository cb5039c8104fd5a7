//! Frame pipeline orchestration.
//!
//! `FramePipeline` drives the whole capture flow: permission gate, device
//! selection, session configuration, continuous capture, and per-frame
//! decode + delivery to the registered observer on the UI dispatcher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pixelpick_common::config::CaptureDefaults;
use pixelpick_common::error::{PixelpickError, PixelpickResult};
use pixelpick_platform_core::{
    select_device, AuthorizationStatus, CameraFacing, DeviceKind, ResolutionPreset,
    VideoOrientation,
};

use crate::backend::CameraBackend;
use crate::decode::decode_frame;
use crate::dispatch::UiDispatcher;
use crate::observer::{CapturedFrame, FrameObserver, FrameSubscription, ObserverRegistry};
use crate::session::{CaptureSession, RawFrameReceiver, VideoOutput};

/// Configuration for a frame pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Required camera facing.
    pub facing: CameraFacing,

    /// Required optical class.
    pub kind: DeviceKind,

    /// Resolution tier requested from the backend.
    pub preset: ResolutionPreset,

    /// Orientation applied to the stream connection when supported.
    pub orientation: VideoOrientation,

    /// Capacity of the raw-frame delivery channel.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            facing: CameraFacing::Back,
            kind: DeviceKind::WideAngle,
            preset: ResolutionPreset::Medium,
            orientation: VideoOrientation::Portrait,
            queue_capacity: 4,
        }
    }
}

impl PipelineConfig {
    /// Build a config from the persisted capture defaults.
    pub fn from_defaults(defaults: &CaptureDefaults) -> PixelpickResult<Self> {
        let facing = match defaults.facing.as_str() {
            "back" => CameraFacing::Back,
            "front" => CameraFacing::Front,
            other => {
                return Err(PixelpickError::config(format!(
                    "unknown camera facing '{other}'"
                )))
            }
        };
        let preset = match defaults.preset.as_str() {
            "low" => ResolutionPreset::Low,
            "medium" => ResolutionPreset::Medium,
            "high" => ResolutionPreset::High,
            other => {
                return Err(PixelpickError::config(format!(
                    "unknown resolution preset '{other}'"
                )))
            }
        };
        Ok(Self {
            facing,
            preset,
            queue_capacity: defaults.queue_capacity,
            ..Self::default()
        })
    }
}

/// State of a frame pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Created but not started.
    Idle,
    /// Continuous capture in progress.
    Running,
    /// Stopped after running.
    Stopped,
    /// Camera access was denied; configuration never happened.
    Denied,
    /// Configuration failed partway.
    Failed,
}

/// Runtime statistics snapshot.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct PipelineStats {
    /// Raw frames received from the backend.
    pub frames_received: u64,

    /// Frames decoded and handed to the dispatcher.
    pub frames_delivered: u64,

    /// Frames rejected by the decoder.
    pub decode_failures: u64,

    /// Frames dropped at the delivery channel boundary.
    pub frames_dropped: u64,
}

impl PipelineStats {
    /// Channel drop rate as a percentage of produced frames.
    pub fn drop_rate(&self) -> f64 {
        let produced = self.frames_received + self.frames_dropped;
        if produced == 0 {
            return 0.0;
        }
        self.frames_dropped as f64 / produced as f64 * 100.0
    }
}

#[derive(Default)]
struct StatsInner {
    received: AtomicU64,
    delivered: AtomicU64,
    decode_failures: AtomicU64,
    channel_drops: Arc<AtomicU64>,
}

/// The frame capture pipeline.
pub struct FramePipeline {
    backend: Arc<dyn CameraBackend>,
    dispatcher: Arc<dyn UiDispatcher>,
    config: PipelineConfig,
    registry: Arc<ObserverRegistry>,
    session: CaptureSession,
    state: PipelineState,
    stats: Arc<StatsInner>,
    selected_device: Option<pixelpick_platform_core::CameraDescriptor>,
    delivery_task: Option<tokio::task::JoinHandle<()>>,
}

impl FramePipeline {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        dispatcher: Arc<dyn UiDispatcher>,
        config: PipelineConfig,
    ) -> Self {
        let session = CaptureSession::new(config.preset);
        Self {
            backend,
            dispatcher,
            config,
            registry: ObserverRegistry::new(),
            session,
            state: PipelineState::Idle,
            stats: Arc::new(StatsInner::default()),
            selected_device: None,
            delivery_task: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The device configuration settled on, once running.
    pub fn selected_device(&self) -> Option<&pixelpick_platform_core::CameraDescriptor> {
        self.selected_device.as_ref()
    }

    /// Register the frame observer. The pipeline keeps a non-owning
    /// reference; dropping the returned subscription unregisters it.
    pub fn subscribe(
        &self,
        observer: Arc<dyn FrameObserver>,
    ) -> PixelpickResult<FrameSubscription> {
        ObserverRegistry::subscribe(&self.registry, observer)
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            frames_received: self.stats.received.load(Ordering::Relaxed),
            frames_delivered: self.stats.delivered.load(Ordering::Relaxed),
            decode_failures: self.stats.decode_failures.load(Ordering::Relaxed),
            frames_dropped: self.stats.channel_drops.load(Ordering::Relaxed),
        }
    }

    /// Run the permission gate, configure the session, and start capture.
    ///
    /// Awaits the one-shot access prompt when authorization is still
    /// undetermined. May block momentarily while the stream spins up, so
    /// call it from a worker task, never the UI thread. A pipeline instance
    /// goes through this sequence at most once.
    pub async fn start(&mut self) -> PixelpickResult<()> {
        match self.state {
            PipelineState::Idle => {}
            PipelineState::Running => return Err(PixelpickError::AlreadyRunning),
            PipelineState::Denied => return Err(PixelpickError::PermissionDenied),
            _ => return Err(PixelpickError::backend("pipeline instances run once")),
        }

        if !self.check_permission().await {
            self.state = PipelineState::Denied;
            tracing::info!(backend = %self.backend.name(), "Camera access denied; skipping configuration");
            return Err(PixelpickError::PermissionDenied);
        }

        match self.configure_and_start().await {
            Ok(()) => {
                self.state = PipelineState::Running;
                tracing::info!(backend = %self.backend.name(), "Frame pipeline running");
                Ok(())
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    /// Stop capture and wait for the delivery task to drain.
    pub async fn stop(&mut self) -> PixelpickResult<()> {
        if self.state != PipelineState::Running {
            return Err(PixelpickError::NotRunning);
        }

        self.session.stop_running();
        if let Some(task) = self.delivery_task.take() {
            let _ = task.await;
        }
        self.state = PipelineState::Stopped;

        let stats = self.stats();
        tracing::info!(
            frames_received = stats.frames_received,
            frames_delivered = stats.frames_delivered,
            decode_failures = stats.decode_failures,
            frames_dropped = stats.frames_dropped,
            "Frame pipeline stopped"
        );
        Ok(())
    }

    async fn check_permission(&self) -> bool {
        match self.backend.authorization_status() {
            AuthorizationStatus::Authorized => true,
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => false,
            AuthorizationStatus::NotDetermined => {
                tracing::info!(backend = %self.backend.name(), "Requesting camera access");
                self.backend.request_access().await
            }
        }
    }

    async fn configure_and_start(&mut self) -> PixelpickResult<()> {
        let devices = self.backend.enumerate_devices()?;
        let device = select_device(&devices, self.config.kind, self.config.facing)
            .cloned()
            .ok_or_else(|| PixelpickError::device_not_found(self.config.facing.to_string()))?;
        tracing::info!(device = %device.id, name = %device.name, "Selected capture device");
        self.selected_device = Some(device.clone());

        let input = self.backend.open_input(&device, self.config.preset)?;
        self.session.add_input(input)?;

        let (output, receiver) =
            VideoOutput::channel(self.config.queue_capacity, self.stats.channel_drops.clone());
        self.session.add_output(output)?;

        self.configure_connection(&device);

        self.session.start_running()?;
        self.delivery_task = Some(tokio::spawn(deliver_frames(
            receiver,
            self.registry.clone(),
            self.dispatcher.clone(),
            self.stats.clone(),
        )));
        Ok(())
    }

    /// Apply orientation and mirroring where the connection supports them;
    /// unsupported properties are skipped.
    fn configure_connection(&mut self, device: &pixelpick_platform_core::CameraDescriptor) {
        let orientation = self.config.orientation;
        let mirrored = self.config.facing == CameraFacing::Front;
        let Some(connection) = self.session.connection() else {
            return;
        };

        if connection.supports_orientation() {
            connection.set_orientation(orientation);
        } else {
            tracing::warn!(device = %device.id, "Connection does not support orientation; skipping");
        }

        if connection.supports_mirroring() {
            connection.set_mirrored(mirrored);
        } else {
            tracing::warn!(device = %device.id, "Connection does not support mirroring; skipping");
        }
    }
}

/// Delivery loop: decode each raw frame off the UI thread and dispatch the
/// result to the observer, preserving production order.
async fn deliver_frames(
    mut receiver: RawFrameReceiver,
    registry: Arc<ObserverRegistry>,
    dispatcher: Arc<dyn UiDispatcher>,
    stats: Arc<StatsInner>,
) {
    while let Some(raw) = receiver.recv().await {
        stats.received.fetch_add(1, Ordering::Relaxed);
        match decode_frame(&raw) {
            Ok(bitmap) => {
                let frame = CapturedFrame {
                    sequence: raw.sequence,
                    timestamp_ns: raw.timestamp_ns,
                    bitmap,
                };
                stats.delivered.fetch_add(1, Ordering::Relaxed);
                let registry = registry.clone();
                dispatcher.dispatch(Box::new(move || {
                    registry.notify(frame);
                }));
            }
            Err(e) => {
                stats.decode_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(sequence = raw.sequence, error = %e, "Dropping undecodable frame");
            }
        }
    }
    tracing::debug!("Frame delivery task finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_defaults_parses_known_values() {
        let defaults = CaptureDefaults {
            facing: "front".to_string(),
            preset: "high".to_string(),
            queue_capacity: 7,
        };
        let config = PipelineConfig::from_defaults(&defaults).unwrap();
        assert_eq!(config.facing, CameraFacing::Front);
        assert_eq!(config.preset, ResolutionPreset::High);
        assert_eq!(config.queue_capacity, 7);
    }

    #[test]
    fn config_from_defaults_rejects_unknown_values() {
        let defaults = CaptureDefaults {
            facing: "sideways".to_string(),
            ..CaptureDefaults::default()
        };
        assert!(PipelineConfig::from_defaults(&defaults).is_err());
    }

    #[test]
    fn drop_rate_is_zero_without_traffic() {
        assert_eq!(PipelineStats::default().drop_rate(), 0.0);
    }

    #[test]
    fn drop_rate_accounts_for_channel_drops() {
        let stats = PipelineStats {
            frames_received: 75,
            frames_dropped: 25,
            ..PipelineStats::default()
        };
        assert!((stats.drop_rate() - 25.0).abs() < 1e-9);
    }
}
