//! Capability interfaces for camera capture.
//!
//! The pipeline never talks to camera hardware directly. A `CameraBackend`
//! stands in for the platform capture framework: it answers authorization
//! queries, enumerates devices, and opens inputs. Inputs deliver raw frames
//! into a bounded channel owned by the capture session's video output.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pixelpick_common::error::PixelpickResult;
use pixelpick_platform_core::{
    AuthorizationStatus, CameraDescriptor, RawPixelFormat, ResolutionPreset, VideoOrientation,
};

pub mod synthetic;

pub use synthetic::SyntheticBackend;

/// One raw frame as produced by a camera input, before decoding.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Monotonically increasing per-stream counter.
    pub sequence: u64,
    /// Nanoseconds since the stream's capture clock epoch.
    pub timestamp_ns: u64,
    /// Pixel layout of `data`.
    pub format: RawPixelFormat,
    pub width: u32,
    pub height: u32,
    /// Stride of the first plane in bytes (>= the packed row width).
    pub bytes_per_row: usize,
    pub data: Vec<u8>,
}

/// Sending side of the raw-frame delivery channel.
///
/// Delivery never blocks the producer: when the channel is full the frame
/// is dropped and counted, mirroring the frame-dropping a capture driver
/// performs when a consumer falls behind.
#[derive(Clone)]
pub struct RawFrameSender {
    tx: tokio::sync::mpsc::Sender<RawFrame>,
    dropped: Arc<AtomicU64>,
}

impl RawFrameSender {
    pub(crate) fn new(tx: tokio::sync::mpsc::Sender<RawFrame>, dropped: Arc<AtomicU64>) -> Self {
        Self { tx, dropped }
    }

    /// Offer a frame to the pipeline. Returns `false` when the frame was
    /// dropped (channel full or closed).
    pub fn deliver(&self, frame: RawFrame) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Frames dropped at the channel boundary so far.
    pub fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Abstract interface to the platform camera framework.
#[async_trait::async_trait]
pub trait CameraBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Current authorization state for camera access.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Present the access prompt and resolve with the user's decision.
    ///
    /// Only called when the status is `NotDetermined`; the caller awaits
    /// this one-shot decision before touching any device.
    async fn request_access(&self) -> bool;

    /// Enumerate connected camera devices, in stable order.
    fn enumerate_devices(&self) -> PixelpickResult<Vec<CameraDescriptor>>;

    /// Open a device for continuous capture at the given preset.
    fn open_input(
        &self,
        device: &CameraDescriptor,
        preset: ResolutionPreset,
    ) -> PixelpickResult<Box<dyn CameraInput>>;
}

/// An opened camera device, ready to stream.
pub trait CameraInput: Send {
    /// The device this input was opened from.
    fn descriptor(&self) -> &CameraDescriptor;

    /// The stream connection whose properties can be configured before
    /// starting.
    fn connection(&mut self) -> &mut dyn StreamConnection;

    /// Begin continuous delivery into the sender. Runs the producer on a
    /// context owned by the input; may block momentarily while the stream
    /// spins up.
    fn start(&mut self, sink: RawFrameSender) -> PixelpickResult<()>;

    /// Stop delivery. Idempotent.
    fn stop(&mut self);
}

/// Per-connection frame properties. Support is queried before each write;
/// an unsupported property is skipped by the pipeline.
pub trait StreamConnection: Send {
    fn supports_orientation(&self) -> bool;
    fn set_orientation(&mut self, orientation: VideoOrientation);
    fn orientation(&self) -> VideoOrientation;

    fn supports_mirroring(&self) -> bool;
    fn set_mirrored(&mut self, mirrored: bool);
    fn is_mirrored(&self) -> bool;
}
