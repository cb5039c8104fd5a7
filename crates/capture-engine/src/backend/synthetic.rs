//! Synthetic camera backend.
//!
//! A deterministic stand-in for real hardware: scripted permission
//! decisions, a fixed device list, and a producer thread emitting BGRA
//! test-pattern frames. Call counters let tests assert that a denied
//! pipeline never touches a device.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pixelpick_common::clock::CaptureClock;
use pixelpick_common::error::PixelpickResult;
use pixelpick_platform_core::{
    AuthorizationStatus, CameraDescriptor, CameraFacing, DeviceKind, RawPixelFormat,
    ResolutionPreset, VideoOrientation,
};

use super::{CameraBackend, CameraInput, RawFrame, RawFrameSender, StreamConnection};

const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Stream parameters shared between the backend and the inputs it opens.
#[derive(Debug, Clone)]
struct StreamParams {
    frame_interval: Duration,
    /// Stop after this many frames; `None` streams until stopped.
    frame_limit: Option<u64>,
    /// Emit a truncated (undecodable) payload for every k-th frame.
    corrupt_every: Option<u64>,
}

/// A fake camera backend for testing and diagnostics without hardware.
pub struct SyntheticBackend {
    authorization: Mutex<AuthorizationStatus>,
    grant_on_request: bool,
    devices: Vec<CameraDescriptor>,
    params: StreamParams,
    access_requests: AtomicU64,
    inputs_opened: AtomicU64,
}

impl SyntheticBackend {
    /// An authorized backend with the default device list.
    pub fn new() -> Self {
        Self {
            authorization: Mutex::new(AuthorizationStatus::Authorized),
            grant_on_request: true,
            devices: Self::default_devices(),
            params: StreamParams {
                frame_interval: DEFAULT_FRAME_INTERVAL,
                frame_limit: None,
                corrupt_every: None,
            },
            access_requests: AtomicU64::new(0),
            inputs_opened: AtomicU64::new(0),
        }
    }

    /// Back and front wide-angle cameras plus a back telephoto, in the
    /// order a real enumeration would list them.
    pub fn default_devices() -> Vec<CameraDescriptor> {
        vec![
            CameraDescriptor {
                id: "synthetic:back-tele".to_string(),
                name: "Synthetic Telephoto".to_string(),
                facing: CameraFacing::Back,
                kind: DeviceKind::Telephoto,
                supports_video: true,
            },
            CameraDescriptor {
                id: "synthetic:back-wide".to_string(),
                name: "Synthetic Back Camera".to_string(),
                facing: CameraFacing::Back,
                kind: DeviceKind::WideAngle,
                supports_video: true,
            },
            CameraDescriptor {
                id: "synthetic:front-wide".to_string(),
                name: "Synthetic Front Camera".to_string(),
                facing: CameraFacing::Front,
                kind: DeviceKind::WideAngle,
                supports_video: true,
            },
        ]
    }

    /// Replace the device list.
    pub fn with_devices(mut self, devices: Vec<CameraDescriptor>) -> Self {
        self.devices = devices;
        self
    }

    /// Start in the `Denied` state.
    pub fn denied(mut self) -> Self {
        *self.authorization.get_mut().unwrap() = AuthorizationStatus::Denied;
        self
    }

    /// Start in `NotDetermined`; `grant` scripts the prompt outcome.
    pub fn undetermined(mut self, grant: bool) -> Self {
        *self.authorization.get_mut().unwrap() = AuthorizationStatus::NotDetermined;
        self.grant_on_request = grant;
        self
    }

    /// Pace of the producer thread.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.params.frame_interval = interval;
        self
    }

    /// Stop streaming after `limit` frames.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.params.frame_limit = Some(limit);
        self
    }

    /// Emit an undecodable payload for every `k`-th frame (1-based).
    pub fn with_corrupt_every(mut self, k: u64) -> Self {
        self.params.corrupt_every = Some(k.max(1));
        self
    }

    /// How many times the access prompt was presented.
    pub fn access_request_calls(&self) -> u64 {
        self.access_requests.load(Ordering::Relaxed)
    }

    /// How many inputs were opened. Stays zero for a denied pipeline.
    pub fn inputs_opened(&self) -> u64 {
        self.inputs_opened.load(Ordering::Relaxed)
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CameraBackend for SyntheticBackend {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        *self.authorization.lock().unwrap()
    }

    async fn request_access(&self) -> bool {
        self.access_requests.fetch_add(1, Ordering::Relaxed);
        // Let the prompt resolve on a later poll, like a real dialog.
        tokio::task::yield_now().await;
        let decided = if self.grant_on_request {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        *self.authorization.lock().unwrap() = decided;
        self.grant_on_request
    }

    fn enumerate_devices(&self) -> PixelpickResult<Vec<CameraDescriptor>> {
        Ok(self.devices.clone())
    }

    fn open_input(
        &self,
        device: &CameraDescriptor,
        preset: ResolutionPreset,
    ) -> PixelpickResult<Box<dyn CameraInput>> {
        self.inputs_opened.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(SyntheticInput::new(
            device.clone(),
            preset,
            self.params.clone(),
        )))
    }
}

/// Connection of a synthetic input: supports both orientation and
/// mirroring and records what was applied.
#[derive(Debug)]
pub struct SyntheticConnection {
    orientation: VideoOrientation,
    mirrored: bool,
}

impl StreamConnection for SyntheticConnection {
    fn supports_orientation(&self) -> bool {
        true
    }

    fn set_orientation(&mut self, orientation: VideoOrientation) {
        self.orientation = orientation;
    }

    fn orientation(&self) -> VideoOrientation {
        self.orientation
    }

    fn supports_mirroring(&self) -> bool {
        true
    }

    fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    fn is_mirrored(&self) -> bool {
        self.mirrored
    }
}

struct SyntheticInput {
    descriptor: CameraDescriptor,
    preset: ResolutionPreset,
    params: StreamParams,
    connection: SyntheticConnection,
    stop: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl SyntheticInput {
    fn new(descriptor: CameraDescriptor, preset: ResolutionPreset, params: StreamParams) -> Self {
        Self {
            descriptor,
            preset,
            params,
            connection: SyntheticConnection {
                orientation: VideoOrientation::LandscapeRight,
                mirrored: false,
            },
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

impl CameraInput for SyntheticInput {
    fn descriptor(&self) -> &CameraDescriptor {
        &self.descriptor
    }

    fn connection(&mut self) -> &mut dyn StreamConnection {
        &mut self.connection
    }

    fn start(&mut self, sink: RawFrameSender) -> PixelpickResult<()> {
        let (width, height) = self.preset.dimensions();
        let params = self.params.clone();
        let stop = self.stop.clone();
        let device = self.descriptor.id.clone();

        let worker = std::thread::Builder::new()
            .name(format!("synthetic-camera-{device}"))
            .spawn(move || {
                let clock = CaptureClock::start();
                let mut sequence = 0u64;
                loop {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    if let Some(limit) = params.frame_limit {
                        if sequence >= limit {
                            break;
                        }
                    }

                    let corrupt = params
                        .corrupt_every
                        .map(|k| (sequence + 1) % k == 0)
                        .unwrap_or(false);
                    let frame = if corrupt {
                        truncated_frame(sequence, clock.elapsed_ns(), width, height)
                    } else {
                        test_pattern_frame(sequence, clock.elapsed_ns(), width, height)
                    };

                    sink.deliver(frame);
                    sequence += 1;
                    std::thread::sleep(params.frame_interval);
                }
                tracing::debug!(device = %device, frames = sequence, "Synthetic stream finished");
            })?;

        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SyntheticInput {
    fn drop(&mut self) {
        CameraInput::stop(self);
    }
}

/// BGRA gradient pattern: blue rises along x, green along y, and the red
/// channel carries the low byte of the sequence so every frame differs.
fn test_pattern_frame(sequence: u64, timestamp_ns: u64, width: u32, height: u32) -> RawFrame {
    let mut data = vec![0u8; width as usize * height as usize * 4];
    for y in 0..height as usize {
        for x in 0..width as usize {
            let i = (y * width as usize + x) * 4;
            data[i] = (x * 255 / width.max(1) as usize) as u8;
            data[i + 1] = (y * 255 / height.max(1) as usize) as u8;
            data[i + 2] = (sequence % 256) as u8;
            data[i + 3] = 255;
        }
    }
    RawFrame {
        sequence,
        timestamp_ns,
        format: RawPixelFormat::Bgra8,
        width,
        height,
        bytes_per_row: width as usize * 4,
        data,
    }
}

/// A frame whose payload is shorter than its geometry claims.
fn truncated_frame(sequence: u64, timestamp_ns: u64, width: u32, height: u32) -> RawFrame {
    RawFrame {
        sequence,
        timestamp_ns,
        format: RawPixelFormat::Bgra8,
        width,
        height,
        bytes_per_row: width as usize * 4,
        data: vec![0u8; 8],
    }
}
