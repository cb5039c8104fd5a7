//! Capture session state.
//!
//! A session bundles exactly one camera input and one bound video output.
//! It is created once, configured immediately after creation, and never
//! reconfigured while running; the acceptance guards reject duplicate or
//! incompatible bindings with tagged errors.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use pixelpick_common::error::{PixelpickError, PixelpickResult};
use pixelpick_platform_core::{CameraDescriptor, ResolutionPreset};

use crate::backend::{CameraInput, RawFrame, RawFrameSender, StreamConnection};

/// Receiving half of the raw-frame delivery channel.
pub type RawFrameReceiver = tokio::sync::mpsc::Receiver<RawFrame>;

/// The bound video output: a bounded channel the input delivers into.
pub struct VideoOutput {
    sender: RawFrameSender,
    capacity: usize,
}

impl VideoOutput {
    /// Create an output with its paired receiver. `drop_counter` is bumped
    /// for every frame the channel refuses.
    pub fn channel(capacity: usize, drop_counter: Arc<AtomicU64>) -> (Self, RawFrameReceiver) {
        let (tx, rx) = tokio::sync::mpsc::channel(capacity.max(1));
        (
            Self {
                sender: RawFrameSender::new(tx, drop_counter),
                capacity: capacity.max(1),
            },
            rx,
        )
    }

    pub fn sender(&self) -> RawFrameSender {
        self.sender.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Coordinates the flow of frames from one camera input to one output.
pub struct CaptureSession {
    preset: ResolutionPreset,
    input: Option<Box<dyn CameraInput>>,
    output: Option<VideoOutput>,
    running: bool,
}

impl CaptureSession {
    pub fn new(preset: ResolutionPreset) -> Self {
        Self {
            preset,
            input: None,
            output: None,
            running: false,
        }
    }

    pub fn preset(&self) -> ResolutionPreset {
        self.preset
    }

    /// Whether the session would accept this device as its input.
    pub fn can_add_input(&self, descriptor: &CameraDescriptor) -> bool {
        self.input.is_none() && !self.running && descriptor.supports_video
    }

    /// Bind the input, or reject it when the session already has one, is
    /// running, or the device cannot stream video.
    pub fn add_input(&mut self, input: Box<dyn CameraInput>) -> PixelpickResult<()> {
        if !self.can_add_input(input.descriptor()) {
            return Err(PixelpickError::input_rejected(format!(
                "cannot bind device {}",
                input.descriptor().id
            )));
        }
        self.input = Some(input);
        Ok(())
    }

    pub fn can_add_output(&self) -> bool {
        self.output.is_none() && !self.running
    }

    /// Bind the video output, or reject it when one is already bound.
    pub fn add_output(&mut self, output: VideoOutput) -> PixelpickResult<()> {
        if !self.can_add_output() {
            return Err(PixelpickError::output_rejected(
                "session already has a video output",
            ));
        }
        self.output = Some(output);
        Ok(())
    }

    /// Stream connection of the bound input, for pre-start configuration.
    pub fn connection(&mut self) -> Option<&mut dyn StreamConnection> {
        self.input.as_mut().map(|input| input.connection())
    }

    /// Begin continuous delivery from the input into the output.
    ///
    /// Blocks momentarily while the stream spins up; must not be called on
    /// the UI thread.
    pub fn start_running(&mut self) -> PixelpickResult<()> {
        if self.running {
            return Err(PixelpickError::AlreadyRunning);
        }
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| PixelpickError::backend("session has no input bound"))?;
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| PixelpickError::backend("session has no output bound"))?;

        input.start(output.sender())?;
        self.running = true;
        Ok(())
    }

    /// Stop the input and release the output. The delivery channel closes
    /// once the input's producer has exited.
    pub fn stop_running(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.stop();
        }
        self.output = None;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
