//! Pixelpick Capture Engine
//!
//! Orchestrates continuous camera capture into observer-visible bitmaps.
//! The pipeline selects a device through a capability backend, binds a
//! video output, decodes raw frames off the UI thread, and hands each
//! decoded frame to the registered observer on the UI dispatcher.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                  FramePipeline                      │
//! │  ┌─────────────┐  ┌───────────────┐  ┌──────────┐  │
//! │  │ CameraBackend│─▶│ CaptureSession│─▶│ Delivery │  │
//! │  │ (capability) │  │ input+output  │  │   task   │  │
//! │  └─────────────┘  └───────────────┘  └────┬─────┘  │
//! │                                            │decode  │
//! │                                            ▼        │
//! │                                    ┌──────────────┐ │
//! │                                    │ UiDispatcher │ │
//! │                                    │  → observer  │ │
//! │                                    └──────────────┘ │
//! └────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod capability;
pub mod decode;
pub mod dispatch;
pub mod observer;
pub mod pipeline;
pub mod session;

pub use backend::*;
pub use dispatch::*;
pub use observer::*;
pub use pipeline::*;
pub use session::*;
