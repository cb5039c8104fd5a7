//! Camera device contracts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the device a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
    External,
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFacing::Back => write!(f, "back"),
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::External => write!(f, "external"),
        }
    }
}

/// Optical class of a camera device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    #[default]
    WideAngle,
    UltraWide,
    Telephoto,
    Depth,
}

/// Current state of the camera-access authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// The user granted access.
    Authorized,
    /// The user denied access.
    Denied,
    /// Access is blocked by policy; the user cannot change it.
    Restricted,
    /// The user has not been asked yet.
    NotDetermined,
}

/// Capture resolution tier requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl ResolutionPreset {
    /// Nominal frame dimensions for the preset.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ResolutionPreset::Low => (320, 240),
            ResolutionPreset::Medium => (640, 480),
            ResolutionPreset::High => (1280, 720),
        }
    }
}

/// Orientation applied to frames on a stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Description of a discoverable camera device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    /// Stable device identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Which way the camera faces.
    pub facing: CameraFacing,
    /// Optical class.
    pub kind: DeviceKind,
    /// Whether the device can produce a continuous video stream.
    pub supports_video: bool,
}

impl CameraDescriptor {
    /// Whether this device satisfies a {kind, facing, video} requirement.
    pub fn matches(&self, kind: DeviceKind, facing: CameraFacing) -> bool {
        self.kind == kind && self.facing == facing && self.supports_video
    }
}

/// Select the capture device for a requirement: the first device in
/// enumeration order matching {kind, facing, video-capable}.
pub fn select_device(
    devices: &[CameraDescriptor],
    kind: DeviceKind,
    facing: CameraFacing,
) -> Option<&CameraDescriptor> {
    devices.iter().find(|d| d.matches(kind, facing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, facing: CameraFacing, kind: DeviceKind, video: bool) -> CameraDescriptor {
        CameraDescriptor {
            id: id.to_string(),
            name: format!("Camera {id}"),
            facing,
            kind,
            supports_video: video,
        }
    }

    #[test]
    fn selection_takes_first_match_in_enumeration_order() {
        let devices = vec![
            descriptor("tele-0", CameraFacing::Back, DeviceKind::Telephoto, true),
            descriptor("wide-0", CameraFacing::Back, DeviceKind::WideAngle, true),
            descriptor("wide-1", CameraFacing::Back, DeviceKind::WideAngle, true),
        ];

        let selected = select_device(&devices, DeviceKind::WideAngle, CameraFacing::Back).unwrap();
        assert_eq!(selected.id, "wide-0");
    }

    #[test]
    fn selection_skips_non_video_devices() {
        let devices = vec![
            descriptor("wide-still", CameraFacing::Back, DeviceKind::WideAngle, false),
            descriptor("wide-video", CameraFacing::Back, DeviceKind::WideAngle, true),
        ];

        let selected = select_device(&devices, DeviceKind::WideAngle, CameraFacing::Back).unwrap();
        assert_eq!(selected.id, "wide-video");
    }

    #[test]
    fn selection_respects_facing() {
        let devices = vec![descriptor(
            "front-0",
            CameraFacing::Front,
            DeviceKind::WideAngle,
            true,
        )];

        assert!(select_device(&devices, DeviceKind::WideAngle, CameraFacing::Back).is_none());
        assert!(select_device(&devices, DeviceKind::WideAngle, CameraFacing::Front).is_some());
    }

    #[test]
    fn preset_dimensions_grow_with_tier() {
        let (lw, lh) = ResolutionPreset::Low.dimensions();
        let (mw, mh) = ResolutionPreset::Medium.dimensions();
        let (hw, hh) = ResolutionPreset::High.dimensions();
        assert!(lw < mw && mw < hw);
        assert!(lh < mh && mh < hh);
    }
}
