//! Host capability probing.
//!
//! Pixelpick needs a reachable camera device and, for live preview, a
//! graphical session. These checks report status with fix instructions
//! instead of failing silently at capture time.

/// A system capability the capture pipeline may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities and report status.
pub fn check_capabilities() -> Vec<Capability> {
    vec![
        check_camera_device(),
        check_video_group(),
        check_graphical_session(),
    ]
}

/// Check if a camera device node is present.
fn check_camera_device() -> Capability {
    let available = detect_camera_nodes().next().is_some();

    Capability {
        name: "Camera Device".to_string(),
        description: "Video4Linux camera node for frame capture".to_string(),
        available,
        required: true,
        fix_instructions: if available {
            None
        } else {
            Some(
                "Connect a camera and verify /dev/video* exists (v4l2-ctl --list-devices)"
                    .to_string(),
            )
        },
    }
}

/// Check if the user can open video devices directly.
fn check_video_group() -> Capability {
    let in_video_group = std::process::Command::new("groups")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains("video"))
        .unwrap_or(false);

    Capability {
        name: "Video Device Access".to_string(),
        description: "Membership in the 'video' group for direct device access".to_string(),
        available: in_video_group,
        required: false, // some distros grant access via uaccess ACLs
        fix_instructions: if in_video_group {
            None
        } else {
            Some("Add user to video group: sudo usermod -aG video $USER (logout required)".to_string())
        },
    }
}

/// Check for a graphical session to display the preview in.
fn check_graphical_session() -> Capability {
    let available = std::env::var("WAYLAND_DISPLAY").is_ok() || std::env::var("DISPLAY").is_ok();

    Capability {
        name: "Graphical Session".to_string(),
        description: "Display session for the live preview surface".to_string(),
        available,
        required: false, // headless capture still works
        fix_instructions: if available {
            None
        } else {
            Some("Run inside a graphical desktop session to see the preview".to_string())
        },
    }
}

/// Enumerate `/dev/video*` nodes.
pub fn detect_camera_nodes() -> impl Iterator<Item = String> {
    (0..16)
        .map(|idx| format!("/dev/video{idx}"))
        .filter(|path| std::path::Path::new(path).exists())
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("Pixelpick System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_covers_every_check() {
        let capabilities = check_capabilities();
        assert_eq!(capabilities.len(), 3);
        for cap in &capabilities {
            assert!(cap.available || cap.fix_instructions.is_some());
        }
    }
}
