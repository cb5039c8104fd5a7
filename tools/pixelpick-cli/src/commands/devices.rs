//! List camera devices.

use pixelpick_capture_engine::capability::detect_camera_nodes;
use pixelpick_capture_engine::SyntheticBackend;

pub fn run() -> anyhow::Result<()> {
    println!("Synthetic backend devices:");
    for device in SyntheticBackend::default_devices() {
        println!(
            "  {}  {:<24} facing={} kind={:?} video={}",
            device.id, device.name, device.facing, device.kind, device.supports_video
        );
    }

    let nodes: Vec<String> = detect_camera_nodes().collect();
    println!();
    if nodes.is_empty() {
        println!("No host camera nodes under /dev/video*");
    } else {
        println!("Host camera nodes:");
        for node in nodes {
            println!("  {node}");
        }
    }

    Ok(())
}
