//! Stream synthetic frames through the capture pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pixelpick_capture_engine::{
    CapturedFrame, FrameObserver, FramePipeline, PipelineConfig, QueueDispatcher, SyntheticBackend,
};
use pixelpick_common::config::AppConfig;

struct PreviewObserver {
    delivered: AtomicU64,
}

impl FrameObserver for PreviewObserver {
    fn frame_ready(&self, frame: CapturedFrame) {
        let n = self.delivered.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 10 == 0 {
            println!(
                "  frame {:>4}  {}x{}",
                frame.sequence,
                frame.bitmap.width(),
                frame.bitmap.height()
            );
        }
    }
}

pub async fn run(frames: u64, fps: u32, facing: String, preset: String) -> anyhow::Result<()> {
    println!("Previewing {frames} synthetic frames at {fps} fps");
    println!();

    let mut defaults = AppConfig::load().capture;
    defaults.facing = facing;
    defaults.preset = preset;
    let config = PipelineConfig::from_defaults(&defaults)?;

    let interval = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let backend = Arc::new(
        SyntheticBackend::new()
            .with_frame_limit(frames)
            .with_frame_interval(interval),
    );
    let (dispatcher, mut queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(backend, Arc::new(dispatcher), config);

    let observer = Arc::new(PreviewObserver {
        delivered: AtomicU64::new(0),
    });
    let _subscription = pipeline.subscribe(observer.clone())?;

    pipeline.start().await?;
    if let Some(device) = pipeline.selected_device() {
        println!("Capturing from {} ({})", device.name, device.id);
    }

    // This task plays the UI thread: observer callbacks run here.
    while observer.delivered.load(Ordering::Relaxed) < frames {
        if !queue.run_one().await {
            break;
        }
    }

    pipeline.stop().await?;
    queue.drain();

    let stats = pipeline.stats();
    println!();
    println!("Frames received:  {}", stats.frames_received);
    println!("Frames delivered: {}", stats.frames_delivered);
    println!("Decode failures:  {}", stats.decode_failures);
    println!(
        "Channel drops:    {} ({:.1}%)",
        stats.frames_dropped,
        stats.drop_rate()
    );

    Ok(())
}
