//! Capture one frame and sample the pixel under a point.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pixelpick_capture_engine::{
    CapturedFrame, FrameObserver, FramePipeline, PipelineConfig, QueueDispatcher, SyntheticBackend,
};
use pixelpick_common::config::AppConfig;
use pixelpick_platform_core::{Bitmap, Point};
use pixelpick_sampler::{sample_color, BitmapSurface};

#[derive(Default)]
struct LatestFrame {
    bitmap: Mutex<Option<Bitmap>>,
}

impl FrameObserver for LatestFrame {
    fn frame_ready(&self, frame: CapturedFrame) {
        *self.bitmap.lock().unwrap() = Some(frame.bitmap);
    }
}

pub async fn run(x: f64, y: f64, preset: String) -> anyhow::Result<()> {
    let mut defaults = AppConfig::load().capture;
    defaults.preset = preset;
    let config = PipelineConfig::from_defaults(&defaults)?;

    let backend = Arc::new(
        SyntheticBackend::new()
            .with_frame_limit(1)
            .with_frame_interval(Duration::from_millis(1)),
    );
    let (dispatcher, mut queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(backend, Arc::new(dispatcher), config);

    let observer = Arc::new(LatestFrame::default());
    let _subscription = pipeline.subscribe(observer.clone())?;

    pipeline.start().await?;
    while observer.bitmap.lock().unwrap().is_none() {
        if !queue.run_one().await {
            break;
        }
    }
    pipeline.stop().await?;

    let bitmap = observer
        .bitmap
        .lock()
        .unwrap()
        .take()
        .ok_or_else(|| anyhow::anyhow!("no frame was delivered"))?;

    let surface = BitmapSurface::new(bitmap);
    let color = sample_color(Point::new(x, y), &surface)?;
    let [r, g, b, a] = color.to_normalized();

    println!(
        "Sampled ({x}, {y}): rgba({}, {}, {}, {})",
        color.r, color.g, color.b, color.a
    );
    println!("Normalized: [{r:.4}, {g:.4}, {b:.4}, {a:.4}]");

    Ok(())
}
