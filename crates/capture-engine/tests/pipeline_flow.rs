//! End-to-end pipeline flow against the synthetic backend.

use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Duration;

use pixelpick_capture_engine::{
    CapturedFrame, FrameObserver, FramePipeline, PipelineConfig, PipelineState, QueueDispatcher,
    SyntheticBackend,
};
use pixelpick_common::error::PixelpickError;
use pixelpick_platform_core::{CameraDescriptor, CameraFacing, DeviceKind};

struct RecordingObserver {
    frames: Mutex<Vec<(u64, ThreadId)>>,
}

impl RecordingObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            frames: Mutex::new(Vec::new()),
        })
    }

    fn sequences(&self) -> Vec<u64> {
        self.frames.lock().unwrap().iter().map(|f| f.0).collect()
    }

    fn threads(&self) -> Vec<ThreadId> {
        self.frames.lock().unwrap().iter().map(|f| f.1).collect()
    }
}

impl FrameObserver for RecordingObserver {
    fn frame_ready(&self, frame: CapturedFrame) {
        self.frames
            .lock()
            .unwrap()
            .push((frame.sequence, std::thread::current().id()));
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn fast_backend() -> SyntheticBackend {
    SyntheticBackend::new().with_frame_interval(Duration::from_millis(1))
}

#[tokio::test]
async fn denied_permission_skips_configuration_entirely() {
    let backend = Arc::new(SyntheticBackend::new().denied());
    let (dispatcher, _queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(
        backend.clone(),
        Arc::new(dispatcher),
        PipelineConfig::default(),
    );

    let err = pipeline.start().await.unwrap_err();
    assert!(matches!(err, PixelpickError::PermissionDenied));
    assert_eq!(pipeline.state(), PipelineState::Denied);

    // No prompt for an already-decided status, and zero device bindings.
    assert_eq!(backend.access_request_calls(), 0);
    assert_eq!(backend.inputs_opened(), 0);
}

#[tokio::test]
async fn refused_prompt_counts_as_denied() {
    let backend = Arc::new(SyntheticBackend::new().undetermined(false));
    let (dispatcher, _queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(
        backend.clone(),
        Arc::new(dispatcher),
        PipelineConfig::default(),
    );

    let err = pipeline.start().await.unwrap_err();
    assert!(matches!(err, PixelpickError::PermissionDenied));
    assert_eq!(backend.access_request_calls(), 1);
    assert_eq!(backend.inputs_opened(), 0);
}

#[tokio::test]
async fn granted_prompt_configures_and_runs() {
    let backend = Arc::new(fast_backend().undetermined(true).with_frame_limit(1));
    let (dispatcher, _queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(
        backend.clone(),
        Arc::new(dispatcher),
        PipelineConfig::default(),
    );

    pipeline.start().await.unwrap();
    assert_eq!(pipeline.state(), PipelineState::Running);
    assert_eq!(backend.access_request_calls(), 1);
    assert_eq!(backend.inputs_opened(), 1);
    assert_eq!(
        pipeline.selected_device().map(|d| d.id.as_str()),
        Some("synthetic:back-wide")
    );

    pipeline.stop().await.unwrap();
    assert_eq!(pipeline.state(), PipelineState::Stopped);
}

#[tokio::test]
async fn frames_arrive_in_order_on_the_dispatcher_thread() {
    let backend = Arc::new(fast_backend().with_frame_limit(10));
    let (dispatcher, mut queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(
        backend,
        Arc::new(dispatcher),
        PipelineConfig {
            queue_capacity: 32,
            ..PipelineConfig::default()
        },
    );

    let observer = RecordingObserver::new();
    let _sub = pipeline.subscribe(observer.clone()).unwrap();

    pipeline.start().await.unwrap();
    wait_until(|| pipeline.stats().frames_delivered == 10).await;
    pipeline.stop().await.unwrap();

    assert_eq!(queue.drain(), 10);
    assert_eq!(observer.sequences(), (0..10).collect::<Vec<_>>());

    let ui_thread = std::thread::current().id();
    assert!(observer.threads().iter().all(|t| *t == ui_thread));
}

#[tokio::test]
async fn corrupt_frames_are_skipped_without_breaking_the_stream() {
    // Every 3rd frame carries a truncated payload: sequences 2 and 5.
    let backend = Arc::new(fast_backend().with_frame_limit(6).with_corrupt_every(3));
    let (dispatcher, mut queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(
        backend,
        Arc::new(dispatcher),
        PipelineConfig {
            queue_capacity: 32,
            ..PipelineConfig::default()
        },
    );

    let observer = RecordingObserver::new();
    let _sub = pipeline.subscribe(observer.clone()).unwrap();

    pipeline.start().await.unwrap();
    wait_until(|| pipeline.stats().frames_received == 6).await;
    pipeline.stop().await.unwrap();

    let stats = pipeline.stats();
    assert_eq!(stats.decode_failures, 2);
    assert_eq!(stats.frames_delivered, 4);

    queue.drain();
    assert_eq!(observer.sequences(), vec![0, 1, 3, 4]);
}

#[tokio::test]
async fn missing_device_aborts_without_side_effects() {
    let front_only = vec![CameraDescriptor {
        id: "synthetic:front-wide".to_string(),
        name: "Synthetic Front Camera".to_string(),
        facing: CameraFacing::Front,
        kind: DeviceKind::WideAngle,
        supports_video: true,
    }];
    let backend = Arc::new(SyntheticBackend::new().with_devices(front_only));
    let (dispatcher, _queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(
        backend.clone(),
        Arc::new(dispatcher),
        PipelineConfig::default(),
    );

    let err = pipeline.start().await.unwrap_err();
    assert!(matches!(err, PixelpickError::DeviceNotFound { .. }));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(backend.inputs_opened(), 0);
}

#[tokio::test]
async fn front_facing_config_selects_the_front_camera() {
    let backend = Arc::new(fast_backend().with_frame_limit(1));
    let (dispatcher, _queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(
        backend,
        Arc::new(dispatcher),
        PipelineConfig {
            facing: CameraFacing::Front,
            ..PipelineConfig::default()
        },
    );

    pipeline.start().await.unwrap();
    assert_eq!(
        pipeline.selected_device().map(|d| d.id.as_str()),
        Some("synthetic:front-wide")
    );
    pipeline.stop().await.unwrap();
}

#[tokio::test]
async fn second_observer_is_rejected_until_the_first_unsubscribes() {
    let backend = Arc::new(fast_backend().with_frame_limit(1));
    let (dispatcher, _queue) = QueueDispatcher::new();
    let pipeline = FramePipeline::new(backend, Arc::new(dispatcher), PipelineConfig::default());

    let first = RecordingObserver::new();
    let second = RecordingObserver::new();

    let sub = pipeline.subscribe(first.clone()).unwrap();
    assert!(matches!(
        pipeline.subscribe(second.clone()).unwrap_err(),
        PixelpickError::ObserverAlreadyRegistered
    ));

    sub.unsubscribe();
    pipeline.subscribe(second).unwrap();
}

#[tokio::test]
async fn stop_before_start_is_an_error() {
    let backend = Arc::new(SyntheticBackend::new());
    let (dispatcher, _queue) = QueueDispatcher::new();
    let mut pipeline = FramePipeline::new(backend, Arc::new(dispatcher), PipelineConfig::default());

    assert!(matches!(
        pipeline.stop().await.unwrap_err(),
        PixelpickError::NotRunning
    ));
}
