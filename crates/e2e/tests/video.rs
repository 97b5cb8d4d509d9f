//! Video assembly tests
//!
//! Builds screenshot folders on disk and assembles them with an in-memory
//! encoder.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use image::{Rgb, RgbImage};
use lumen_common::{FrameKind, Outcome, Size, VideoConfig, AFTER, TEST};
use lumen_e2e::consumers::collect_frames;
use lumen_e2e::{
    Dispatcher, E2eError, E2eResult, EncoderFactory, Event, EventFilter, InMemoryReport,
    LogConsumer, TestContext, TestData, VideoConsumer, VideoEncoder, WindowSize,
};
use parking_lot::Mutex;
use tempfile::TempDir;

const RED: Rgb<u8> = Rgb([200, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 200]);

#[derive(Clone, Default)]
struct Encoded {
    frames: Arc<Mutex<Vec<RgbImage>>>,
    outputs: Arc<Mutex<Vec<PathBuf>>>,
    finished: Arc<AtomicBool>,
}

struct MemoryEncoderFactory(Encoded);

struct MemoryEncoder(Encoded);

impl EncoderFactory for MemoryEncoderFactory {
    fn create(&self, output: &Path, _fps: u32) -> E2eResult<Box<dyn VideoEncoder>> {
        self.0.outputs.lock().push(output.to_path_buf());
        Ok(Box::new(MemoryEncoder(self.0.clone())))
    }
}

impl VideoEncoder for MemoryEncoder {
    fn encode_image(&mut self, frame: &RgbImage) -> E2eResult<()> {
        self.0.frames.lock().push(frame.clone());
        Ok(())
    }

    fn finish(self: Box<Self>) -> E2eResult<()> {
        self.0.finished.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct BrokenEncoderFactory;

impl EncoderFactory for BrokenEncoderFactory {
    fn create(&self, _output: &Path, _fps: u32) -> E2eResult<Box<dyn VideoEncoder>> {
        Err(E2eError::Encoder("codec unavailable".to_string()))
    }
}

struct FixedWindow(Size);

impl WindowSize for FixedWindow {
    fn current_window_size(&self) -> E2eResult<Size> {
        Ok(self.0)
    }
}

fn write_frame(folder: &Path, name: &str, color: Rgb<u8>, offset_secs: u64) -> PathBuf {
    std::fs::create_dir_all(folder).unwrap();
    let path = folder.join(name);
    RgbImage::from_pixel(64, 48, color).save(&path).unwrap();

    let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + offset_secs);
    File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
    path
}

fn video(width: u32, height: u32) -> VideoConfig {
    VideoConfig {
        frames: vec![FrameKind::AutoBefore, FrameKind::AutoAfter],
        width,
        height,
        ..VideoConfig::default()
    }
}

fn test_data(root: &TempDir) -> TestData {
    TestData::new(root.path(), "CheckoutIT", "pay")
}

fn context<'a>(test: TestData, video: VideoConfig) -> TestContext<'a> {
    TestContext::new(test, video, Arc::new(InMemoryReport::new()))
}

fn consumer(encoded: &Encoded) -> VideoConsumer {
    VideoConsumer::new("video", Vec::new())
        .with_encoder_factory(MemoryEncoderFactory(encoded.clone()))
}

#[test]
fn duplicate_frames_are_dropped_and_survivors_follow_mtime() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    let first_a = write_frame(&test.screenshot_folder, "z-first.png", RED, 0);
    let _second_a = write_frame(&test.screenshot_folder, "a-second.png", RED, 1);
    let b = write_frame(&test.screenshot_folder, "m-third.png", BLUE, 2);

    assert_eq!(
        collect_frames(&test.screenshot_folder, true).unwrap(),
        vec![first_a, b]
    );

    let encoded = Encoded::default();
    let video_path = consumer(&encoded)
        .assemble(&context(test.clone(), video(64, 48)))
        .unwrap();

    assert_eq!(video_path, Some(test.video_path.clone()));
    assert_eq!(encoded.outputs.lock().as_slice(), &[test.video_path]);
    assert!(encoded.finished.load(Ordering::SeqCst));

    let frames = encoded.frames.lock();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].dimensions(), (64, 48));
    assert_eq!(frames[0].get_pixel(20, 15), &RED);
    assert_eq!(frames[1].get_pixel(20, 15), &BLUE);
}

#[test]
fn duplicates_are_kept_when_skipping_is_off() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    write_frame(&test.screenshot_folder, "a.png", RED, 0);
    write_frame(&test.screenshot_folder, "b.png", RED, 1);
    write_frame(&test.screenshot_folder, "c.png", BLUE, 2);

    let encoded = Encoded::default();
    let config = VideoConfig {
        skip_duplicate_frames: false,
        ..video(64, 48)
    };
    consumer(&encoded).assemble(&context(test, config)).unwrap();

    assert_eq!(encoded.frames.lock().len(), 3);
}

#[test]
fn empty_folder_encodes_single_placeholder() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    test.create_folders().unwrap();

    let encoded = Encoded::default();
    consumer(&encoded).assemble(&context(test, video(0, 0))).unwrap();

    let frames = encoded.frames.lock();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].dimensions(), (320, 180));
    assert!(encoded.finished.load(Ordering::SeqCst));
}

#[test]
fn size_comes_from_window_minus_menu_bars() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    write_frame(&test.screenshot_folder, "frame.png", BLUE, 0);

    let window = FixedWindow(Size::new(800, 601));
    let config = VideoConfig {
        menu_bars_height: 1,
        ..video(0, 0)
    };
    let context = context(test, config).with_window(&window);

    let encoded = Encoded::default();
    consumer(&encoded).assemble(&context).unwrap();

    let frames = encoded.frames.lock();
    assert_eq!(frames[0].dimensions(), (800, 600));
    // smaller frames are not upscaled
    assert_eq!(frames[0].get_pixel(10, 10), &BLUE);
    assert_eq!(frames[0].get_pixel(100, 100), &Rgb([0, 0, 0]));
}

#[test]
fn odd_configured_size_is_made_even() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    write_frame(&test.screenshot_folder, "frame.png", RED, 0);

    let encoded = Encoded::default();
    consumer(&encoded).assemble(&context(test, video(33, 21))).unwrap();

    assert_eq!(encoded.frames.lock()[0].dimensions(), (34, 22));
}

#[test]
fn disabled_video_produces_nothing() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    write_frame(&test.screenshot_folder, "frame.png", RED, 0);

    let encoded = Encoded::default();
    let outcome = consumer(&encoded)
        .assemble(&context(test, VideoConfig::default()))
        .unwrap();

    assert_eq!(outcome, None);
    assert!(encoded.outputs.lock().is_empty());
}

#[test]
fn missing_window_fails_only_the_video() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    write_frame(&test.screenshot_folder, "frame.png", RED, 0);

    let encoded = Encoded::default();
    let outcome = consumer(&encoded).assemble(&context(test, video(0, 0)));

    assert!(matches!(outcome, Err(E2eError::Driver(_))));
}

#[test]
fn test_end_event_triggers_assembly() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    write_frame(&test.screenshot_folder, "frame.png", RED, 0);

    let encoded = Encoded::default();
    let after_test = vec![EventFilter::builder()
        .reason(AFTER)
        .tags([TEST])
        .build()
        .unwrap()];
    let dispatcher = Dispatcher::new().with_consumer(
        VideoConsumer::new("video", after_test)
            .with_encoder_factory(MemoryEncoderFactory(encoded.clone())),
    );

    let context = context(test, video(64, 48));
    let event = Event::builder()
        .primary_id("CheckoutIT")
        .secondary_id("pay")
        .reason(AFTER)
        .tags([TEST])
        .result(Outcome::Successful)
        .context(&context)
        .build();

    let report = dispatcher.dispatch(&event);

    assert!(report.is_clean());
    assert_eq!(report.count_for("video"), 1);
    assert_eq!(encoded.frames.lock().len(), 1);
}

#[test]
fn encoder_failure_is_isolated_to_the_video_consumer() {
    let root = tempfile::tempdir().unwrap();
    let test = test_data(&root);
    write_frame(&test.screenshot_folder, "frame.png", RED, 0);

    let after_test = || {
        vec![EventFilter::builder()
            .reason(AFTER)
            .tags([TEST])
            .build()
            .unwrap()]
    };
    let dispatcher = Dispatcher::new()
        .with_consumer(
            VideoConsumer::new("video", after_test()).with_encoder_factory(BrokenEncoderFactory),
        )
        .with_consumer(LogConsumer::new("log", after_test()));

    let context = context(test, video(64, 48));
    let event = Event::builder()
        .reason(AFTER)
        .tags([TEST])
        .context(&context)
        .build();

    let report = dispatcher.dispatch(&event);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].consumer, "video");
    assert_eq!(
        failures[0].outcome,
        Err("Encoder error: codec unavailable".to_string())
    );
    assert_eq!(report.count_for("log"), 1);
}
