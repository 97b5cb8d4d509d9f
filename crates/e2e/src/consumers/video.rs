//! Video assembler
//!
//! At the end of a test, turns the frames in its screenshot folder into one
//! video: duplicates by content are dropped, survivors are ordered by
//! modification time, resized and encoded.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::{imageops, Rgb, RgbImage};
use lumen_common::{DigestSet, Size, VideoConfig};
use tracing::{debug, info, trace};
use walkdir::WalkDir;

use crate::consumer::Consumer;
use crate::context::ExecutionContext;
use crate::encoder::{EncoderFactory, FfmpegEncoderFactory};
use crate::error::{E2eError, E2eResult};
use crate::event::{Event, EventFilter};

/// Frame encoded when a test produced no screenshots
pub const PLACEHOLDER_PNG: &[u8] = include_bytes!("../../assets/no-video.png");

pub struct VideoConsumer {
    name: String,
    filters: Vec<EventFilter>,
    encoders: Option<Box<dyn EncoderFactory>>,
}

impl VideoConsumer {
    /// Consumer encoding with the binary named in each test's video configuration
    pub fn new(name: impl Into<String>, filters: Vec<EventFilter>) -> Self {
        Self {
            name: name.into(),
            filters,
            encoders: None,
        }
    }

    pub fn with_encoder_factory(mut self, factory: impl EncoderFactory + 'static) -> Self {
        self.encoders = Some(Box::new(factory));
        self
    }

    /// Build the video of the test behind `context`.
    ///
    /// Returns the video path, or `None` when video is disabled.
    pub fn assemble(&self, context: &dyn ExecutionContext) -> E2eResult<Option<PathBuf>> {
        let video = context.video();
        if video.is_disabled() {
            trace!("Video disabled, nothing to assemble");
            return Ok(None);
        }

        let test = context.test_data();
        let frames = collect_frames(&test.screenshot_folder, video.skip_duplicate_frames)?;

        let size = if frames.is_empty() {
            None
        } else {
            Some(target_size(video, || context.window_size())?)
        };

        if let Some(parent) = test.video_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let ffmpeg;
        let factory: &dyn EncoderFactory = match &self.encoders {
            Some(factory) => factory.as_ref(),
            None => {
                ffmpeg = FfmpegEncoderFactory::new(video.encoder.clone());
                &ffmpeg
            }
        };
        let mut encoder = factory.create(&test.video_path, video.fps)?;

        match size {
            None => {
                debug!("No frames for {}, encoding placeholder", test.method_name);
                let placeholder = image::load_from_memory(PLACEHOLDER_PNG)?.to_rgb8();
                let size = Size::new(
                    make_even(placeholder.width()),
                    make_even(placeholder.height()),
                );
                encoder.encode_image(&fit(&placeholder, size))?;
            }
            Some(size) => {
                debug!(
                    "Encoding {} frames at {} for {}",
                    frames.len(),
                    size,
                    test.method_name
                );
                for frame in &frames {
                    let image = image::open(frame)?.to_rgb8();
                    encoder.encode_image(&fit(&image, size))?;
                }
            }
        }

        encoder.finish()?;
        info!("Video of {} saved to {}", test.method_name, test.video_path.display());

        Ok(Some(test.video_path.clone()))
    }
}

impl Consumer for VideoConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn filters(&self) -> &[EventFilter] {
        &self.filters
    }

    fn accept(&self, event: &Event<'_>) -> E2eResult<()> {
        let context = event
            .context
            .ok_or_else(|| E2eError::MissingContext(self.name.clone()))?;

        self.assemble(context).map(|_| ())
    }
}

/// Regular files under `folder`, oldest first.
///
/// With `skip_duplicates`, only the oldest file of each content digest is
/// kept. A missing folder holds no frames.
pub fn collect_frames(folder: &Path, skip_duplicates: bool) -> E2eResult<Vec<PathBuf>> {
    if !folder.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        files.push((modified, entry.into_path()));
    }

    files.sort_by_key(|(modified, _)| *modified);

    // A fresh set per assembly; never shared between tests
    let digests = DigestSet::new();
    let mut frames = Vec::with_capacity(files.len());
    for (_, path) in files {
        if !skip_duplicates || digests.is_new_file(&path)? {
            frames.push(path);
        }
    }

    Ok(frames)
}

/// Output dimensions: the configured ones when both are set, otherwise the
/// live window minus the browser chrome. Always even.
pub fn target_size(
    video: &VideoConfig,
    window_size: impl FnOnce() -> E2eResult<Size>,
) -> E2eResult<Size> {
    let size = if video.width >= 1 && video.height >= 1 {
        Size::new(video.width, video.height)
    } else {
        let window = window_size()?;
        Size::new(
            window.width,
            window.height.saturating_sub(video.menu_bars_height),
        )
    };

    if size.width == 0 || size.height == 0 {
        return Err(lumen_common::Error::InvalidConfig(format!(
            "video size {} is empty (menu bars height {})",
            size, video.menu_bars_height
        ))
        .into());
    }

    Ok(Size::new(make_even(size.width), make_even(size.height)))
}

/// Round odd values up to the next even one. `u32::MAX` rounds down.
pub fn make_even(value: u32) -> u32 {
    if value % 2 == 0 {
        value
    } else {
        value.checked_add(1).unwrap_or(value - 1)
    }
}

/// Scale `frame` down to fit `size` on each axis and place it on a black
/// canvas of exactly `size`
pub fn fit(frame: &RgbImage, size: Size) -> RgbImage {
    let width = size.width.min(frame.width());
    let height = size.height.min(frame.height());

    let mut canvas = RgbImage::from_pixel(size.width, size.height, Rgb([0, 0, 0]));
    if (width, height) == frame.dimensions() {
        imageops::overlay(&mut canvas, frame, 0, 0);
    } else {
        let scaled = imageops::resize(frame, width, height, imageops::FilterType::Triangle);
        imageops::overlay(&mut canvas, &scaled, 0, 0);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 0 ; "zero")]
    #[test_case(600, 600 ; "even")]
    #[test_case(601, 602 ; "odd")]
    #[test_case(1, 2 ; "one")]
    #[test_case(u32::MAX, u32::MAX - 1 ; "max")]
    fn test_make_even(value: u32, expected: u32) {
        assert_eq!(make_even(value), expected);
    }

    #[test]
    fn test_configured_size_wins() {
        let video = VideoConfig {
            width: 641,
            height: 480,
            ..VideoConfig::default()
        };
        let size = target_size(&video, || panic!("window must not be queried")).unwrap();
        assert_eq!(size, Size::new(642, 480));
    }

    #[test]
    fn test_window_size_minus_menu_bars() {
        let video = VideoConfig {
            width: 800,
            height: 0,
            menu_bars_height: 1,
            ..VideoConfig::default()
        };
        let size = target_size(&video, || Ok(Size::new(800, 601))).unwrap();
        assert_eq!(size, Size::new(800, 600));
    }

    #[test]
    fn test_menu_bars_taller_than_window() {
        let video = VideoConfig::default();
        let result = target_size(&video, || Ok(Size::new(300, 20)));
        assert!(matches!(
            result,
            Err(E2eError::Common(lumen_common::Error::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_largest_configured_width_stays_even() {
        let video = VideoConfig {
            width: u32::MAX,
            height: 480,
            ..VideoConfig::default()
        };
        let size = target_size(&video, || panic!("window must not be queried")).unwrap();
        assert_eq!(size, Size::new(u32::MAX - 1, 480));
    }

    #[test]
    fn test_fit_shrinks_larger_frames() {
        let frame = RgbImage::from_pixel(400, 300, Rgb([255, 0, 0]));
        let fitted = fit(&frame, Size::new(200, 100));
        assert_eq!(fitted.dimensions(), (200, 100));
        let Rgb([r, g, b]) = *fitted.get_pixel(199, 99);
        assert!(r > 250 && g < 5 && b < 5);
    }

    #[test]
    fn test_fit_pads_smaller_frames() {
        let frame = RgbImage::from_pixel(10, 10, Rgb([0, 255, 0]));
        let fitted = fit(&frame, Size::new(20, 12));
        assert_eq!(fitted.dimensions(), (20, 12));
        assert_eq!(fitted.get_pixel(5, 5), &Rgb([0, 255, 0]));
        assert_eq!(fitted.get_pixel(15, 11), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_placeholder_has_even_dimensions() {
        let placeholder = image::load_from_memory(PLACEHOLDER_PNG).unwrap();
        assert_eq!(placeholder.width() % 2, 0);
        assert_eq!(placeholder.height() % 2, 0);
    }

    #[test]
    fn test_missing_folder_has_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_frames(&dir.path().join("missing"), true).unwrap().is_empty());
    }
}
