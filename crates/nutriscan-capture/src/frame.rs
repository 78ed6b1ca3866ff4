//! Frame sources for the live session.
//!
//! A camera is just a [`FrameSource`] that never runs dry. No camera driver
//! ships here: callers wrap their device in a [`FrameSource`] impl and pass it
//! to [`LiveSession::new`](crate::LiveSession::new). The bundled
//! [`ImageSequenceSource`] replays a directory of still images, which is how
//! captures recorded elsewhere are fed through the same pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use nutriscan_barcode::{has_supported_extension, open_image};
use tracing::{debug, info};

use crate::error::CaptureError;

/// A producer of video frames.
pub trait FrameSource: Send {
    /// Reads the next frame.
    ///
    /// `Ok(None)` means the source is exhausted and will produce nothing
    /// more.
    ///
    /// # Errors
    ///
    /// [`CaptureError::FrameRead`] when this one frame could not be read. The
    /// source stays usable and the caller may read again.
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, CaptureError>;

    /// Releases the underlying device. Called exactly once by
    /// [`CaptureDevice`].
    fn release(&mut self) {}
}

impl<F: FrameSource + ?Sized> FrameSource for Box<F> {
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, CaptureError> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release();
    }
}

/// Owns a [`FrameSource`] and guarantees it is released exactly once,
/// whether the session ends normally, errors out, or is dropped mid-flight
/// by a timeout.
pub struct CaptureDevice<F: FrameSource> {
    source: F,
    released: bool,
}

impl<F: FrameSource> CaptureDevice<F> {
    pub fn new(source: F) -> Self {
        Self {
            source,
            released: false,
        }
    }

    /// # Errors
    ///
    /// [`CaptureError::FrameRead`] if called after [`CaptureDevice::release`],
    /// otherwise whatever the source returns.
    pub fn read_frame(&mut self) -> Result<Option<DynamicImage>, CaptureError> {
        if self.released {
            return Err(CaptureError::FrameRead("device already released".into()));
        }
        self.source.read_frame()
    }

    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.release();
            debug!("capture device released");
        }
    }
}

impl<F: FrameSource> Drop for CaptureDevice<F> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Replays still images in file-name order, then reports exhaustion.
#[derive(Debug)]
pub struct ImageSequenceSource {
    frames: std::vec::IntoIter<PathBuf>,
}

impl ImageSequenceSource {
    /// Collects every supported image in `dir`, sorted by file name.
    ///
    /// # Errors
    ///
    /// [`CaptureError::OpenSource`] if `dir` cannot be listed.
    pub fn open(dir: &Path) -> Result<Self, CaptureError> {
        let open_err = |source: std::io::Error| CaptureError::OpenSource {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(open_err)? {
            let path = entry.map_err(open_err)?.path();
            if path.is_file() && has_supported_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        info!(dir = %dir.display(), frames = paths.len(), "opened image sequence");
        Ok(Self::from_paths(paths))
    }

    #[must_use]
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            frames: paths.into_iter(),
        }
    }
}

impl FrameSource for ImageSequenceSource {
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, CaptureError> {
        let Some(path) = self.frames.next() else {
            return Ok(None);
        };
        open_image(&path)
            .map(Some)
            .map_err(|e| CaptureError::FrameRead(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use image::GrayImage;

    use super::*;

    struct CountingSource {
        releases: Arc<AtomicUsize>,
    }

    impl FrameSource for CountingSource {
        fn read_frame(&mut self) -> Result<Option<DynamicImage>, CaptureError> {
            Ok(Some(DynamicImage::ImageLuma8(GrayImage::new(4, 4))))
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn device_is_released_exactly_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut device = CaptureDevice::new(CountingSource {
            releases: Arc::clone(&releases),
        });
        assert!(device.read_frame().unwrap().is_some());

        device.release();
        device.release();
        assert!(matches!(device.read_frame(), Err(CaptureError::FrameRead(_))));
        drop(device);

        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_device_releases_it() {
        let releases = Arc::new(AtomicUsize::new(0));
        drop(CaptureDevice::new(CountingSource {
            releases: Arc::clone(&releases),
        }));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn sequence_replays_images_in_name_order_then_ends() {
        let dir = tempfile::tempdir().unwrap();
        GrayImage::new(3, 2).save(dir.path().join("0002.png")).unwrap();
        GrayImage::new(5, 2).save(dir.path().join("0001.png")).unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let mut source = ImageSequenceSource::open(dir.path()).unwrap();

        assert_eq!(source.read_frame().unwrap().unwrap().width(), 5);
        assert_eq!(source.read_frame().unwrap().unwrap().width(), 3);
        assert!(source.read_frame().unwrap().is_none());
    }

    #[test]
    fn unreadable_frame_is_a_read_error_not_the_end() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("0001.png");
        fs::write(&broken, b"not a png").unwrap();
        let good = dir.path().join("0002.png");
        GrayImage::new(2, 2).save(&good).unwrap();

        let mut source = ImageSequenceSource::from_paths(vec![broken, good]);
        assert!(matches!(source.read_frame(), Err(CaptureError::FrameRead(_))));
        assert!(source.read_frame().unwrap().is_some());
    }

    #[test]
    fn missing_directory_cannot_be_opened() {
        let err = ImageSequenceSource::open(Path::new("/definitely/not/a/dir")).unwrap_err();
        assert!(matches!(err, CaptureError::OpenSource { .. }));
    }
}
