use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::DynamicImage;
use stockscan_core::StockError;
use tracing::{debug, info};

use crate::mime_detect::{detect_mime_type, is_image};

/// Which way the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera, pointed at the product.
    #[default]
    Environment,
    /// Front camera.
    User,
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Environment => f.write_str("environment"),
            Facing::User => f.write_str("user"),
        }
    }
}

impl FromStr for Facing {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "environment" | "env" | "rear" | "back" => Ok(Facing::Environment),
            "user" | "front" | "selfie" => Ok(Facing::User),
            other => Err(StockError::Config(format!("unknown camera facing {other:?}"))),
        }
    }
}

/// A source of frames that must be opened before use and released after.
pub trait CameraDevice: Send {
    /// Acquire the device. Permission or availability problems are
    /// [`StockError::Device`].
    fn open(&mut self, facing: Facing) -> Result<Box<dyn FrameStream>, StockError>;
}

/// An open device stream.
pub trait FrameStream: Send {
    /// Grab the current frame.
    fn grab(&mut self) -> Result<DynamicImage, StockError>;

    /// Release the underlying device. Idempotent.
    fn stop(&mut self);
}

/// A "camera" that shows a single still image from disk. This is what the
/// command line uses in place of a live viewfinder.
pub struct StillImageDevice {
    path: PathBuf,
}

impl StillImageDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CameraDevice for StillImageDevice {
    fn open(&mut self, facing: Facing) -> Result<Box<dyn FrameStream>, StockError> {
        let mime = detect_mime_type(&self.path);
        if !is_image(mime) {
            return Err(StockError::Device(format!(
                "{} is not a supported image",
                self.path.display()
            )));
        }
        if !self.path.exists() {
            return Err(StockError::Device(format!(
                "no image at {}",
                self.path.display()
            )));
        }
        let frame = image::open(&self.path).map_err(|e| {
            StockError::Device(format!("cannot decode {}: {e}", self.path.display()))
        })?;
        info!(path = %self.path.display(), %facing, width = frame.width(), height = frame.height(), "Still image device opened");
        Ok(Box::new(StillFrameStream {
            path: self.path.clone(),
            frame: Some(frame),
        }))
    }
}

struct StillFrameStream {
    path: PathBuf,
    frame: Option<DynamicImage>,
}

impl FrameStream for StillFrameStream {
    fn grab(&mut self) -> Result<DynamicImage, StockError> {
        self.frame
            .clone()
            .ok_or_else(|| StockError::Device("stream already stopped".to_string()))
    }

    fn stop(&mut self) {
        if self.frame.take().is_some() {
            debug!(path = %self.path.display(), "Still image device released");
        }
    }
}
