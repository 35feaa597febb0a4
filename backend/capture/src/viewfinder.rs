//! The viewfinder owns an open device stream for as long as it is mounted.
//!
//! Acquire on mount, release on drop, and release-then-reacquire when the
//! facing direction changes.

use stockscan_core::{EncodedFrame, StockError};
use tracing::{info, warn};

use crate::device::{CameraDevice, Facing, FrameStream};
use crate::encode::{encode_frame, FrameEncoding};

pub struct Viewfinder {
    device: Box<dyn CameraDevice>,
    stream: Option<Box<dyn FrameStream>>,
    facing: Facing,
    encoding: FrameEncoding,
}

impl Viewfinder {
    /// Acquire the device. A failure here is persistent; the caller shows it
    /// until the user fixes permissions or hardware.
    pub fn mount(
        mut device: Box<dyn CameraDevice>,
        facing: Facing,
        encoding: FrameEncoding,
    ) -> Result<Self, StockError> {
        let stream = device.open(facing).inspect_err(|e| {
            warn!(error = %e, %facing, "Camera unavailable");
        })?;
        Ok(Self {
            device,
            stream: Some(stream),
            facing,
            encoding,
        })
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Release the current stream and open one facing the other way.
    pub fn switch_facing(&mut self, facing: Facing) -> Result<(), StockError> {
        if facing == self.facing && self.stream.is_some() {
            return Ok(());
        }
        self.release();
        let stream = self.device.open(facing)?;
        self.stream = Some(stream);
        self.facing = facing;
        info!(%facing, "Camera switched");
        Ok(())
    }

    /// Grab and encode the current frame.
    pub fn capture(&mut self) -> Result<EncodedFrame, StockError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| StockError::Device("camera is not running".to_string()))?;
        let frame = stream.grab()?;
        encode_frame(&frame, self.encoding)
    }

    /// Stop the stream early. Dropping the viewfinder does the same.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

impl Drop for Viewfinder {
    fn drop(&mut self) {
        self.release();
    }
}
