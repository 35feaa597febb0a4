//! Capture surface: camera-like devices, the scoped viewfinder that owns an
//! open stream, and the encoder that turns a frame into a JPEG payload.

pub mod device;
pub mod encode;
pub mod mime_detect;
pub mod viewfinder;

pub use device::{CameraDevice, Facing, FrameStream, StillImageDevice};
pub use encode::{encode_frame, FrameEncoding};
pub use mime_detect::{detect_mime_type, is_image};
pub use viewfinder::Viewfinder;
