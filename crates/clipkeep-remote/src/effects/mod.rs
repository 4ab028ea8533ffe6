//! I/O against the camera service.

mod nest;
mod retrying;
mod service;

pub use nest::NestService;
pub use retrying::Retrying;
pub use service::CameraService;
