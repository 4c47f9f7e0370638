//! Image processors for the logo embedding pipeline.
//!
//! Region extraction slices detector boxes out of a source image; the
//! resize/pad normalizer turns each crop into the fixed shape the
//! embedding model expects.

pub mod crop;
pub mod resize_pad;
pub mod types;

pub use crop::RegionCrop;
pub use resize_pad::{ResizePadConfig, pad_image, resize_and_pad};
pub use types::{BoundingBox, FillMode, ResizeFilter};
