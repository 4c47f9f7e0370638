//! Utility functions for the logo embedding pipeline.
//!
//! This module provides image loading helpers, tensor conversion for the
//! embedding model, and logging setup.

pub mod image;
pub mod tensor;

pub use image::{create_rgb_image, load_image, mean_intensity};
pub use tensor::batch_to_tensor;

/// Initializes a global tracing subscriber honoring `RUST_LOG`.
///
/// Falls back to the `info` level when the environment does not specify a
/// filter. Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
