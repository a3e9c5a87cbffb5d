//! Integration tests for raster-rs crates.
//!
//! End-to-end checks of view aliasing, border and sub-pixel sampling, and
//! the window engine across worker counts.

use raster_core::View;

/// Initialize a tracing subscriber for tests.
///
/// Safe to call many times. Respects `RUST_LOG`, defaults to "warn".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// The 5x3 single-channel image holding `1..=15` row by row.
pub fn sample_image() -> raster_core::Result<View> {
    View::from_data(5, 3, 1, (1..=15).collect())
}

/// Deterministic pseudo-random image.
pub fn noise_image(width: u32, height: u32, channels: usize, seed: u32) -> raster_core::Result<View> {
    let mut s = seed | 1;
    let data = (0..width as usize * height as usize * channels)
        .map(|_| {
            s ^= s << 13;
            s ^= s >> 17;
            s ^= s << 5;
            (s >> 24) as u8
        })
        .collect();
    View::from_data(width, height, channels, data)
}
