//! Adaptive (local-mean) thresholding.

use crate::{windowed_transform_with, OpsError, OpsResult, Scheduler, WindowSpec};
use raster_core::{Color, Extrapolation, Kernel, View};
use tracing::trace;

/// How the local mean is weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AdaptiveMethod {
    /// Plain box mean of the block.
    #[default]
    Mean,
    /// Gaussian-weighted mean, sigma derived from the block size.
    Gaussian,
}

/// Adaptive threshold parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveThreshold {
    /// Local mean weighting.
    pub method: AdaptiveMethod,
    /// Block radius; the block is `(2r+1) x (2r+1)`.
    pub radius: u32,
    /// Subtracted from the local mean before comparing.
    pub offset: f32,
    /// Value written where the test passes.
    pub max_value: u8,
    /// Write `max_value` where the test fails instead.
    pub invert: bool,
    /// Border handling for the block.
    pub extrapolation: Extrapolation,
}

impl AdaptiveThreshold {
    /// Mean method, offset 0, binary 0/255 output, replicated borders.
    pub fn new(radius: u32) -> Self {
        Self {
            method: AdaptiveMethod::Mean,
            radius,
            offset: 0.0,
            max_value: 255,
            invert: false,
            extrapolation: Extrapolation::Replicate,
        }
    }

    /// Sets the weighting method.
    pub fn method(mut self, method: AdaptiveMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the offset.
    pub fn offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the output polarity.
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Weights of the block, normalized to sum 1.
    fn kernel(&self) -> raster_core::Result<Kernel> {
        let side = 2 * self.radius as usize + 1;
        match self.method {
            AdaptiveMethod::Mean => Kernel::box_filter(side, side),
            AdaptiveMethod::Gaussian => {
                let sigma = 0.3 * ((side as f32 - 1.0) * 0.5 - 1.0) + 0.8;
                Kernel::gaussian(self.radius, sigma)
            }
        }
    }
}

/// Per channel: `max_value` where the sample exceeds the weighted local mean
/// minus `offset`, else 0 (swapped when `invert`).
///
/// # Errors
///
/// [`OpsError::InvalidArgument`] for a non-finite offset or a radius whose
/// block size overflows.
///
/// ```rust
/// use raster_core::View;
/// use raster_ops::threshold::{adaptive, AdaptiveThreshold};
/// use raster_ops::Scheduler;
///
/// let src = View::from_data(3, 1, 1, vec![10, 200, 10]).unwrap();
/// let out = adaptive(&Scheduler::single(), &src, &AdaptiveThreshold::new(1)).unwrap();
/// assert_eq!(out.to_vec(), vec![0, 255, 0]);
/// ```
pub fn adaptive(sched: &Scheduler, src: &View, params: &AdaptiveThreshold) -> OpsResult<View> {
    trace!(
        width = src.width(),
        height = src.height(),
        radius = params.radius,
        method = ?params.method,
        "adaptive threshold"
    );
    if !params.offset.is_finite() {
        return Err(OpsError::InvalidArgument(format!("invalid offset {}", params.offset)));
    }
    if params.radius > u32::MAX / 4 {
        return Err(OpsError::InvalidArgument(format!("radius {} too large", params.radius)));
    }
    let kernel = params.kernel()?;
    let r = params.radius;
    let spec = WindowSpec::square(r).extrapolation(params.extrapolation);
    let channels = src.channels();
    let (hit, miss) = if params.invert {
        (0.0, params.max_value as f32)
    } else {
        (params.max_value as f32, 0.0)
    };

    windowed_transform_with(
        sched,
        src,
        &spec,
        || Color::zeros(channels),
        |center, aperture, color| {
            aperture.read_pixel(r, r, center)?;
            aperture.convolve_into(&kernel, color)?;
            for c in 0..channels {
                color[c] = if center[c] > color[c] - params.offset { hit } else { miss };
            }
            Ok(())
        },
    )
}
