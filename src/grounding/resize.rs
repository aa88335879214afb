/// Resize planning for Qwen-VL style vision encoders.
///
/// The model only sees images whose sides are multiples of the patch factor
/// and whose area sits inside a pixel budget. Coordinates emitted by
/// `qwen25vl` checkpoints live in that resized space, so the parser needs the
/// exact same numbers the processor used.
use serde::{Deserialize, Serialize};

use crate::errors::{GatewayError, GatewayResult};

pub const IMAGE_FACTOR: u32 = 28;
pub const MIN_PIXELS: u64 = 100 * 28 * 28;
pub const MAX_PIXELS: u64 = 16384 * 28 * 28;
pub const MAX_RATIO: f64 = 200.0;

/// Target dimensions handed to the model, `(height, width)` order like the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeTarget {
    pub height: u32,
    pub width: u32,
}

impl ResizeTarget {
    pub fn area(&self) -> u64 {
        self.height as u64 * self.width as u64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeLimits {
    #[serde(default = "default_factor")]
    pub factor: u32,
    #[serde(default = "default_min_pixels")]
    pub min_pixels: u64,
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,
    #[serde(default = "default_max_ratio")]
    pub max_ratio: f64,
}

impl Default for ResizeLimits {
    fn default() -> Self {
        Self {
            factor: IMAGE_FACTOR,
            min_pixels: MIN_PIXELS,
            max_pixels: MAX_PIXELS,
            max_ratio: MAX_RATIO,
        }
    }
}

fn default_factor() -> u32 {
    IMAGE_FACTOR
}

fn default_min_pixels() -> u64 {
    MIN_PIXELS
}

fn default_max_pixels() -> u64 {
    MAX_PIXELS
}

fn default_max_ratio() -> f64 {
    MAX_RATIO
}

impl ResizeLimits {
    pub fn plan(&self, height: u32, width: u32) -> GatewayResult<ResizeTarget> {
        plan_with_ratio(
            height,
            width,
            self.factor,
            self.min_pixels,
            self.max_pixels,
            self.max_ratio,
        )
    }
}

fn round_by_factor(number: f64, factor: u32) -> u32 {
    // Python's round() semantics: exact halves go to the even neighbour.
    ((number / factor as f64).round_ties_even() as u32) * factor
}

fn ceil_by_factor(number: f64, factor: u32) -> u32 {
    ((number / factor as f64).ceil() as u32) * factor
}

fn floor_by_factor(number: f64, factor: u32) -> u32 {
    ((number / factor as f64).floor() as u32) * factor
}

/// Plan with the default maximum aspect ratio.
pub fn plan(
    height: u32,
    width: u32,
    factor: u32,
    min_pixels: u64,
    max_pixels: u64,
) -> GatewayResult<ResizeTarget> {
    plan_with_ratio(height, width, factor, min_pixels, max_pixels, MAX_RATIO)
}

pub fn plan_with_ratio(
    height: u32,
    width: u32,
    factor: u32,
    min_pixels: u64,
    max_pixels: u64,
    max_ratio: f64,
) -> GatewayResult<ResizeTarget> {
    if height == 0 || width == 0 {
        return Err(GatewayError::InvalidImage(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }
    if factor == 0 {
        return Err(GatewayError::Config("resize factor must be positive".into()));
    }

    let (h, w) = (height as f64, width as f64);
    let ratio = h.max(w) / h.min(w);
    if ratio > max_ratio {
        return Err(GatewayError::InvalidAspectRatio { ratio, max: max_ratio });
    }

    let mut h_bar = factor.max(round_by_factor(h, factor));
    let mut w_bar = factor.max(round_by_factor(w, factor));
    let area = h_bar as u64 * w_bar as u64;

    if area > max_pixels {
        let beta = ((h * w) / max_pixels as f64).sqrt();
        h_bar = factor.max(floor_by_factor(h / beta, factor));
        w_bar = factor.max(floor_by_factor(w / beta, factor));
    } else if area < min_pixels {
        let beta = (min_pixels as f64 / (h * w)).sqrt();
        h_bar = ceil_by_factor(h * beta, factor);
        w_bar = ceil_by_factor(w * beta, factor);
    }

    tracing::trace!(height, width, h_bar, w_bar, "resize planned");
    Ok(ResizeTarget { height: h_bar, width: w_bar })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_invariants(t: ResizeTarget, factor: u32) {
        assert!(t.height > 0 && t.width > 0);
        assert_eq!(t.height % factor, 0, "height {} not a multiple of {factor}", t.height);
        assert_eq!(t.width % factor, 0, "width {} not a multiple of {factor}", t.width);
    }

    #[test]
    fn common_screen_stays_close_to_original() {
        let t = plan(1080, 1920, IMAGE_FACTOR, MIN_PIXELS, MAX_PIXELS).unwrap();
        check_invariants(t, IMAGE_FACTOR);
        assert_eq!(t, ResizeTarget { height: 1092, width: 1932 });
    }

    #[test]
    fn exact_multiples_are_untouched() {
        let t = plan(1000, 1400, 28, MIN_PIXELS, MAX_PIXELS).unwrap();
        assert_eq!(t, ResizeTarget { height: 1008, width: 1400 });
    }

    #[test]
    fn ties_round_to_even_multiple() {
        // 42 / 28 = 1.5 -> 2, 70 / 28 = 2.5 -> 2
        let t = plan(42, 70, 28, 1, u64::MAX).unwrap();
        assert_eq!(t, ResizeTarget { height: 56, width: 56 });
    }

    #[test]
    fn oversized_image_is_scaled_into_budget() {
        let max_pixels = 1280 * 28 * 28;
        let t = plan(4000, 6000, 28, MIN_PIXELS, max_pixels).unwrap();
        check_invariants(t, 28);
        assert!(t.area() <= max_pixels);
        assert!(t.area() >= MIN_PIXELS);
    }

    #[test]
    fn tiny_image_is_scaled_up_to_minimum() {
        let t = plan(50, 80, 28, MIN_PIXELS, MAX_PIXELS).unwrap();
        check_invariants(t, 28);
        assert!(t.area() >= MIN_PIXELS);
        assert!(t.area() <= MAX_PIXELS);
    }

    #[test]
    fn invariants_hold_across_shapes() {
        let max_pixels = 2048 * 28 * 28;
        for &(h, w) in &[(1, 150), (33, 4000), (768, 1024), (2160, 3840), (5000, 30), (999, 1001)] {
            let t = plan(h, w, 28, MIN_PIXELS, max_pixels).unwrap();
            check_invariants(t, 28);
            let rounded = 28u64.max(((h as f64 / 28.0).round_ties_even() as u64) * 28)
                * 28u64.max(((w as f64 / 28.0).round_ties_even() as u64) * 28);
            if rounded > max_pixels || rounded < MIN_PIXELS {
                assert!(t.area() <= max_pixels, "{h}x{w} -> {t:?}");
                assert!(t.area() >= MIN_PIXELS, "{h}x{w} -> {t:?}");
            }
        }
    }

    #[test]
    fn extreme_ratio_is_rejected() {
        let err = plan(1, 201, 28, MIN_PIXELS, MAX_PIXELS).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidAspectRatio { .. }));
    }

    #[test]
    fn ratio_at_bound_is_accepted() {
        assert!(plan(1, 200, 28, MIN_PIXELS, MAX_PIXELS).is_ok());
    }

    #[test]
    fn configured_ratio_is_honoured() {
        let limits = ResizeLimits { max_ratio: 2.0, ..ResizeLimits::default() };
        assert!(limits.plan(100, 250).is_err());
        assert!(limits.plan(100, 200).is_ok());
    }

    #[test]
    fn zero_dimension_is_invalid_image() {
        let err = plan(0, 100, 28, MIN_PIXELS, MAX_PIXELS).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidImage(_)));
    }
}
