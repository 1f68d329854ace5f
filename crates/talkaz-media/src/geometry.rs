//! Overlay geometry for compositing a scaled foreground over a background.

use crate::error::{MediaError, MediaResult};

/// Reject a scale that is not finite or lies outside `(0, 1]`.
pub fn validate_scale(scale: f64) -> MediaResult<()> {
    if !scale.is_finite() || scale <= 0.0 || scale > 1.0 {
        return Err(MediaError::invalid_input(format!(
            "scale must be in (0, 1], got {}",
            scale
        )));
    }
    Ok(())
}

/// Placement of the scaled foreground on the background canvas.
///
/// The foreground is `floor(scale * W) x floor(scale * H)`, centred
/// horizontally and anchored to the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayGeometry {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub fg_width: u32,
    pub fg_height: u32,
    pub x: u32,
    pub y: u32,
}

impl OverlayGeometry {
    /// Compute the overlay rectangle for a `width x height` canvas.
    ///
    /// `scale` must be finite and in `(0, 1]`, and must not truncate either
    /// foreground dimension to zero.
    pub fn compute(width: u32, height: u32, scale: f64) -> MediaResult<Self> {
        if width == 0 || height == 0 {
            return Err(MediaError::invalid_input(format!(
                "canvas must be non-empty, got {}x{}",
                width, height
            )));
        }
        validate_scale(scale)?;

        let fg_width = (scale * f64::from(width)).floor() as u32;
        let fg_height = (scale * f64::from(height)).floor() as u32;
        if fg_width == 0 || fg_height == 0 {
            return Err(MediaError::invalid_input(format!(
                "scale {} leaves an empty {}x{} foreground",
                scale, fg_width, fg_height
            )));
        }

        Ok(Self {
            canvas_width: width,
            canvas_height: height,
            fg_width,
            fg_height,
            x: (width - fg_width) / 2,
            y: height - fg_height,
        })
    }

    /// Whether the foreground box lies entirely within the canvas.
    pub fn is_contained(&self) -> bool {
        self.x + self.fg_width <= self.canvas_width && self.y + self.fg_height <= self.canvas_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portrait_canvas_at_default_scale() {
        let g = OverlayGeometry::compute(1080, 1920, 0.6).unwrap();
        assert_eq!((g.fg_width, g.fg_height), (648, 1152));
        assert_eq!((g.x, g.y), (216, 768));
    }

    #[test]
    fn test_full_scale_fills_canvas() {
        let g = OverlayGeometry::compute(1280, 720, 1.0).unwrap();
        assert_eq!((g.fg_width, g.fg_height, g.x, g.y), (1280, 720, 0, 0));
    }

    #[test]
    fn test_odd_remainder_floors() {
        let g = OverlayGeometry::compute(101, 99, 0.5).unwrap();
        assert_eq!((g.fg_width, g.fg_height), (50, 49));
        assert_eq!((g.x, g.y), (25, 50));
    }

    #[test]
    fn test_containment_holds_across_scales() {
        for (w, h) in [(1080, 1920), (1920, 1080), (7, 3), (640, 480)] {
            for step in 1..=100 {
                let scale = step as f64 / 100.0;
                match OverlayGeometry::compute(w, h, scale) {
                    Ok(g) => assert!(g.is_contained(), "{w}x{h} @ {scale}: {g:?}"),
                    Err(e) => assert!(matches!(e, MediaError::InvalidInput(_))),
                }
            }
        }
    }

    #[test]
    fn test_rejects_out_of_range_scale() {
        for scale in [0.0, -0.5, 1.01, 2.0, f64::NAN, f64::INFINITY] {
            assert!(OverlayGeometry::compute(1080, 1920, scale).is_err(), "{scale}");
        }
    }

    #[test]
    fn test_rejects_empty_foreground() {
        assert!(OverlayGeometry::compute(10, 10, 0.05).is_err());
        assert!(OverlayGeometry::compute(0, 10, 0.5).is_err());
    }

    #[test]
    fn test_deterministic() {
        let a = OverlayGeometry::compute(1080, 1920, 0.37).unwrap();
        let b = OverlayGeometry::compute(1080, 1920, 0.37).unwrap();
        assert_eq!(a, b);
    }
}
