use crate::error::{RotError, RotResult};

/// Compute the output dimensions for a native image size under optional
/// maximum bounds.
///
/// Fit-within-box semantics: when both bounds are given the smaller of the
/// two candidate ratios wins, so the result never exceeds either bound and
/// the aspect ratio is preserved (no crop, no stretch). Scaled dimensions
/// are floored, and an odd result is decremented by one — the x264/yuv420p
/// encode path requires even dimensions on both axes, whether or not the
/// final output is a video. The decrement is deliberate and never replaced
/// by an increment, even when incrementing would still fit the bound.
pub fn plan_dimensions(
    native_width: u32,
    native_height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> RotResult<(u32, u32)> {
    if native_width == 0 || native_height == 0 {
        return Err(RotError::unreadable_input(format!(
            "degenerate input dimensions {native_width}x{native_height}"
        )));
    }

    let scale = match (max_width, max_height) {
        (None, None) => {
            return Err(RotError::invalid_configuration(
                "at least one of max width / max height must be set",
            ));
        }
        (Some(mw), None) => f64::from(mw) / f64::from(native_width),
        (None, Some(mh)) => f64::from(mh) / f64::from(native_height),
        (Some(mw), Some(mh)) => (f64::from(mw) / f64::from(native_width))
            .min(f64::from(mh) / f64::from(native_height)),
    };

    let mut width = (scale * f64::from(native_width)).floor() as u32;
    let mut height = (scale * f64::from(native_height)).floor() as u32;

    if !width.is_multiple_of(2) {
        width -= 1;
    }
    if !height.is_multiple_of(2) {
        height -= 1;
    }

    // The encoder needs at least 2 pixels on each axis. Bounds tight enough
    // (or an aspect ratio extreme enough) to scale an axis below that are a
    // configuration problem, caught here rather than as an opaque resize
    // failure mid-run.
    if width == 0 || height == 0 {
        return Err(RotError::invalid_configuration(format!(
            "bounds scale {native_width}x{native_height} down to {width}x{height}; \
             each axis needs at least 2 pixels"
        )));
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bounds_is_invalid_configuration() {
        let err = plan_dimensions(2000, 1333, None, None).unwrap_err();
        assert!(matches!(err, RotError::InvalidConfiguration(_)));
    }

    #[test]
    fn both_bounds_fit_within_box() {
        // scale = min(480/2000, 320/1333) = 0.24; floor(1333 * 0.24) = 319 -> 318.
        assert_eq!(
            plan_dimensions(2000, 1333, Some(480), Some(320)).unwrap(),
            (480, 318)
        );
    }

    #[test]
    fn single_bound_scales_the_other_axis() {
        assert_eq!(
            plan_dimensions(2000, 1000, Some(480), None).unwrap(),
            (480, 240)
        );
        assert_eq!(
            plan_dimensions(2000, 1000, None, Some(320)).unwrap(),
            (640, 320)
        );
    }

    #[test]
    fn odd_results_decrement_never_increment() {
        // 101/100 on one axis only: width lands odd and must shrink to 100,
        // even though 102 would also have satisfied the single-bound case.
        assert_eq!(
            plan_dimensions(100, 100, Some(101), None).unwrap(),
            (100, 100)
        );
    }

    #[test]
    fn sub_two_pixel_results_are_rejected() {
        assert!(matches!(
            plan_dimensions(1, 1, Some(1), Some(1)),
            Err(RotError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            plan_dimensions(10_000, 17, Some(7), Some(9)),
            Err(RotError::InvalidConfiguration(_))
        ));
        // Roomy bounds, but the extreme aspect ratio starves the short axis.
        assert!(matches!(
            plan_dimensions(10_000, 10, Some(480), Some(320)),
            Err(RotError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn upscaling_is_allowed() {
        assert_eq!(
            plan_dimensions(100, 50, Some(400), Some(400)).unwrap(),
            (400, 200)
        );
    }
}
