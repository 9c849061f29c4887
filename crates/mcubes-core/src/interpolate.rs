//! Linear placement of a vertex along a crossed cell edge.

use glam::Vec3;

/// Denominators smaller than this are treated as zero, to avoid amplifying
/// floating-point noise into a wild `t`.
const ZERO_DENOM_EPSILON: f32 = 1e-6;

/// Computes the point where the isosurface crosses an edge whose endpoints
/// `pa`, `pb` have scalar values `va`, `vb`. Uses the unbiased `iso` — not the
/// epsilon-biased value used for classification — so that interpolation stays
/// continuous across the boundary between cells.
///
/// `t` is not clamped to `[0, 1]`: a poorly conditioned input can legitimately
/// produce an out-of-range `t`, which is accepted as a reflection of the input
/// data. Only non-finite results are replaced, with the edge midpoint.
#[must_use]
pub fn interpolate_edge(pa: Vec3, va: f32, pb: Vec3, vb: f32, iso: f32) -> Vec3 {
    let d = vb - va;
    let t = if d == 0.0 || d.abs() < ZERO_DENOM_EPSILON {
        0.5
    } else {
        (iso - va) / d
    };
    let t = if t.is_finite() { t } else { 0.5 };
    pa + t * (pb - pa)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_when_values_equal() {
        let p = interpolate_edge(Vec3::ZERO, 1.0, Vec3::X, 1.0, 0.5);
        assert_eq!(p, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn exact_fraction_for_linear_ramp() {
        // va=0 at x=0, vb=1 at x=1, iso=0.25 -> t=0.25
        let p = interpolate_edge(Vec3::ZERO, 0.0, Vec3::X, 1.0, 0.25);
        assert!((p.x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn t_is_not_clamped_outside_unit_range() {
        // iso outside [va, vb] legitimately yields t outside [0, 1].
        let p = interpolate_edge(Vec3::ZERO, 0.0, Vec3::X, 1.0, 2.0);
        assert!((p.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn non_finite_t_falls_back_to_midpoint() {
        let p = interpolate_edge(Vec3::ZERO, f32::NAN, Vec3::X, 1.0, 0.5);
        assert_eq!(p, Vec3::new(0.5, 0.0, 0.0));
    }
}
