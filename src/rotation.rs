//! Rotation handling for furniture footprints.
//!
//! Rotation is stored as a whole number of degrees in `[0, 360)` and may take
//! any value in that range. Collision geometry only ever sees the
//! axis-aligned *effective footprint*: the nominal size when the rotation is
//! nearest to an even multiple of 90°, the swapped size otherwise.

use crate::types::Size;

/// Degrees in a full turn.
pub const FULL_TURN: i64 = 360;

/// Wraps an arbitrary angle into `[0, 360)` whole degrees.
///
/// Rounding happens before wrapping, so `359.6` becomes `0`, never `360`.
///
/// # Examples
/// ```
/// use floor_plan_designer::rotation::normalize_degrees;
///
/// assert_eq!(normalize_degrees(-90.0), 270);
/// assert_eq!(normalize_degrees(725.2), 5);
/// assert_eq!(normalize_degrees(359.6), 0);
/// ```
pub fn normalize_degrees(degrees: f64) -> u16 {
    if !degrees.is_finite() {
        return 0;
    }
    (degrees.round() as i64).rem_euclid(FULL_TURN) as u16
}

/// Returns `true` when the rotation rounds to an odd number of quarter turns.
///
/// Free-form angles use the nearest multiple of 90° (`round(r / 90) % 2`).
pub fn is_quarter_turned(rotation: u16) -> bool {
    let quarters = (f64::from(rotation) / 90.0).round() as i64;
    quarters.rem_euclid(2) == 1
}

/// Maps a nominal footprint and a rotation to the axis-aligned footprint used
/// by every bounds, collision and doorway check.
pub fn effective_footprint(nominal: Size, rotation: u16) -> Size {
    if is_quarter_turned(rotation) {
        nominal.swapped()
    } else {
        nominal
    }
}

/// Applies a continuous delta to a stored rotation.
pub fn apply_delta(rotation: u16, delta_degrees: f64) -> u16 {
    normalize_degrees(f64::from(rotation) + delta_degrees)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_quarter_turns_keep_nominal_footprint() {
        let nominal = Size::new(2.0, 3.0);
        for rotation in [0, 180] {
            assert_eq!(effective_footprint(nominal, rotation), nominal);
        }
    }

    #[test]
    fn odd_quarter_turns_swap_footprint() {
        let nominal = Size::new(2.0, 3.0);
        for rotation in [90, 270] {
            assert_eq!(effective_footprint(nominal, rotation), Size::new(3.0, 2.0));
        }
    }

    #[test]
    fn free_rotation_uses_nearest_quarter_parity() {
        assert!(!is_quarter_turned(44));
        assert!(is_quarter_turned(45));
        assert!(is_quarter_turned(134));
        assert!(!is_quarter_turned(135));
        assert!(is_quarter_turned(300));
        // 350° rounds to four quarter turns, which is even.
        assert!(!is_quarter_turned(350));
    }

    #[test]
    fn normalize_wraps_into_range() {
        assert_eq!(normalize_degrees(0.0), 0);
        assert_eq!(normalize_degrees(360.0), 0);
        assert_eq!(normalize_degrees(-1.0), 359);
        assert_eq!(normalize_degrees(-721.0), 359);
        assert_eq!(normalize_degrees(90.4), 90);
        assert_eq!(normalize_degrees(f64::NAN), 0);
    }

    #[test]
    fn apply_delta_accumulates_and_wraps() {
        assert_eq!(apply_delta(350, 20.0), 10);
        assert_eq!(apply_delta(10, -20.0), 350);
        assert_eq!(apply_delta(90, 0.5), 91);
    }
}
