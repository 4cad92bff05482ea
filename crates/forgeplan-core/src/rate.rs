use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// All flow rates are expressed in items per minute. Using fixed-point keeps
/// headroom comparisons and split fractions exact across the recursive
/// synthesis, so no epsilon policy is needed anywhere in the planner.
pub type Rate = I32F32;

/// Convert an f64 to a [`Rate`]. Use only for initialization and tests,
/// never inside the planning passes.
#[inline]
pub fn rate(v: f64) -> Rate {
    Rate::from_num(v)
}

/// Convert a [`Rate`] to f64. Use only for display.
#[inline]
pub fn rate_to_f64(v: Rate) -> f64 {
    v.to_num::<f64>()
}

/// Number of fabrication units needed to cover `demand` when each unit
/// supplies `per_unit`. Ceiling of an exact fixed-point division.
#[inline]
pub fn units_for(demand: Rate, per_unit: Rate) -> u32 {
    (demand / per_unit).ceil().to_num::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_round_trip() {
        let r = rate(2.5);
        assert_eq!(rate_to_f64(r), 2.5);
    }

    #[test]
    fn units_for_exact_division() {
        assert_eq!(units_for(rate(10.0), rate(2.5)), 4);
    }

    #[test]
    fn units_for_rounds_up() {
        assert_eq!(units_for(rate(10.0), rate(3.0)), 4);
        assert_eq!(units_for(rate(0.5), rate(3.0)), 1);
    }

    #[test]
    fn rate_is_deterministic() {
        let a = rate(1.0) / rate(3.0);
        let b = rate(1.0) / rate(3.0);
        assert_eq!(a, b);
        assert_eq!(a * rate(3.0), b * rate(3.0));
    }
}
