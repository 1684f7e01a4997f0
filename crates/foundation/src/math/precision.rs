//! Precision policies for values shown to users.
//!
//! - `canonical_f64` folds `-0.0` and NaN payloads so output stays stable.
//! - `round_decimals` is the single rounding rule for displayed numbers.
//! - `format_float` prints floats the way the inspector tree shows them.

/// Largest number of decimal places a caller may request.
pub const MAX_DECIMALS: u32 = 15;

/// Canonicalize a floating-point value for deterministic output.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Round half away from zero to `decimals` places.
///
/// `decimals` is clamped to [`MAX_DECIMALS`]; non-finite values pass through.
pub fn round_decimals(v: f64, decimals: u32) -> f64 {
    if !v.is_finite() {
        return canonical_f64(v);
    }
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let scaled = v * factor;
    if !scaled.is_finite() {
        return v;
    }
    canonical_f64(scaled.round() / factor)
}

/// Shortest round-trip text for `v`, keeping one decimal place on integral values.
///
/// `2.0` prints as `2.0`, `123.46` as `123.46`.
pub fn format_float(v: f64) -> String {
    let v = canonical_f64(v);
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
