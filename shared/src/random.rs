//! Random helpers shared by the server and bots.

use rand::Rng;

/// Default exponent for [`weighted`].
pub const DEFAULT_WEIGHT: f64 = 2.0;

/// Uniform integer in `[low, high]`, both bounds inclusive.
pub fn random_int(rng: &mut impl Rng, low: i32, high: i32) -> i32 {
    rng.gen_range(low..=high)
}

/// Weighted transform of a uniform input `u` in `[0, 1)`.
///
/// Pushes values away from the middle: inputs below 0.5 map into `[0.5, 1]`
/// from the top, inputs above 0.5 map into `[0.5, 1]` from the bottom.
pub fn weighted(u: f64, weight: f64) -> f64 {
    if u < 0.5 {
        1.0 - (1.0 - u).powf(weight) / 2.0
    } else {
        0.5 + ((u - 0.5) * 2.0).powf(weight) / 2.0
    }
}

/// Draw a uniform sample from `rng` and pass it through [`weighted`].
pub fn weighted_random(rng: &mut impl Rng, weight: Option<f64>) -> f64 {
    weighted(rng.gen::<f64>(), weight.unwrap_or(DEFAULT_WEIGHT))
}
