//! Numeric helpers shared by the sizing resolver and the rasterizer.
//!
//! Pixel coordinates around the center line must land on even boundaries,
//! otherwise the upper and lower halves of a waveform are off by one row.

/// Returns `value` clamped between `min` and `max`, inclusive.
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Returns `value` if it is even, otherwise `value + 1`.
pub fn get_even(value: i32) -> i32 {
    if value % 2 != 0 {
        value.saturating_add(1)
    } else {
        value
    }
}

/// 64-bit variant of [`get_even`].
pub fn get_even_i64(value: i64) -> i64 {
    if value % 2 != 0 {
        value.saturating_add(1)
    } else {
        value
    }
}

/// Clamps `value` and forces it even.
///
/// The result is always even and lies within `[get_even(min), get_even(max)]`.
pub fn clamp_even(value: i32, min: i32, max: i32) -> i32 {
    get_even(value).min(get_even(max)).max(get_even(min))
}

/// Rounds `value` to `decimals` places. `decimals` is clamped to 0..=12.
pub fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f64.powi(clamp(decimals, 0, 12));
    ((value as f64 * factor).round() / factor) as f32
}

/// Total number of interleaved samples in `byte_len` bytes of PCM data.
pub fn sample_count(byte_len: u64, bits_per_sample: u16) -> u64 {
    let bytes_per_sample = u64::from(bits_per_sample / 8).max(1);
    byte_len / bytes_per_sample
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_even_is_even_and_close() {
        for value in -50..50 {
            let even = get_even(value);
            assert_eq!(even % 2, 0, "get_even({value}) = {even}");
            assert!(even == value || even == value + 1);
        }
        assert_eq!(get_even(i32::MAX), i32::MAX);
        assert_eq!(get_even_i64(7), 8);
        assert_eq!(get_even_i64(8), 8);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 1, 3), 3);
        assert_eq!(clamp(-5, 1, 3), 1);
        assert_eq!(clamp(2, 1, 3), 2);
        assert_eq!(clamp(9.9f32, 1.0, 9.5), 9.5);
        assert_eq!(clamp(-1i64, 0, 10), 0);
    }

    #[test]
    fn test_clamp_even() {
        assert_eq!(clamp_even(7, 2, 192), 8);
        assert_eq!(clamp_even(1, 2, 192), 2);
        assert_eq!(clamp_even(500, 2, 192), 192);
        // Odd bounds are rounded up to their even neighbour.
        assert_eq!(clamp_even(0, 1, 9), 2);
        assert_eq!(clamp_even(100, 1, 9), 10);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234_567, 2), 1.23);
        assert_eq!(round_to(0.126, 2), 0.13);
        assert_eq!(round_to(2.6, 0), 3.0);
    }

    #[test]
    fn test_sample_count() {
        assert_eq!(sample_count(88_200, 16), 44_100);
        assert_eq!(sample_count(400, 32), 100);
        assert_eq!(sample_count(10, 4), 10);
    }
}
