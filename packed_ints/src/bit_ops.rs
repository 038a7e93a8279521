//! Width arithmetic shared by every layout.

/// Minimum number of bits needed to store `value`, never less than 1.
#[inline]
pub fn bits_required(value: u64) -> u32 {
    (64 - value.leading_zeros()).max(1)
}

/// Largest value representable on `bits_per_value` bits.
#[inline]
pub fn max_value(bits_per_value: u32) -> u64 {
    debug_assert!((1..=64).contains(&bits_per_value));
    u64::MAX >> (64 - bits_per_value)
}

pub(crate) fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(bits_required(0), 1);
        assert_eq!(bits_required(1), 1);
        assert_eq!(bits_required(2), 2);
        assert_eq!(bits_required(255), 8);
        assert_eq!(bits_required(256), 9);
        assert_eq!(bits_required(u64::MAX), 64);
    }

    #[test]
    fn max_values() {
        assert_eq!(max_value(1), 1);
        assert_eq!(max_value(3), 7);
        assert_eq!(max_value(63), i64::MAX as u64);
        assert_eq!(max_value(64), u64::MAX);
        for bits in 1..=64 {
            assert_eq!(bits_required(max_value(bits)), bits);
        }
    }

    #[test]
    fn gcd_of_block_widths() {
        assert_eq!(gcd(64, 3), 1);
        assert_eq!(gcd(64, 24), 8);
        assert_eq!(gcd(64, 64), 64);
    }
}
