pub fn single_bit_index(bit: u128) -> usize {
    bit.trailing_zeros() as usize
}

pub fn first_set_bit(bits: u128) -> u128 {
    bits & bits.wrapping_neg()
}

/// Iterates the indices of all set bits, lowest first.
pub fn bit_indices(bits: u128) -> BitIndices {
    BitIndices { bits }
}

pub struct BitIndices {
    bits: u128,
}

impl Iterator for BitIndices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.bits == 0 {
            return None;
        }

        let idx = single_bit_index(self.bits);
        self.bits &= self.bits - 1;
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_bit_index_first_bit() {
        assert_eq!(single_bit_index(0b1), 0);
    }

    #[test]
    fn test_single_bit_index_last_bit() {
        assert_eq!(single_bit_index(0b1 << 127), 127);
    }

    #[test]
    fn test_first_set_bit_single() {
        assert_eq!(first_set_bit(0b100), 0b100);
    }

    #[test]
    fn test_first_set_bit_multiple() {
        assert_eq!(first_set_bit(0b1010), 0b0010);
    }

    #[test]
    fn test_bit_indices_empty() {
        assert_eq!(bit_indices(0).count(), 0);
    }

    #[test]
    fn test_bit_indices_ascending() {
        let indices: Vec<_> = bit_indices(0b1001_0001).collect();
        assert_eq!(indices, vec![0, 4, 7]);
    }

    #[test]
    fn test_bit_indices_high_word() {
        let indices: Vec<_> = bit_indices((1u128 << 120) | 1).collect();
        assert_eq!(indices, vec![0, 120]);
    }
}
