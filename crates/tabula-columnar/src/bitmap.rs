#![forbid(unsafe_code)]

/// A compact bit vector used for column validity and boolean row masks.
///
/// Bits are stored little-endian within each `u64` word:
/// - bit 0 is the LSB of word 0
/// - bit 63 is the MSB of word 0
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitVec {
    words: Vec<u64>,
    len: usize,
    ones: usize,
}

impl BitVec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(64)),
            len: 0,
            ones: 0,
        }
    }

    pub fn with_len_all_true(bits: usize) -> Self {
        let mut words = vec![u64::MAX; bits.div_ceil(64)];
        let rem = bits % 64;
        if rem != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << rem) - 1;
            }
        }
        Self {
            words,
            len: bits,
            ones: bits,
        }
    }

    pub fn with_len_all_false(bits: usize) -> Self {
        Self {
            words: vec![0u64; bits.div_ceil(64)],
            len: bits,
            ones: 0,
        }
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        let mut out = Self::with_capacity_bits(bits.len());
        for &bit in bits {
            out.push(bit);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, value: bool) {
        let bit = self.len % 64;
        if bit == 0 {
            self.words.push(0);
        }
        if value {
            self.words[self.len / 64] |= 1u64 << bit;
            self.ones += 1;
        }
        self.len += 1;
    }

    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "BitVec index out of bounds");
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    pub fn set(&mut self, index: usize, value: bool) {
        debug_assert!(index < self.len, "BitVec index out of bounds");
        let mask = 1u64 << (index % 64);
        let word = &mut self.words[index / 64];
        let was_set = (*word & mask) != 0;
        match (was_set, value) {
            (true, false) => {
                *word &= !mask;
                self.ones -= 1;
            }
            (false, true) => {
                *word |= mask;
                self.ones += 1;
            }
            _ => {}
        }
    }

    pub fn count_ones(&self) -> usize {
        self.ones
    }

    pub fn all_true(&self) -> bool {
        self.ones == self.len
    }

    pub fn and_inplace(&mut self, other: &BitVec) {
        debug_assert_eq!(self.len, other.len, "BitVec length mismatch");
        let mut ones = 0usize;
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w &= *o;
            ones += w.count_ones() as usize;
        }
        self.ones = ones;
    }

    /// Positions of set bits, in increasing order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_idx, &word)| {
                let mut remaining = word;
                std::iter::from_fn(move || {
                    if remaining == 0 {
                        return None;
                    }
                    let bit = remaining.trailing_zeros() as usize;
                    remaining &= remaining - 1;
                    Some(word_idx * 64 + bit)
                })
            })
            .take_while(move |&idx| idx < self.len)
    }

    /// Build a new bit vector whose bit `i` is `self.get(indices[i])`.
    ///
    /// Callers validate `indices` against `len()` first.
    pub(crate) fn gather(&self, indices: &[usize]) -> BitVec {
        let mut out = BitVec::with_capacity_bits(indices.len());
        for &idx in indices {
            out.push(self.get(idx));
        }
        out
    }
}

impl FromIterator<bool> for BitVec {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut out = BitVec::new();
        for bit in iter {
            out.push(bit);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iter_ones_yields_increasing_indices() {
        let mask = BitVec::from_bools(&[false, true, false, true, true, false]);
        assert_eq!(mask.iter_ones().collect::<Vec<_>>(), vec![1, 3, 4]);
        assert_eq!(mask.count_ones(), 3);
    }

    #[test]
    fn iter_ones_crosses_word_boundaries() {
        let mut mask = BitVec::with_len_all_false(130);
        mask.set(0, true);
        mask.set(64, true);
        mask.set(129, true);
        assert_eq!(mask.iter_ones().collect::<Vec<_>>(), vec![0, 64, 129]);
    }

    #[test]
    fn all_true_masks_trailing_bits() {
        let mask = BitVec::with_len_all_true(70);
        assert!(mask.all_true());
        assert_eq!(mask.iter_ones().count(), 70);
    }

    #[test]
    fn and_inplace_recounts_ones() {
        let mut a = BitVec::from_bools(&[true, true, false, true]);
        let b = BitVec::from_bools(&[true, false, false, true]);
        a.and_inplace(&b);
        assert_eq!(a.iter_ones().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(a.count_ones(), 2);
    }

    #[test]
    fn gather_reorders_and_repeats() {
        let bits = BitVec::from_bools(&[true, false, true]);
        let out = bits.gather(&[2, 1, 2, 0]);
        assert_eq!(out, BitVec::from_bools(&[true, false, true, true]));
    }
}
