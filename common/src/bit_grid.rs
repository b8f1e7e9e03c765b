//! Bit-packed boolean grid, used for region masks.
//!
//! Stores one bit per cell in `u64` words, addressed by `(row, col)` in
//! row-major order like [`crate::Grid`].

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    words: Vec<u64>,
    width: usize,
    height: usize,
}

impl BitGrid {
    /// Create a grid with every cell set to `value`.
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let len = width * height;
        let mut grid = Self {
            words: vec![0; len.div_ceil(BITS_PER_WORD)],
            width,
            height,
        };
        if value {
            grid.words.fill(!0);
            grid.clear_tail();
        }
        grid
    }

    /// Create a grid from row-major booleans.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length {} does not match dimensions {}x{}",
            data.len(),
            width,
            height
        );
        let mut grid = Self::new_filled(width, height, false);
        for (idx, &value) in data.iter().enumerate() {
            if value {
                grid.set_linear(idx, true);
            }
        }
        grid
    }

    /// Create a grid from `f(row, col)`.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut grid = Self::new_filled(width, height, false);
        for row in 0..height {
            for col in 0..width {
                if f(row, col) {
                    grid.set(row, col, true);
                }
            }
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(height, width)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        debug_assert!(row < self.height && col < self.width);
        self.get_linear(row * self.width + col)
    }

    /// Like [`BitGrid::get`] but treats out-of-range coordinates as unset.
    #[inline]
    pub fn get_checked(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let (row, col) = (row as usize, col as usize);
        row < self.height && col < self.width && self.get(row, col)
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        debug_assert!(row < self.height && col < self.width);
        self.set_linear(row * self.width + col, value);
    }

    /// Number of set cells.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Set cells as `(row, col)`, in row-major order.
    pub fn iter_ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.words
            .iter()
            .enumerate()
            .flat_map(move |(word_idx, &word)| {
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let bit = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    Some(word_idx * BITS_PER_WORD + bit)
                })
            })
            .map(move |idx| (idx / width, idx % width))
    }

    #[inline]
    fn get_linear(&self, idx: usize) -> bool {
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    fn set_linear(&mut self, idx: usize, value: bool) {
        let word = &mut self.words[idx / BITS_PER_WORD];
        let bit = 1u64 << (idx % BITS_PER_WORD);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Zero the padding bits past `width * height` so `count_ones` stays exact.
    fn clear_tail(&mut self) {
        let used = (self.width * self.height) % BITS_PER_WORD;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filled() {
        let grid = BitGrid::new_filled(10, 10, true);
        assert_eq!(grid.count_ones(), 100);
        assert!(grid.get(9, 9));

        let grid = BitGrid::new_filled(10, 10, false);
        assert_eq!(grid.count_ones(), 0);
    }

    #[test]
    fn test_filled_true_ignores_padding_bits() {
        // 3 * 5 = 15 bits in a single 64-bit word
        let grid = BitGrid::new_filled(3, 5, true);
        assert_eq!(grid.count_ones(), 15);
        assert_eq!(grid.iter_ones().count(), 15);
    }

    #[test]
    fn test_from_slice_row_major() {
        let grid = BitGrid::from_slice(3, 2, &[false, true, false, true, false, false]);
        assert!(grid.get(0, 1));
        assert!(grid.get(1, 0));
        assert!(!grid.get(1, 2));
        assert_eq!(grid.count_ones(), 2);
    }

    #[test]
    #[should_panic(expected = "does not match dimensions")]
    fn test_from_slice_panics_on_size_mismatch() {
        BitGrid::from_slice(3, 3, &[true; 4]);
    }

    #[test]
    fn test_set_and_clear() {
        let mut grid = BitGrid::new_filled(4, 4, false);
        grid.set(2, 3, true);
        assert!(grid.get(2, 3));
        grid.set(2, 3, false);
        assert!(!grid.get(2, 3));
    }

    #[test]
    fn test_get_checked_out_of_range() {
        let grid = BitGrid::new_filled(2, 2, true);
        assert!(grid.get_checked(1, 1));
        assert!(!grid.get_checked(-1, 0));
        assert!(!grid.get_checked(0, 2));
        assert!(!grid.get_checked(2, 0));
    }

    #[test]
    fn test_iter_ones_across_word_boundary() {
        // 100 cells span two words
        let grid = BitGrid::from_fn(10, 10, |row, col| (row + col) % 7 == 0);
        let expected: Vec<(usize, usize)> = (0..10)
            .flat_map(|row| (0..10).map(move |col| (row, col)))
            .filter(|(row, col)| (row + col) % 7 == 0)
            .collect();
        assert_eq!(grid.iter_ones().collect::<Vec<_>>(), expected);
    }
}
