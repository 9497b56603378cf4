/*!
A dense boolean matrix backed by a single [`BitSet`].

Cell `(i, j)` lives at flat position `i * cols + j`, so rows are packed
back to back and generally do **not** start on a block boundary.
*/

use std::ops::{BitAnd, BitOr};

use super::set::BitSet;

const BLOCK_BITS: usize = u64::BITS as usize;

/// A `rows x cols` bit matrix.
///
/// Reads out of range return `false`; writes out of range are ignored.
/// Row extraction and the binary combinators panic on misuse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    bits: BitSet,
}

impl BitMatrix {
    /// Creates a `rows x cols` matrix, all cleared.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bits: BitSet::new(rows * cols),
        }
    }

    pub fn number_of_rows(&self) -> usize {
        self.rows
    }

    pub fn number_of_cols(&self) -> usize {
        self.cols
    }

    /// Sets cell `(row, col)`; out-of-range coordinates are ignored.
    pub fn set(&mut self, row: usize, col: usize) {
        if row < self.rows && col < self.cols {
            self.bits.set_bit(row * self.cols + col);
        }
    }

    /// Clears cell `(row, col)`; out-of-range coordinates are ignored.
    pub fn reset(&mut self, row: usize, col: usize) {
        if row < self.rows && col < self.cols {
            self.bits.clear_bit(row * self.cols + col);
        }
    }

    /// Returns cell `(row, col)`, or `false` if out of range.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.bits.get_bit(row * self.cols + col)
    }

    pub fn set_all(&mut self) {
        self.bits.set_all();
    }

    pub fn clear_all(&mut self) {
        self.bits.clear_all();
    }

    pub fn all_zero(&self) -> bool {
        self.bits.all_zero()
    }

    pub fn all_one(&self) -> bool {
        self.bits.all_one()
    }

    /// Number of set cells.
    pub fn cardinality(&self) -> usize {
        self.bits.cardinality()
    }

    /// Extracts row `row` as a [`BitSet`] of `cols` bits.
    ///
    /// The row usually straddles block boundaries, so each output block
    /// is stitched together from two adjacent backing blocks.
    ///
    /// # Panics
    ///
    /// Panics if `row >= rows`.
    pub fn row(&self, row: usize) -> BitSet {
        assert!(row < self.rows, "row {row} out of range ({} rows)", self.rows);
        let start = row * self.cols;
        let offset = start / BLOCK_BITS;
        let shift = start % BLOCK_BITS;

        let mut out = BitSet::new(self.cols);
        let num_out_blocks = out.blocks.len();
        for k in 0..num_out_blocks {
            let lo = self.backing_block(offset + k) >> shift;
            let hi = if shift == 0 {
                0
            } else {
                self.backing_block(offset + k + 1) << (BLOCK_BITS - shift)
            };
            out.blocks[k] = lo | hi;
        }
        // Stitching may drag in bits of the next row.
        let tail = self.cols % BLOCK_BITS;
        if tail != 0 {
            out.blocks[num_out_blocks - 1] &= (1 << tail) - 1;
        }
        out
    }

    fn backing_block(&self, index: usize) -> u64 {
        self.bits.blocks.get(index).copied().unwrap_or(0)
    }

    fn assert_same_shape(&self, other: &BitMatrix) {
        assert!(
            self.rows == other.rows && self.cols == other.cols,
            "matrix combinators require operands of equal shape"
        );
    }
}

impl BitAnd for &BitMatrix {
    type Output = BitMatrix;

    fn bitand(self, rhs: &BitMatrix) -> BitMatrix {
        self.assert_same_shape(rhs);
        BitMatrix {
            rows: self.rows,
            cols: self.cols,
            bits: &self.bits & &rhs.bits,
        }
    }
}

impl BitOr for &BitMatrix {
    type Output = BitMatrix;

    fn bitor(self, rhs: &BitMatrix) -> BitMatrix {
        self.assert_same_shape(rhs);
        BitMatrix {
            rows: self.rows,
            cols: self.cols,
            bits: &self.bits | &rhs.bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn set_get_reset() {
        let mut matrix = BitMatrix::new(3, 5);
        matrix.set(1, 4);
        assert!(matrix.get(1, 4));
        assert!(!matrix.get(4, 1));
        matrix.reset(1, 4);
        assert!(matrix.all_zero());
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut matrix = BitMatrix::new(2, 2);
        matrix.set(2, 0);
        matrix.set(0, 2);
        assert!(matrix.all_zero());
        assert!(!matrix.get(2, 0));
        assert!(!matrix.get(0, 2));
    }

    #[test]
    fn row_extraction_unaligned() {
        let mut rng = Pcg64Mcg::seed_from_u64(0xfeed);
        for cols in [1usize, 3, 5, 7, 63, 64, 65, 130] {
            let rows = 9;
            let mut matrix = BitMatrix::new(rows, cols);
            let mut expected = vec![BitSet::new(cols); rows];
            for i in 0..rows {
                for j in 0..cols {
                    if rng.random_bool(0.4) {
                        matrix.set(i, j);
                        expected[i].set_bit(j);
                    }
                }
            }
            for i in 0..rows {
                assert_eq!(matrix.row(i), expected[i], "cols = {cols}, row = {i}");
            }
        }
    }

    #[test]
    #[should_panic]
    fn row_out_of_range_panics() {
        let _ = BitMatrix::new(2, 3).row(2);
    }

    #[test]
    fn combinators() {
        let mut a = BitMatrix::new(4, 9);
        let mut b = BitMatrix::new(4, 9);
        a.set(0, 0);
        a.set(3, 8);
        b.set(3, 8);
        b.set(1, 1);

        let and = &a & &b;
        let or = &a | &b;
        assert_eq!(and.cardinality(), 1);
        assert!(and.get(3, 8));
        assert_eq!(or.cardinality(), 3);
    }

    #[test]
    #[should_panic]
    fn combinator_shape_mismatch_panics() {
        let _ = &BitMatrix::new(2, 3) & &BitMatrix::new(3, 2);
    }

    #[test]
    fn all_one() {
        let mut matrix = BitMatrix::new(3, 7);
        matrix.set_all();
        assert!(matrix.all_one());
        matrix.reset(2, 6);
        assert!(!matrix.all_one());
    }
}
