/*!
A fixed-size bitset over `u64` blocks.

Bits beyond the logical size are kept zero at all times, so block-wise
equality and population counts never need a special tail case.
*/

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign};

use crate::error::Error;

type Block = u64;
const BLOCK_BITS: usize = Block::BITS as usize;

/// A bitset with a fixed number of bits.
///
/// Reads out of range return `false`; writes out of range are ignored.
/// Binary combinators require operands of equal size and panic otherwise,
/// except [`BitSet::diff`] which reports the mismatch as an [`Error`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    num_bits: usize,
    pub(super) blocks: Vec<Block>,
}

impl BitSet {
    /// Creates a bitset of `num_bits` bits, all cleared.
    pub fn new(num_bits: usize) -> Self {
        Self {
            num_bits,
            blocks: vec![0; num_bits.div_ceil(BLOCK_BITS)],
        }
    }

    /// Creates a bitset of `num_bits` bits, all set.
    pub fn new_all_set(num_bits: usize) -> Self {
        let mut set = Self::new(num_bits);
        set.set_all();
        set
    }

    /// Creates a bitset with exactly the given bits set.
    pub fn new_with_bits_set<I: IntoIterator<Item = usize>>(num_bits: usize, bits: I) -> Self {
        let mut set = Self::new(num_bits);
        for bit in bits {
            set.set_bit(bit);
        }
        set
    }

    /// Number of bits the set was created with.
    pub fn number_of_bits(&self) -> usize {
        self.num_bits
    }

    /// Sets bit `index` and returns its previous value.
    ///
    /// Out-of-range indices are ignored and reported as `false`.
    pub fn set_bit(&mut self, index: usize) -> bool {
        if index >= self.num_bits {
            return false;
        }
        let mask = 1 << (index % BLOCK_BITS);
        let block = &mut self.blocks[index / BLOCK_BITS];
        let prev = *block & mask != 0;
        *block |= mask;
        prev
    }

    /// Clears bit `index` and returns its previous value.
    ///
    /// Out-of-range indices are ignored and reported as `false`.
    pub fn clear_bit(&mut self, index: usize) -> bool {
        if index >= self.num_bits {
            return false;
        }
        let mask = 1 << (index % BLOCK_BITS);
        let block = &mut self.blocks[index / BLOCK_BITS];
        let prev = *block & mask != 0;
        *block &= !mask;
        prev
    }

    /// Returns bit `index`, or `false` if `index` is out of range.
    pub fn get_bit(&self, index: usize) -> bool {
        if index >= self.num_bits {
            return false;
        }
        self.blocks[index / BLOCK_BITS] & (1 << (index % BLOCK_BITS)) != 0
    }

    /// Sets every bit.
    pub fn set_all(&mut self) {
        self.blocks.fill(!0);
        self.mask_tail();
    }

    /// Clears every bit.
    pub fn clear_all(&mut self) {
        self.blocks.fill(0);
    }

    /// `true` iff no bit is set. Vacuously `true` for the empty set.
    pub fn all_zero(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }

    /// `true` iff every bit is set. Vacuously `true` for the empty set.
    pub fn all_one(&self) -> bool {
        self.cardinality() == self.num_bits
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> usize {
        self.blocks.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterates over the indices of all set bits in increasing order.
    pub fn iter_set_bits(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().enumerate().flat_map(|(i, &block)| {
            let mut rest = block;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * BLOCK_BITS + bit)
            })
        })
    }

    /// `true` iff every bit set in `other` is also set in `self`.
    ///
    /// `other` may be shorter than `self`; only its bits participate.
    pub fn is_superset_of(&self, other: &BitSet) -> bool {
        if self.num_bits < other.num_bits {
            return false;
        }
        self.blocks
            .iter()
            .zip(&other.blocks)
            .all(|(&a, &b)| a & b == b)
    }

    /// `true` iff every bit set in `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &BitSet) -> bool {
        other.is_superset_of(self)
    }

    /// Indices at which `self` and `other` disagree.
    ///
    /// Unlike the panicking combinators, a size mismatch is reported as
    /// an [`Error::SizeMismatch`] so callers can surface it.
    pub fn diff(&self, other: &BitSet) -> Result<Vec<usize>, Error> {
        if self.num_bits != other.num_bits {
            return Err(Error::SizeMismatch(self.num_bits, other.num_bits));
        }
        let mut bits = Vec::new();
        for (i, (&a, &b)) in self.blocks.iter().zip(&other.blocks).enumerate() {
            let mut rest = a ^ b;
            while rest != 0 {
                bits.push(i * BLOCK_BITS + rest.trailing_zeros() as usize);
                rest &= rest - 1;
            }
        }
        Ok(bits)
    }

    /// Zeroes all bits at positions `>= num_bits` in the last block.
    fn mask_tail(&mut self) {
        let tail = self.num_bits % BLOCK_BITS;
        if tail != 0 {
            if let Some(last) = self.blocks.last_mut() {
                *last &= (1 << tail) - 1;
            }
        }
    }

    fn assert_same_size(&self, other: &BitSet) {
        assert_eq!(
            self.num_bits, other.num_bits,
            "bitset combinators require operands of equal size"
        );
    }
}

impl std::fmt::Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter_set_bits()).finish()
    }
}

impl PartialOrd for BitSet {
    /// `<` and `>` encode strict sub-/superset relations; unrelated sets
    /// compare as `None`.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering::*;
        match (self.is_subset_of(other), self.is_superset_of(other)) {
            (true, true) => Some(Equal),
            (true, false) => Some(Less),
            (false, true) => Some(Greater),
            (false, false) => None,
        }
    }
}

macro_rules! impl_bitset_ops {
    ($($trait : ident :: $func : ident => $assign_trait : ident :: $assign_func : ident),*) => {
        $(
            impl $trait for &BitSet {
                type Output = BitSet;

                fn $func(self, rhs: &BitSet) -> BitSet {
                    self.assert_same_size(rhs);
                    BitSet {
                        num_bits: self.num_bits,
                        blocks: self
                            .blocks
                            .iter()
                            .zip(&rhs.blocks)
                            .map(|(&a, &b)| $trait::$func(a, b))
                            .collect(),
                    }
                }
            }

            impl $assign_trait<&BitSet> for BitSet {
                fn $assign_func(&mut self, rhs: &BitSet) {
                    self.assert_same_size(rhs);
                    for (a, &b) in self.blocks.iter_mut().zip(&rhs.blocks) {
                        $assign_trait::$assign_func(a, b);
                    }
                }
            }
        )*
    };
}

impl_bitset_ops!(
    BitAnd::bitand => BitAndAssign::bitand_assign,
    BitOr::bitor => BitOrAssign::bitor_assign,
    BitXor::bitxor => BitXorAssign::bitxor_assign
);
