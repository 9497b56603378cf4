/*!
Bit-level substrate: fixed-size bitsets and dense bit matrices.
*/

mod matrix;
mod set;

pub use matrix::BitMatrix;
pub use set::BitSet;
