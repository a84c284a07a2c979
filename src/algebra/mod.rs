//! Symbolic algebra
//! 
//! Points are linear combinations over a growing basis of vectors,
//! and scalar expressions are linear combinations of function values,
//! Gram matrix entries and a constant.
//! Nothing numeric is formed until the SDP is assembled.

mod basis;
mod point;
mod expression;

pub use basis::*;
pub use point::*;
pub use expression::*;
