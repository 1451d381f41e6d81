//! Reversible preprocessing transforms
//!
//! Both transforms run before the block encoder and are undone after the
//! block decoder. They only add redundancy; neither is needed to read the
//! block format itself.

pub mod json;
pub mod utf8;

pub use json::{postprocess, preprocess, Token};
pub use utf8::{case_fold, delta_decode, delta_encode};
