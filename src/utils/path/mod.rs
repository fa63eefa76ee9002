//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`normalize`]: Path normalization (`absolutize`, `to_posix`)

mod normalize;

pub use normalize::{absolutize, to_posix};
