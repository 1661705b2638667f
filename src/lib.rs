//! Arbitrary-precision floating-point mathematics in any radix from 2 to 36.
//!
//! The central type is [`Apfloat`], a floating point value that carries its
//! radix, its scale, and its precision in radix digits. On top of it the crate
//! provides the transcendental and algebraic functions: roots through a Newton
//! inverse-root iteration, π through the Chudnovskys' binary splitting series,
//! the logarithm through the arithmetic-geometric mean, the exponent through
//! Newton's iteration on the logarithm, and the trigonometric functions
//! through a complex exponent built from the same kernels.
//!
//! Expensive per-radix constants (π with its partial series sums, and the
//! logarithm of the radix) are cached process-wide, so a later request at a
//! higher precision continues from the published state instead of starting
//! over.
//!
//! ```
//! use apmath::Apfloat;
//!
//! let two = Apfloat::from_i64(2, 40, 10).unwrap();
//! let r = two.sqrt().unwrap();
//! assert!(r.to_string().starts_with("1.4142135623730950488"));
//!
//! let pi = apmath::pi_radix(50, 10).unwrap();
//! assert!(pi.to_string().starts_with("3.14159265358979323846"));
//! ```

#![deny(missing_docs)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::collapsible_else_if)]

pub mod ctx;
mod defs;
mod num;
mod ops;

pub use crate::defs::double_precision;
pub use crate::defs::Error;
pub use crate::defs::Precision;
pub use crate::defs::EXTRA_PRECISION;
pub use crate::defs::INFINITE;
pub use crate::defs::MAX_RADIX;
pub use crate::defs::MIN_RADIX;
pub use crate::num::Apfloat;
pub use crate::ops::agm::agm;
pub use crate::ops::complex::Apcomplex;
pub use crate::ops::log::log_radix;
pub use crate::ops::other::multiply_add;
pub use crate::ops::other::multiply_subtract;
pub use crate::ops::other::scale;
pub use crate::ops::pi::pi;
pub use crate::ops::pi::pi_radix;
pub use crate::ops::trig::atan2;
