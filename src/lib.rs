//! Elementwise and axis-collapsing reduction kernels over N-dimensional
//! rectangular regions.
//!
//! This crate iterates axis-aligned index boxes ([`Rect`]) and applies
//! caller-supplied operation functors through capability-typed accessors.
//! Two iteration strategies are selected at dispatch time:
//!
//! - **dense path**: when every participating accessor addresses one
//!   contiguous, identically laid out memory run over the rect, the kernels
//!   degrade to a linear loop over raw slices with no coordinate math;
//! - **strided path**: the general case walks coordinates explicitly in
//!   row-major order (last dimension varies fastest) through the accessors'
//!   addressed getters and setters.
//!
//! Both paths produce identical results for the same logical inputs.
//!
//! # Core Types
//!
//! - [`Point`], [`Rect`], [`Pitches`]: the shared coordinate/domain model
//! - [`AccessorRO`], [`AccessorWO`], [`AccessorRW`], [`AccessorRD`]:
//!   capability views over caller memory; which of `get`/`set`/`reduce` is
//!   legal is enforced per type at compile time
//! - [`Split`] / [`Splitter`]: decomposition of a rect's iteration space
//!   into a parallelizable outer loop and a sequential inner loop
//! - [`ReduceOp`] and the stock [`SumReduction`], [`ProdReduction`],
//!   [`MaxReduction`], [`MinReduction`] fold operators
//!
//! # Primary API
//!
//! - [`binary_op`]: `out[c] = op(in1[c], in2[c])` for every coordinate `c`
//!   in a rect, dense or strided
//! - [`unary_red`]: fold a source view into a reduce-accumulate destination,
//!   collapsing one axis; the outer loop is data-parallel
//! - [`unary_red_inplace`]: same collapse through a read-write destination
//!   and an explicit fold operator
//!
//! # Example
//!
//! ```rust
//! use rect_kernel::{binary_op, AccessorRO, AccessorWO, Point, Rect};
//!
//! let rect = Rect::new(Point::new([0]), Point::new([3]));
//! let in1 = [1i64, 2, 3, 4];
//! let in2 = [10i64, 20, 30, 40];
//! let mut out = [0i64; 4];
//!
//! let a = AccessorRO::<i64, 1>::row_major(&in1, &rect).unwrap();
//! let b = AccessorRO::<i64, 1>::row_major(&in2, &rect).unwrap();
//! let mut o = AccessorWO::<i64, 1>::row_major(&mut out, &rect).unwrap();
//!
//! binary_op(|x, y| x + y, &mut o, &a, &b, &rect, true);
//! assert_eq!(out, [11, 22, 33, 44]);
//! ```
//!
//! # Concurrency
//!
//! With the `parallel` feature (default), the reduction engine parallelizes
//! its outer loop across rayon workers once a rect exceeds
//! [`MIN_THREAD_LENGTH`] elements. Concurrent folds into the same
//! destination slot go through [`AccessorRD`]'s lock-free compare-exchange
//! fold; the read-write variant relies on the splitter's outer axis being
//! disjoint from the collapsed axis, so distinct outer indices always write
//! distinct destination slots.

mod accessor;
mod elementwise;
mod maybe_sync;
mod point;
mod reduce_op;
mod reduction;
mod split;

// ============================================================================
// Coordinate / domain model
// ============================================================================
pub use point::{Pitches, Point, Rect};

// ============================================================================
// Capability accessors
// ============================================================================
pub use accessor::{AccessorRD, AccessorRO, AccessorRW, AccessorWO};

// ============================================================================
// Reduction operators
// ============================================================================
pub use reduce_op::{
    AtomicValue, MaxReduction, MinReduction, ProdReduction, ReduceOp, SumReduction,
};

// ============================================================================
// Kernels
// ============================================================================
pub use elementwise::binary_op;
pub use reduction::{unary_red, unary_red_inplace};
pub use split::{Split, Splitter};

pub use maybe_sync::{MaybeSend, MaybeSendSync, MaybeSync};

// ============================================================================
// Constants
// ============================================================================

/// Minimum number of elements before the reduction engine goes parallel.
///
/// Rects at or below this volume always run on the calling thread; the
/// fork-join overhead dominates below it.
pub const MIN_THREAD_LENGTH: usize = 1 << 15;

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur while binding accessors to memory.
///
/// The kernels themselves never raise errors: a rect of volume zero is a
/// valid no-op domain, and shape/type compatibility is a caller
/// precondition. Only accessor construction is checked, so that every slot
/// an accessor can address is proven in bounds up front.
#[derive(Debug, thiserror::Error)]
pub enum RectError {
    /// The affine layout addresses a slot outside the backing slice.
    #[error("layout exceeds backing storage: slot {slot} >= len {len}")]
    OutOfBounds { slot: usize, len: usize },

    /// The affine layout maps a coordinate below the start of the slice.
    #[error("layout maps below backing storage: offset {0}")]
    NegativeOffset(isize),
}

/// Result type for accessor construction.
pub type Result<T> = std::result::Result<T, RectError>;
