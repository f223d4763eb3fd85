//! Outer/inner decomposition of a rect's iteration space.
//!
//! [`Splitter::split`] partitions iteration over a rect into an outer loop
//! walking exactly one designated axis and an inner loop walking all other
//! axes jointly, so the outer range can be handed to independent workers
//! while [`Splitter::combine`] reconstructs full coordinates per
//! `(outer_idx, inner_idx)` pair.
//!
//! The outer axis is the first axis index different from `must_be_inner`,
//! scanning from 0 — deliberately *not* the collapsed axis itself. The
//! collapsed axis always folds into the inner loop, which is what lets the
//! reduction engine parallelize the outer range: the outer axis survives the
//! reduction's projection, so distinct outer indices can never collapse into
//! the same destination slot.

use crate::{Point, Rect};

/// Element counts of an outer/inner decomposition.
///
/// Invariant: `outer * inner == rect.volume()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Split {
    /// Extent of the designated outer axis (1 when no axis qualifies).
    pub outer: usize,
    /// Product of the extents of all remaining axes.
    pub inner: usize,
}

/// Decomposes a rect around one axis that must stay in the inner loop.
#[derive(Copy, Clone, Debug)]
pub struct Splitter<const DIM: usize> {
    // DIM is the sentinel for "no outer axis" (rank 1 collapsing its only
    // axis); every dimension then folds into the inner loop.
    outer_dim: usize,
    pitches: [usize; DIM],
}

impl<const DIM: usize> Splitter<DIM> {
    /// Decompose `rect`, keeping `must_be_inner` out of the outer grouping.
    ///
    /// The outer axis is the first axis != `must_be_inner`; its extent
    /// becomes `outer`. Every other axis — including `must_be_inner` itself —
    /// contributes to `inner`, with pitches accumulated in decreasing
    /// dimension order for coordinate reconstruction.
    ///
    /// No bounds validation: `must_be_inner` out of range simply means every
    /// qualifying axis stays inner-grouped except the first, same as any
    /// other non-matching value. Empty rects yield `outer * inner == 0` and
    /// `combine` must not be called for them.
    pub fn split(rect: &Rect<DIM>, must_be_inner: usize) -> (Self, Split) {
        let mut outer_dim = DIM;
        for dim in 0..DIM {
            if dim != must_be_inner {
                outer_dim = dim;
                break;
            }
        }

        let mut outer = 1usize;
        let mut inner = 1usize;
        let mut pitch = 1usize;
        let mut pitches = [0usize; DIM];
        for dim in (0..DIM).rev() {
            let diff = rect.extent(dim);
            if dim == outer_dim {
                outer *= diff;
            } else {
                inner *= diff;
                pitches[dim] = pitch;
                pitch *= diff;
            }
        }

        (Self { outer_dim, pitches }, Split { outer, inner })
    }

    /// Reconstruct the absolute coordinate for `(outer_idx, inner_idx)`,
    /// relative to the rect's lower corner `lo`.
    ///
    /// For `outer_idx in [0, outer)` and `inner_idx in [0, inner)` this is a
    /// bijection onto the rect's points.
    #[inline]
    pub fn combine(&self, outer_idx: usize, mut inner_idx: usize, lo: &Point<DIM>) -> Point<DIM> {
        let mut point = *lo;
        for dim in 0..DIM {
            if dim == self.outer_dim {
                point[dim] += outer_idx as i64;
            } else {
                point[dim] += (inner_idx / self.pitches[dim]) as i64;
                inner_idx %= self.pitches[dim];
            }
        }
        point
    }
}
