//! Axis-collapsing reduction engine.
//!
//! Folds every source value `rhs[c]` into a destination slot shared by all
//! coordinates that differ only along the collapsed axis. Iteration is
//! decomposed by [`Splitter`] into an outer loop over one non-collapsed
//! axis and a sequential inner loop over everything else; with the
//! `parallel` feature the outer range is distributed across rayon workers
//! once the rect exceeds [`MIN_THREAD_LENGTH`] elements.
//!
//! Two destination flavors:
//!
//! - [`unary_red`]: a reduce-accumulate accessor whose folds are lock-free,
//!   so workers may hit the same destination slot concurrently;
//! - [`unary_red_inplace`]: a plain read-write accessor with an explicit
//!   fold operator. Distinct outer indices land in distinct destination
//!   slots because the outer axis survives the collapse, so plain
//!   read-modify-write per worker is race-free by construction.

use crate::accessor::{AccessorRD, AccessorRO, AccessorRW};
use crate::maybe_sync::{MaybeSendSync, MaybeSync};
use crate::reduce_op::{AtomicValue, ReduceOp};
use crate::split::Splitter;
use crate::Rect;

#[cfg(feature = "parallel")]
use crate::MIN_THREAD_LENGTH;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Raw pointer wrapper that can cross thread boundaries.
///
/// Sound only while the workers sharing it write disjoint slots, which the
/// in-place reduction guarantees through the splitter's outer-axis pick.
#[cfg(feature = "parallel")]
#[derive(Copy, Clone)]
struct SendPtr<T>(*mut T);

#[cfg(feature = "parallel")]
unsafe impl<T: Send> Send for SendPtr<T> {}
#[cfg(feature = "parallel")]
unsafe impl<T: Sync> Sync for SendPtr<T> {}

/// Fold `rhs` over `rect` into a reduce-accumulate destination, collapsing
/// `collapsed_dim`.
///
/// Every coordinate `c` contributes `rhs[c]` to `lhs` at `c` itself; the
/// destination accessor's layout is expected to project away the collapsed
/// axis (stride 0 along it), so coordinates differing only there fold into
/// one slot. Concurrent same-slot folds are safe: `reduce` is a lock-free
/// compare-exchange under the accessor's fixed operator.
///
/// A rect of volume zero performs no folds. `collapsed_dim` validity is a
/// caller precondition, as is initializing the destination (typically to
/// the operator's identity).
pub fn unary_red<R, T, const DIM: usize>(
    lhs: &AccessorRD<'_, R, T, DIM>,
    rhs: &AccessorRO<'_, T, DIM>,
    rect: &Rect<DIM>,
    collapsed_dim: usize,
) where
    R: ReduceOp<T>,
    T: Copy + AtomicValue + MaybeSendSync,
{
    let (splitter, split) = Splitter::split(rect, collapsed_dim);

    #[cfg(feature = "parallel")]
    {
        if rect.volume() > MIN_THREAD_LENGTH {
            (0..split.outer).into_par_iter().for_each(|outer_idx| {
                for inner_idx in 0..split.inner {
                    let point = splitter.combine(outer_idx, inner_idx, &rect.lo);
                    lhs.reduce(&point, rhs.get(&point));
                }
            });
            return;
        }
    }

    for outer_idx in 0..split.outer {
        for inner_idx in 0..split.inner {
            let point = splitter.combine(outer_idx, inner_idx, &rect.lo);
            lhs.reduce(&point, rhs.get(&point));
        }
    }
}

/// Fold `rhs` over `rect` into a read-write destination with an explicit
/// fold operator, collapsing `collapsed_dim`.
///
/// Same iteration scheme as [`unary_red`], but destination slots are
/// updated with a plain read-modify-write. This is safe to parallelize
/// because the splitter's outer axis is never the collapsed axis: it
/// survives the collapse, so two distinct outer indices always address
/// distinct destination slots. The fold must be associative for the result
/// to be independent of the inner traversal grouping.
pub fn unary_red_inplace<OP, T, const DIM: usize>(
    lhs: &mut AccessorRW<'_, T, DIM>,
    rhs: &AccessorRO<'_, T, DIM>,
    rect: &Rect<DIM>,
    collapsed_dim: usize,
    fold: OP,
) where
    OP: Fn(&mut T, T) + MaybeSync,
    T: Copy + MaybeSendSync,
{
    let (splitter, split) = Splitter::split(rect, collapsed_dim);

    #[cfg(feature = "parallel")]
    {
        if rect.volume() > MIN_THREAD_LENGTH {
            let base = SendPtr(lhs.as_mut_ptr());
            let len = lhs.len();
            let lhs = &*lhs;
            (0..split.outer).into_par_iter().for_each(|outer_idx| {
                let base = base;
                for inner_idx in 0..split.inner {
                    let point = splitter.combine(outer_idx, inner_idx, &rect.lo);
                    let slot = lhs.slot(&point);
                    debug_assert!(slot >= 0 && (slot as usize) < len);
                    // Disjoint across outer_idx: the outer axis survives the
                    // collapse, so this slot belongs to this worker alone.
                    unsafe {
                        fold(&mut *base.0.add(slot as usize), rhs.get(&point));
                    }
                }
            });
            return;
        }
    }

    for outer_idx in 0..split.outer {
        for inner_idx in 0..split.inner {
            let point = splitter.combine(outer_idx, inner_idx, &rect.lo);
            let value = rhs.get(&point);
            let mut acc = lhs.get(&point);
            fold(&mut acc, value);
            lhs.set(&point, acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce_op::{MaxReduction, SumReduction};
    use crate::{Point, Rect};

    #[test]
    fn test_sum_collapse_last_dim() {
        // [[1,2,3],[4,5,6]] collapsed along dim 1 -> [6, 15].
        let rect = Rect::new(Point::new([0, 0]), Point::new([1, 2]));
        let src = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut dst = [0.0f64; 2];

        let rhs = AccessorRO::<f64, 2>::row_major(&src, &rect).unwrap();
        // Destination drops dim 1: stride 0 along the collapsed axis.
        let lhs = AccessorRD::<SumReduction, f64, 2>::strided(&mut dst, &rect, [1, 0], 0).unwrap();
        unary_red(&lhs, &rhs, &rect, 1);
        drop(lhs);

        assert_eq!(dst, [6.0, 15.0]);
    }

    #[test]
    fn test_sum_collapse_first_dim() {
        // Same source collapsed along dim 0 -> [5, 7, 9].
        let rect = Rect::new(Point::new([0, 0]), Point::new([1, 2]));
        let src = [1i64, 2, 3, 4, 5, 6];
        let mut dst = [0i64; 3];

        let rhs = AccessorRO::<i64, 2>::row_major(&src, &rect).unwrap();
        let lhs = AccessorRD::<SumReduction, i64, 2>::strided(&mut dst, &rect, [0, 1], 0).unwrap();
        unary_red(&lhs, &rhs, &rect, 0);
        drop(lhs);

        assert_eq!(dst, [5, 7, 9]);
    }

    #[test]
    fn test_max_collapse() {
        let rect = Rect::new(Point::new([0, 0]), Point::new([1, 2]));
        let src = [3i32, 9, 1, 7, 2, 8];
        let mut dst = [i32::MIN; 2];

        let rhs = AccessorRO::<i32, 2>::row_major(&src, &rect).unwrap();
        let lhs = AccessorRD::<MaxReduction, i32, 2>::strided(&mut dst, &rect, [1, 0], 0).unwrap();
        unary_red(&lhs, &rhs, &rect, 1);
        drop(lhs);

        assert_eq!(dst, [9, 8]);
    }

    #[test]
    fn test_inplace_fold_matches_reduce_accessor() {
        let rect = Rect::new(Point::new([0, 0, 0]), Point::new([2, 3, 1]));
        let src: Vec<f64> = (0..rect.volume()).map(|v| v as f64).collect();
        let volume_kept = 3 * 2;

        let mut via_rd = vec![0.0f64; volume_kept];
        let rhs = AccessorRO::<f64, 3>::row_major(&src, &rect).unwrap();
        let lhs =
            AccessorRD::<SumReduction, f64, 3>::strided(&mut via_rd, &rect, [2, 0, 1], 0).unwrap();
        unary_red(&lhs, &rhs, &rect, 1);
        drop(lhs);

        let mut via_rw = vec![0.0f64; volume_kept];
        let mut lhs = AccessorRW::<f64, 3>::strided(&mut via_rw, &rect, [2, 0, 1], 0).unwrap();
        unary_red_inplace(&mut lhs, &rhs, &rect, 1, |acc, v| *acc += v);
        drop(lhs);

        assert_eq!(via_rd, via_rw);
    }

    #[test]
    fn test_rank_one_collapse_to_scalar() {
        let rect = Rect::new(Point::new([0]), Point::new([4]));
        let src = [1i64, 2, 3, 4, 5];
        let mut dst = [0i64];

        let rhs = AccessorRO::<i64, 1>::row_major(&src, &rect).unwrap();
        let lhs = AccessorRD::<SumReduction, i64, 1>::strided(&mut dst, &rect, [0], 0).unwrap();
        unary_red(&lhs, &rhs, &rect, 0);
        drop(lhs);

        assert_eq!(dst, [15]);
    }

    #[test]
    fn test_empty_rect_folds_nothing() {
        let rect = Rect::new(Point::new([0, 2]), Point::new([3, 1]));
        let src: [f64; 0] = [];
        let mut dst = [0.25f64; 4];

        let rhs = AccessorRO::<f64, 2>::row_major(&src, &rect).unwrap();
        let lhs = AccessorRD::<SumReduction, f64, 2>::strided(&mut dst, &rect, [1, 0], 0).unwrap();
        unary_red(&lhs, &rhs, &rect, 1);
        drop(lhs);

        assert_eq!(dst, [0.25; 4]);
    }
}
