//! Elementwise binary executor.
//!
//! Computes `out[c] = op(in1[c], in2[c])` for every coordinate `c` of a
//! rect. When the caller signals density and all three accessors expose a
//! contiguous run over the rect, the loop degrades to linear slice
//! iteration with no coordinate reconstruction; otherwise coordinates are
//! walked explicitly in row-major order. The two paths are semantically
//! identical — dense is purely a performance specialization.

use crate::{AccessorRO, AccessorWO, Pitches, Rect};

/// Apply `op` pointwise over `rect`, writing through `out`.
///
/// `dense` asserts that all three accessors address a single contiguous
/// run covering exactly the rect, laid out identically. The assertion is
/// witnessed through the accessors' `ptr` capability; if a witness is
/// missing the executor silently takes the strided path, which produces
/// the same result. A rect of volume zero performs no writes.
///
/// Inputs are never mutated; no validation is performed beyond the bounds
/// proven at accessor construction.
pub fn binary_op<OP, ARG, RES, const DIM: usize>(
    op: OP,
    out: &mut AccessorWO<'_, RES, DIM>,
    in1: &AccessorRO<'_, ARG, DIM>,
    in2: &AccessorRO<'_, ARG, DIM>,
    rect: &Rect<DIM>,
    dense: bool,
) where
    OP: Fn(ARG, ARG) -> RES,
    ARG: Copy,
    RES: Copy,
{
    if dense {
        if let (Some(in1run), Some(in2run)) = (in1.ptr(rect), in2.ptr(rect)) {
            if let Some(outrun) = out.ptr_mut(rect) {
                for (slot, (a, b)) in outrun.iter_mut().zip(in1run.iter().zip(in2run.iter())) {
                    *slot = op(*a, *b);
                }
                return;
            }
        }
    }

    let (pitches, volume) = Pitches::from_rect(rect);
    for idx in 0..volume {
        let point = pitches.unflatten(idx, &rect.lo);
        out.set(&point, op(in1.get(&point), in2.get(&point)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Rect};

    #[test]
    fn test_binary_add_1d_dense_and_strided() {
        let rect = Rect::new(Point::new([0]), Point::new([3]));
        let in1 = [1i64, 2, 3, 4];
        let in2 = [10i64, 20, 30, 40];

        for dense in [true, false] {
            let mut out = [0i64; 4];
            let a = AccessorRO::<i64, 1>::row_major(&in1, &rect).unwrap();
            let b = AccessorRO::<i64, 1>::row_major(&in2, &rect).unwrap();
            let mut o = AccessorWO::<i64, 1>::row_major(&mut out, &rect).unwrap();
            binary_op(|x, y| x + y, &mut o, &a, &b, &rect, dense);
            assert_eq!(out, [11, 22, 33, 44]);
        }
    }

    #[test]
    fn test_dense_flag_degrades_on_strided_input() {
        // Second input is column-major: the dense witness is absent, so the
        // executor must fall back and still produce the dense-path answer.
        let rect = Rect::new(Point::new([0, 0]), Point::new([1, 2]));
        let in1 = [1, 2, 3, 4, 5, 6];
        let in2_colmajor = [10, 40, 20, 50, 30, 60];
        let mut out = [0i32; 6];

        let a = AccessorRO::<i32, 2>::row_major(&in1, &rect).unwrap();
        let b = AccessorRO::<i32, 2>::strided(&in2_colmajor, &rect, [1, 2], 0).unwrap();
        let mut o = AccessorWO::<i32, 2>::row_major(&mut out, &rect).unwrap();
        binary_op(|x, y| x + y, &mut o, &a, &b, &rect, true);

        assert_eq!(out, [11, 22, 33, 44, 55, 66]);
    }

    #[test]
    fn test_zero_volume_is_a_noop() {
        let rect = Rect::new(Point::new([0, 3]), Point::new([4, 2]));
        let data: [i32; 0] = [];
        let mut out: [i32; 0] = [];

        let a = AccessorRO::<i32, 2>::row_major(&data, &rect).unwrap();
        let b = AccessorRO::<i32, 2>::row_major(&data, &rect).unwrap();
        let mut o = AccessorWO::<i32, 2>::row_major(&mut out, &rect).unwrap();
        binary_op(|x, y| x * y, &mut o, &a, &b, &rect, false);
        binary_op(|x, y| x * y, &mut o, &a, &b, &rect, true);
    }

    #[test]
    fn test_mixed_arg_result_types() {
        let rect = Rect::new(Point::new([0]), Point::new([2]));
        let in1 = [1.5f64, 2.5, 3.5];
        let in2 = [1.0f64, 2.0, 3.0];
        let mut out = [false; 3];

        let a = AccessorRO::<f64, 1>::row_major(&in1, &rect).unwrap();
        let b = AccessorRO::<f64, 1>::row_major(&in2, &rect).unwrap();
        let mut o = AccessorWO::<bool, 1>::row_major(&mut out, &rect).unwrap();
        binary_op(|x, y| x > y, &mut o, &a, &b, &rect, false);

        assert_eq!(out, [true, true, true]);
    }
}
