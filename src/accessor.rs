//! Capability-typed accessors binding rects to caller memory.
//!
//! Each accessor maps coordinates inside some [`Rect`] to element slots of a
//! caller-supplied slice through an affine layout (per-dimension element
//! strides plus an origin). The capability split is enforced by the type:
//!
//! - [`AccessorRO`]: `get` only
//! - [`AccessorWO`]: `set` only
//! - [`AccessorRW`]: `get` and `set`
//! - [`AccessorRD`]: `reduce` only — an associative in-place fold that never
//!   returns the prior value and is safe for concurrent same-slot use
//!
//! Construction validates that every slot the rect can reach is in bounds,
//! so the per-element hot paths skip bounds checks entirely. When the layout
//! is dense row-major over a rect, `ptr`/`ptr_mut` expose the underlying run
//! as a plain slice of exactly `rect.volume()` elements; this is the witness
//! the dense fast path is built on.

use std::marker::PhantomData;

use crate::reduce_op::{AtomicValue, ReduceOp};
use crate::{Point, Rect, RectError, Result};

/// Affine coordinate-to-slot map shared by all accessor flavors.
#[derive(Copy, Clone, Debug)]
struct AffineLayout<const DIM: usize> {
    origin: Point<DIM>,
    strides: [isize; DIM],
    offset: isize,
}

impl<const DIM: usize> AffineLayout<DIM> {
    #[inline]
    fn slot(&self, point: &Point<DIM>) -> isize {
        let mut slot = self.offset;
        for dim in 0..DIM {
            slot += (point[dim] - self.origin[dim]) as isize * self.strides[dim];
        }
        slot
    }

    /// Verify that every point of `rect` maps into `[0, len)`.
    ///
    /// Extremes are reached at rect corners, one per stride sign, so the
    /// check is O(DIM) rather than O(volume). Empty rects address nothing.
    fn validate(&self, rect: &Rect<DIM>, len: usize) -> Result<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let base = self.slot(&rect.lo);
        let mut min = base;
        let mut max = base;
        for dim in 0..DIM {
            let span = (rect.extent(dim) as isize - 1) * self.strides[dim];
            if span >= 0 {
                max += span;
            } else {
                min += span;
            }
        }
        if min < 0 {
            return Err(RectError::NegativeOffset(min));
        }
        if max as usize >= len {
            return Err(RectError::OutOfBounds {
                slot: max as usize,
                len,
            });
        }
        Ok(())
    }

    /// Slot of `rect.lo` when the layout is a dense row-major run over
    /// `rect`, `None` otherwise. Axes of extent <= 1 never vary and are
    /// ignored, like any contiguity test over degenerate dimensions.
    fn contiguous_base(&self, rect: &Rect<DIM>) -> Option<usize> {
        let mut expected = 1isize;
        for dim in (0..DIM).rev() {
            let extent = rect.extent(dim);
            if extent <= 1 {
                continue;
            }
            if self.strides[dim] != expected {
                return None;
            }
            expected *= extent as isize;
        }
        let base = self.slot(&rect.lo);
        (base >= 0).then_some(base as usize)
    }
}

fn row_major_layout<const DIM: usize>(rect: &Rect<DIM>) -> AffineLayout<DIM> {
    let mut strides = [0isize; DIM];
    let mut pitch = 1isize;
    for dim in (0..DIM).rev() {
        strides[dim] = pitch;
        pitch *= rect.extent(dim) as isize;
    }
    AffineLayout {
        origin: rect.lo,
        strides,
        offset: 0,
    }
}

// ============================================================================
// Read-only
// ============================================================================

/// Read-only accessor: `get(point) -> T`.
#[derive(Debug)]
pub struct AccessorRO<'a, T, const DIM: usize> {
    data: &'a [T],
    layout: AffineLayout<DIM>,
}

impl<'a, T, const DIM: usize> AccessorRO<'a, T, DIM> {
    /// Bind `data` as a dense row-major run over `rect` (lo maps to slot 0).
    pub fn row_major(data: &'a [T], rect: &Rect<DIM>) -> Result<Self> {
        let layout = row_major_layout(rect);
        layout.validate(rect, data.len())?;
        Ok(Self { data, layout })
    }

    /// Bind `data` with explicit per-dimension strides and a base offset for
    /// `rect.lo`. Strides may be negative; every point of `rect` must map in
    /// bounds.
    pub fn strided(
        data: &'a [T],
        rect: &Rect<DIM>,
        strides: [isize; DIM],
        offset: isize,
    ) -> Result<Self> {
        let layout = AffineLayout {
            origin: rect.lo,
            strides,
            offset,
        };
        layout.validate(rect, data.len())?;
        Ok(Self { data, layout })
    }

    /// The contiguous run covering exactly `rect`, if this accessor is a
    /// dense row-major layout over it. This is an optimization witness, not
    /// a correctness requirement; callers fall back to `get` when absent.
    pub fn ptr(&self, rect: &Rect<DIM>) -> Option<&'a [T]> {
        let base = self.layout.contiguous_base(rect)?;
        self.data.get(base..base + rect.volume())
    }
}

impl<'a, T: Copy, const DIM: usize> AccessorRO<'a, T, DIM> {
    /// Read the value at `point`.
    #[inline]
    pub fn get(&self, point: &Point<DIM>) -> T {
        let slot = self.layout.slot(point);
        debug_assert!(slot >= 0 && (slot as usize) < self.data.len());
        unsafe { *self.data.get_unchecked(slot as usize) }
    }
}

// ============================================================================
// Write-only
// ============================================================================

/// Write-only accessor: `set(point, value)`.
#[derive(Debug)]
pub struct AccessorWO<'a, T, const DIM: usize> {
    data: &'a mut [T],
    layout: AffineLayout<DIM>,
}

impl<'a, T, const DIM: usize> AccessorWO<'a, T, DIM> {
    /// Bind `data` as a dense row-major run over `rect`.
    pub fn row_major(data: &'a mut [T], rect: &Rect<DIM>) -> Result<Self> {
        let layout = row_major_layout(rect);
        layout.validate(rect, data.len())?;
        Ok(Self { data, layout })
    }

    /// Bind `data` with explicit strides; see [`AccessorRO::strided`].
    pub fn strided(
        data: &'a mut [T],
        rect: &Rect<DIM>,
        strides: [isize; DIM],
        offset: isize,
    ) -> Result<Self> {
        let layout = AffineLayout {
            origin: rect.lo,
            strides,
            offset,
        };
        layout.validate(rect, data.len())?;
        Ok(Self { data, layout })
    }

    /// The mutable contiguous run covering exactly `rect`, if dense.
    pub fn ptr_mut(&mut self, rect: &Rect<DIM>) -> Option<&mut [T]> {
        let base = self.layout.contiguous_base(rect)?;
        let volume = rect.volume();
        self.data.get_mut(base..base + volume)
    }

    /// Write `value` at `point`.
    #[inline]
    pub fn set(&mut self, point: &Point<DIM>, value: T) {
        let slot = self.layout.slot(point);
        debug_assert!(slot >= 0 && (slot as usize) < self.data.len());
        unsafe {
            *self.data.get_unchecked_mut(slot as usize) = value;
        }
    }
}

// ============================================================================
// Read-write
// ============================================================================

/// Read-write accessor: `get` and `set`.
#[derive(Debug)]
pub struct AccessorRW<'a, T, const DIM: usize> {
    data: &'a mut [T],
    layout: AffineLayout<DIM>,
}

impl<'a, T, const DIM: usize> AccessorRW<'a, T, DIM> {
    /// Bind `data` as a dense row-major run over `rect`.
    pub fn row_major(data: &'a mut [T], rect: &Rect<DIM>) -> Result<Self> {
        let layout = row_major_layout(rect);
        layout.validate(rect, data.len())?;
        Ok(Self { data, layout })
    }

    /// Bind `data` with explicit strides; see [`AccessorRO::strided`].
    pub fn strided(
        data: &'a mut [T],
        rect: &Rect<DIM>,
        strides: [isize; DIM],
        offset: isize,
    ) -> Result<Self> {
        let layout = AffineLayout {
            origin: rect.lo,
            strides,
            offset,
        };
        layout.validate(rect, data.len())?;
        Ok(Self { data, layout })
    }

    /// The mutable contiguous run covering exactly `rect`, if dense.
    pub fn ptr_mut(&mut self, rect: &Rect<DIM>) -> Option<&mut [T]> {
        let base = self.layout.contiguous_base(rect)?;
        let volume = rect.volume();
        self.data.get_mut(base..base + volume)
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn slot(&self, point: &Point<DIM>) -> isize {
        self.layout.slot(point)
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }
}

impl<'a, T: Copy, const DIM: usize> AccessorRW<'a, T, DIM> {
    /// Read the value at `point`.
    #[inline]
    pub fn get(&self, point: &Point<DIM>) -> T {
        let slot = self.layout.slot(point);
        debug_assert!(slot >= 0 && (slot as usize) < self.data.len());
        unsafe { *self.data.get_unchecked(slot as usize) }
    }

    /// Write `value` at `point`.
    #[inline]
    pub fn set(&mut self, point: &Point<DIM>, value: T) {
        let slot = self.layout.slot(point);
        debug_assert!(slot >= 0 && (slot as usize) < self.data.len());
        unsafe {
            *self.data.get_unchecked_mut(slot as usize) = value;
        }
    }
}

// ============================================================================
// Reduce-accumulate
// ============================================================================

/// Reduce-accumulate accessor: `reduce(point, value)` only.
///
/// The destination is shared by value of `&self`, so any number of workers
/// may fold into it concurrently; every fold is a lock-free compare-exchange
/// of the slot's bit pattern under the fixed operator `R`. The prior value
/// is never observable through this type.
#[derive(Debug)]
pub struct AccessorRD<'a, R, T, const DIM: usize> {
    data: *mut T,
    len: usize,
    layout: AffineLayout<DIM>,
    _marker: PhantomData<(&'a mut [T], R)>,
}

// Sharing is sound because every write goes through AtomicValue's CAS loop
// and reads of prior values are not exposed.
unsafe impl<R, T: Send + Sync, const DIM: usize> Send for AccessorRD<'_, R, T, DIM> {}
unsafe impl<R, T: Send + Sync, const DIM: usize> Sync for AccessorRD<'_, R, T, DIM> {}

impl<'a, R, T, const DIM: usize> AccessorRD<'a, R, T, DIM> {
    /// Bind `data` as a dense row-major run over `rect`.
    pub fn row_major(data: &'a mut [T], rect: &Rect<DIM>) -> Result<Self> {
        let layout = row_major_layout(rect);
        layout.validate(rect, data.len())?;
        Ok(Self {
            data: data.as_mut_ptr(),
            len: data.len(),
            layout,
            _marker: PhantomData,
        })
    }

    /// Bind `data` with explicit strides; see [`AccessorRO::strided`].
    pub fn strided(
        data: &'a mut [T],
        rect: &Rect<DIM>,
        strides: [isize; DIM],
        offset: isize,
    ) -> Result<Self> {
        let layout = AffineLayout {
            origin: rect.lo,
            strides,
            offset,
        };
        layout.validate(rect, data.len())?;
        Ok(Self {
            data: data.as_mut_ptr(),
            len: data.len(),
            layout,
            _marker: PhantomData,
        })
    }
}

impl<'a, R, T, const DIM: usize> AccessorRD<'a, R, T, DIM>
where
    R: ReduceOp<T>,
    T: AtomicValue,
{
    /// Fold `value` into the slot at `point` under the operator `R`.
    #[inline]
    pub fn reduce(&self, point: &Point<DIM>, value: T) {
        let slot = self.layout.slot(point);
        debug_assert!(slot >= 0 && (slot as usize) < self.len);
        unsafe {
            R::fold_atomic(self.data.add(slot as usize), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce_op::SumReduction;

    #[test]
    fn test_row_major_get_set() {
        let rect = Rect::new(Point::new([0, 0]), Point::new([1, 2]));
        let data = [1, 2, 3, 4, 5, 6];
        let acc = AccessorRO::<i32, 2>::row_major(&data, &rect).unwrap();
        assert_eq!(acc.get(&Point::new([0, 0])), 1);
        assert_eq!(acc.get(&Point::new([0, 2])), 3);
        assert_eq!(acc.get(&Point::new([1, 1])), 5);

        let mut out = [0i32; 6];
        let mut wo = AccessorWO::<i32, 2>::row_major(&mut out, &rect).unwrap();
        wo.set(&Point::new([1, 2]), 9);
        assert_eq!(out[5], 9);
    }

    #[test]
    fn test_row_major_with_negative_lo() {
        let rect = Rect::new(Point::new([-1, -1]), Point::new([0, 1]));
        let data = [10, 11, 12, 20, 21, 22];
        let acc = AccessorRO::<i32, 2>::row_major(&data, &rect).unwrap();
        assert_eq!(acc.get(&Point::new([-1, -1])), 10);
        assert_eq!(acc.get(&Point::new([0, 1])), 22);
    }

    #[test]
    fn test_strided_column_major() {
        // 2x3 rect over column-major storage: stride [1, 2].
        let rect = Rect::new(Point::new([0, 0]), Point::new([1, 2]));
        let data = [1, 4, 2, 5, 3, 6]; // columns of [[1,2,3],[4,5,6]]
        let acc = AccessorRO::<i32, 2>::strided(&data, &rect, [1, 2], 0).unwrap();
        assert_eq!(acc.get(&Point::new([0, 0])), 1);
        assert_eq!(acc.get(&Point::new([0, 2])), 3);
        assert_eq!(acc.get(&Point::new([1, 1])), 5);
        // Column-major is not row-major contiguous.
        assert!(acc.ptr(&rect).is_none());
    }

    #[test]
    fn test_ptr_dense_witness() {
        let rect = Rect::new(Point::new([2, 0]), Point::new([3, 3]));
        let data: Vec<i32> = (0..8).collect();
        let acc = AccessorRO::<i32, 2>::row_major(&data, &rect).unwrap();
        let run = acc.ptr(&rect).unwrap();
        assert_eq!(run.len(), rect.volume());
        assert_eq!(run[0], 0);
        assert_eq!(run[7], 7);
    }

    #[test]
    fn test_ptr_ignores_unit_extent_axes() {
        // A 1xN rect is contiguous whatever the leading stride claims.
        let rect = Rect::new(Point::new([0, 0]), Point::new([0, 3]));
        let data = [7, 8, 9, 10];
        let acc = AccessorRO::<i32, 2>::strided(&data, &rect, [999, 1], 0).unwrap();
        assert_eq!(acc.ptr(&rect).unwrap(), &[7, 8, 9, 10]);
    }

    #[test]
    fn test_out_of_bounds_layout_rejected() {
        let rect = Rect::new(Point::new([0]), Point::new([9]));
        let data = [0i32; 5];
        assert!(matches!(
            AccessorRO::<i32, 1>::row_major(&data, &rect),
            Err(RectError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_negative_offset_rejected() {
        let rect = Rect::new(Point::new([0]), Point::new([3]));
        let data = [0i32; 8];
        assert!(matches!(
            AccessorRO::<i32, 1>::strided(&data, &rect, [-1], 0),
            Err(RectError::NegativeOffset(_))
        ));
        // Same strides with a base offset inside the slice are fine.
        let acc = AccessorRO::<i32, 1>::strided(&data, &rect, [-1], 3).unwrap();
        assert_eq!(acc.get(&Point::new([3])), data[0]);
    }

    #[test]
    fn test_empty_rect_binds_to_empty_slice() {
        let rect = Rect::new(Point::new([0, 1]), Point::new([5, 0]));
        let data: [f64; 0] = [];
        assert!(AccessorRO::<f64, 2>::row_major(&data, &rect).is_ok());
    }

    #[test]
    fn test_reduce_accessor_folds_in_place() {
        let rect = Rect::new(Point::new([0]), Point::new([2]));
        let mut data = [0.0f64; 3];
        let rd = AccessorRD::<SumReduction, f64, 1>::row_major(&mut data, &rect).unwrap();
        rd.reduce(&Point::new([1]), 2.5);
        rd.reduce(&Point::new([1]), 1.5);
        rd.reduce(&Point::new([2]), -1.0);
        drop(rd);
        assert_eq!(data, [0.0, 4.0, -1.0]);
    }
}
