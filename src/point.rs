//! Coordinates, rectangular domains, and pitch tables.
//!
//! A [`Point`] identifies one element's position, a [`Rect`] is a closed
//! axis-aligned box of points, and [`Pitches`] maps flattened linear indices
//! back to coordinates inside a rect. All three are plain `Copy` value types
//! constructed per kernel invocation.

use std::ops::{Add, Index, IndexMut, Sub};

/// An ordered tuple of `DIM` signed coordinates.
///
/// Compared and combined componentwise; the const dimension count keeps
/// rank mismatches out of the type system entirely.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point<const DIM: usize>([i64; DIM]);

impl<const DIM: usize> Point<DIM> {
    /// Create a point from per-dimension coordinates.
    #[inline]
    pub const fn new(coords: [i64; DIM]) -> Self {
        Self(coords)
    }

    /// The origin: all coordinates zero.
    #[inline]
    pub const fn zeroes() -> Self {
        Self([0; DIM])
    }

    /// A point with every coordinate set to `value`.
    #[inline]
    pub const fn splat(value: i64) -> Self {
        Self([value; DIM])
    }

    /// The raw coordinate array.
    #[inline]
    pub const fn coords(&self) -> &[i64; DIM] {
        &self.0
    }
}

impl<const DIM: usize> Index<usize> for Point<DIM> {
    type Output = i64;

    #[inline]
    fn index(&self, dim: usize) -> &i64 {
        &self.0[dim]
    }
}

impl<const DIM: usize> IndexMut<usize> for Point<DIM> {
    #[inline]
    fn index_mut(&mut self, dim: usize) -> &mut i64 {
        &mut self.0[dim]
    }
}

impl<const DIM: usize> Add for Point<DIM> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0.iter()) {
            *o += r;
        }
        Self(out)
    }
}

impl<const DIM: usize> Sub for Point<DIM> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0.iter()) {
            *o -= r;
        }
        Self(out)
    }
}

/// A closed axis-aligned box `[lo, hi]`, inclusive on both ends.
///
/// Degenerate rects (`hi[d] == lo[d] - 1` on some axis) are permitted and
/// have volume zero; every kernel treats them as a valid no-op domain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect<const DIM: usize> {
    /// Inclusive lower corner.
    pub lo: Point<DIM>,
    /// Inclusive upper corner.
    pub hi: Point<DIM>,
}

impl<const DIM: usize> Rect<DIM> {
    /// Create a rect from its inclusive corners.
    #[inline]
    pub const fn new(lo: Point<DIM>, hi: Point<DIM>) -> Self {
        Self { lo, hi }
    }

    /// Number of points along dimension `dim`, clamped to zero when empty.
    #[inline]
    pub fn extent(&self, dim: usize) -> usize {
        (self.hi[dim] - self.lo[dim] + 1).max(0) as usize
    }

    /// Total number of points in the rect; zero if any axis is empty.
    #[inline]
    pub fn volume(&self) -> usize {
        let mut v = 1usize;
        for dim in 0..DIM {
            v *= self.extent(dim);
        }
        v
    }

    /// Whether the rect contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        (0..DIM).any(|dim| self.hi[dim] < self.lo[dim])
    }

    /// Whether `point` lies inside the rect on every axis.
    #[inline]
    pub fn contains(&self, point: &Point<DIM>) -> bool {
        (0..DIM).all(|dim| self.lo[dim] <= point[dim] && point[dim] <= self.hi[dim])
    }
}

/// Precomputed row-major pitch table for one specific rect.
///
/// `pitch[d]` is the number of points spanned by one step along axis `d`
/// (the product of the extents of all later axes), so a flattened linear
/// index decomposes into a coordinate by repeated division. The table is
/// valid only for the exact rect it was derived from.
#[derive(Copy, Clone, Debug)]
pub struct Pitches<const DIM: usize> {
    pitches: [usize; DIM],
}

impl<const DIM: usize> Pitches<DIM> {
    /// Build the pitch table for `rect`, returning it with the rect's volume.
    pub fn from_rect(rect: &Rect<DIM>) -> (Self, usize) {
        let mut pitches = [0usize; DIM];
        let mut pitch = 1usize;
        for dim in (0..DIM).rev() {
            pitches[dim] = pitch;
            pitch *= rect.extent(dim);
        }
        (Self { pitches }, pitch)
    }

    /// Reconstruct the coordinate for flattened index `idx`, relative to `lo`.
    ///
    /// Row-major: the last dimension varies fastest. `idx` must be below the
    /// volume of the rect the table was built from.
    #[inline]
    pub fn unflatten(&self, mut idx: usize, lo: &Point<DIM>) -> Point<DIM> {
        let mut point = *lo;
        for dim in 0..DIM {
            point[dim] += (idx / self.pitches[dim]) as i64;
            idx %= self.pitches[dim];
        }
        point
    }

    /// Flattened row-major index of `point`, relative to `lo`.
    #[inline]
    pub fn flatten(&self, point: &Point<DIM>, lo: &Point<DIM>) -> usize {
        let mut idx = 0usize;
        for dim in 0..DIM {
            idx += (point[dim] - lo[dim]) as usize * self.pitches[dim];
        }
        idx
    }
}
