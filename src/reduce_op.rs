//! Associative fold operators for reduce-accumulate destinations.
//!
//! A [`ReduceOp`] pairs an identity element with an associative, commutative
//! in-place fold. The reduce-accumulate accessor applies it either directly
//! (sequential) or through [`AtomicValue`]'s lock-free compare-exchange
//! update when multiple workers may fold into the same slot.

use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, AtomicU8, Ordering};

use num_traits::{Bounded, One, Zero};

/// Primitive element types that support a lock-free read-modify-write on
/// their raw bit pattern.
///
/// The update loops on a compare-exchange of the value's bits, so it is safe
/// for any number of threads to update the same slot concurrently, provided
/// every concurrent access goes through this trait.
pub trait AtomicValue: bytemuck::Pod {
    /// Atomically replace the value at `slot` with `f(current)`.
    ///
    /// # Safety
    /// `slot` must be valid for reads and writes, aligned for `Self`, and
    /// all concurrent access to it must go through `atomic_update`.
    unsafe fn atomic_update(slot: *mut Self, f: impl Fn(Self) -> Self);
}

macro_rules! impl_atomic_value {
    ($($t:ty => ($atomic:ty, $bits:ty)),* $(,)?) => {
        $(
            impl AtomicValue for $t {
                #[inline]
                unsafe fn atomic_update(slot: *mut Self, f: impl Fn(Self) -> Self) {
                    let atom = &*(slot as *const $atomic);
                    let mut current = atom.load(Ordering::Relaxed);
                    loop {
                        let next: $bits = bytemuck::cast(f(bytemuck::cast::<$bits, $t>(current)));
                        match atom.compare_exchange_weak(
                            current,
                            next,
                            Ordering::Relaxed,
                            Ordering::Relaxed,
                        ) {
                            Ok(_) => return,
                            Err(observed) => current = observed,
                        }
                    }
                }
            }
        )*
    };
}

impl_atomic_value! {
    i8 => (AtomicU8, u8),
    u8 => (AtomicU8, u8),
    i16 => (AtomicU16, u16),
    u16 => (AtomicU16, u16),
    i32 => (AtomicU32, u32),
    u32 => (AtomicU32, u32),
    f32 => (AtomicU32, u32),
    i64 => (AtomicU64, u64),
    u64 => (AtomicU64, u64),
    f64 => (AtomicU64, u64),
}

/// An associative, commutative fold with an identity element.
///
/// Implementations must be order-independent: folding the same multiset of
/// values into a slot yields the same result regardless of interleaving.
pub trait ReduceOp<T> {
    /// The identity element for the fold.
    fn identity() -> T;

    /// Fold `rhs` into `lhs` in place.
    fn fold(lhs: &mut T, rhs: T);

    /// Fold `rhs` into the slot with a lock-free atomic update.
    ///
    /// # Safety
    /// Same contract as [`AtomicValue::atomic_update`].
    #[inline]
    unsafe fn fold_atomic(slot: *mut T, rhs: T)
    where
        T: AtomicValue,
    {
        T::atomic_update(slot, |current| {
            let mut acc = current;
            Self::fold(&mut acc, rhs);
            acc
        });
    }
}

/// Addition fold; identity is zero.
pub struct SumReduction;

impl<T: Copy + Zero + std::ops::Add<Output = T>> ReduceOp<T> for SumReduction {
    #[inline]
    fn identity() -> T {
        T::zero()
    }

    #[inline]
    fn fold(lhs: &mut T, rhs: T) {
        *lhs = *lhs + rhs;
    }
}

/// Multiplication fold; identity is one.
pub struct ProdReduction;

impl<T: Copy + One + std::ops::Mul<Output = T>> ReduceOp<T> for ProdReduction {
    #[inline]
    fn identity() -> T {
        T::one()
    }

    #[inline]
    fn fold(lhs: &mut T, rhs: T) {
        *lhs = *lhs * rhs;
    }
}

/// Maximum fold; identity is the type's minimum value.
pub struct MaxReduction;

impl<T: Copy + Bounded + PartialOrd> ReduceOp<T> for MaxReduction {
    #[inline]
    fn identity() -> T {
        T::min_value()
    }

    #[inline]
    fn fold(lhs: &mut T, rhs: T) {
        if rhs > *lhs {
            *lhs = rhs;
        }
    }
}

/// Minimum fold; identity is the type's maximum value.
pub struct MinReduction;

impl<T: Copy + Bounded + PartialOrd> ReduceOp<T> for MinReduction {
    #[inline]
    fn identity() -> T {
        T::max_value()
    }

    #[inline]
    fn fold(lhs: &mut T, rhs: T) {
        if rhs < *lhs {
            *lhs = rhs;
        }
    }
}
