//! Per-element predicates for the bit-index builder.
//!
//! A predicate is any `Sync` type with a pure `validate` method. Kernels are
//! generic over it, so every call is statically dispatched in the hot loop.

pub mod frustum;

pub use frustum::{BoxCenterPredicate, FrustumPredicate};

/// Pure, thread-safe test applied to one element.
///
/// Implementations must have no observable side effects: the builder calls
/// `validate` concurrently on disjoint elements from several workers.
pub trait Predicate<T>: Sync {
    fn validate(&self, element: &T) -> bool;
}

impl<T, P: Predicate<T> + ?Sized> Predicate<T> for &P {
    #[inline]
    fn validate(&self, element: &T) -> bool {
        (**self).validate(element)
    }
}

/// Accepts every element
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysTrue;

impl<T> Predicate<T> for AlwaysTrue {
    #[inline]
    fn validate(&self, _element: &T) -> bool {
        true
    }
}

/// Rejects every element
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysFalse;

impl<T> Predicate<T> for AlwaysFalse {
    #[inline]
    fn validate(&self, _element: &T) -> bool {
        false
    }
}

/// Accepts elements strictly greater than the threshold
#[derive(Clone, Copy, Debug, Default)]
pub struct GreaterThan<V>(pub V);

impl<V: PartialOrd + Sync> Predicate<V> for GreaterThan<V> {
    #[inline]
    fn validate(&self, element: &V) -> bool {
        *element > self.0
    }
}

/// Accepts elements strictly less than the threshold
#[derive(Clone, Copy, Debug, Default)]
pub struct LessThan<V>(pub V);

impl<V: PartialOrd + Sync> Predicate<V> for LessThan<V> {
    #[inline]
    fn validate(&self, element: &V) -> bool {
        *element < self.0
    }
}

/// Wraps a closure as a predicate
#[derive(Clone, Copy)]
pub struct FnPredicate<F>(pub F);

impl<T, F: Fn(&T) -> bool + Sync> Predicate<T> for FnPredicate<F> {
    #[inline]
    fn validate(&self, element: &T) -> bool {
        (self.0)(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_matching<T, P: Predicate<T>>(items: &[T], predicate: P) -> usize {
        items.iter().filter(|item| predicate.validate(item)).count()
    }

    #[test]
    fn test_constant_predicates() {
        let items = [1, 2, 3];
        assert_eq!(count_matching(&items, AlwaysTrue), 3);
        assert_eq!(count_matching(&items, AlwaysFalse), 0);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let items = [-1, 0, 1, 2];
        assert_eq!(count_matching(&items, GreaterThan(0)), 2);
        assert_eq!(count_matching(&items, LessThan(0)), 1);
        assert_eq!(count_matching(&[0.5f32, 1.5], GreaterThan(0.5f32)), 1);
    }

    #[test]
    fn test_closure_and_reference() {
        let even = FnPredicate(|v: &u32| v % 2 == 0);
        let items = [1u32, 2, 4, 7, 8];
        assert_eq!(count_matching(&items, &even), 3);
        assert_eq!(count_matching(&items, even), 3);
    }
}
