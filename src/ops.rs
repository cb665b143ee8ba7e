//! The capabilities the engine needs from a key type.
//!
//! [`Tree`][crate::Tree] never looks at a key directly. Ordering, copying, releasing, printing,
//! the parity test used by range deletion, the random key source and the output writer are all
//! supplied by the caller through a [`KeyOps`] bundle passed to every call. Two bundles are
//! provided: [`IntOps`] for `i64` keys and [`StrOps`] for `String` keys.

use std::cmp::Ordering;
use std::fmt::Display;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Error;

/// The operations bundle for keys of type `K`.
pub trait KeyOps<K> {
    /// A total order over keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;

    /// An owned copy of `key`, independent of wherever `key` lives. `None` means the copy could
    /// not be allocated.
    fn duplicate(&self, key: &K) -> Option<K>;

    /// Releases a key the engine owns.
    fn destroy(&self, key: K) {
        drop(key);
    }

    /// Visits a key during a traversal.
    fn print(&self, key: &K);

    /// The predicate range deletion filters on.
    fn is_even(&self, key: &K) -> bool;

    /// The next candidate key for random tree generation, or `None` once the source is
    /// exhausted.
    fn generate_random(&mut self) -> Option<K>;

    /// Writes a copy of `key` into `out` at `index`, overwriting whatever was there. If `index`
    /// is at or past the end of `out`, the copy is pushed onto the end instead, so it lands at
    /// `out.len()` rather than at `index`.
    fn store_at(&self, out: &mut Vec<K>, key: &K, index: usize) -> Result<(), Error> {
        let key = self.duplicate(key).ok_or(Error::OutputAllocation)?;
        match out.get_mut(index) {
            Some(slot) => *slot = key,
            None => out.push(key),
        }
        Ok(())
    }
}

/// Which keys [`Tree::delete_range`][crate::Tree::delete_range] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    /// Keys for which [`KeyOps::is_even`] holds.
    Even,
    /// Keys for which [`KeyOps::is_even`] does not hold.
    Odd,
}

impl Parity {
    /// Reads an integer flag: `1` or more selects [`Parity::Even`], `0` selects [`Parity::Odd`].
    /// Negative flags select nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_bst::Parity;
    ///
    /// assert_eq!(Parity::from_flag(3), Some(Parity::Even));
    /// assert_eq!(Parity::from_flag(0), Some(Parity::Odd));
    /// assert_eq!(Parity::from_flag(-1), None);
    /// ```
    pub fn from_flag(flag: i32) -> Option<Self> {
        match flag {
            0 => Some(Self::Odd),
            f if f >= 1 => Some(Self::Even),
            _ => None,
        }
    }

    pub(crate) fn accepts(self, is_even: bool) -> bool {
        match self {
            Self::Even => is_even,
            Self::Odd => !is_even,
        }
    }
}

fn print_key<K: Display>(key: &K) {
    print!("{key} ");
}

/// Operations for `i64` keys with a seeded random source.
///
/// # Examples
///
/// ```
/// use stack_bst::{IntOps, KeyOps};
///
/// let mut ops = IntOps::new(7).with_range(1..=3).with_limit(2);
///
/// assert!((1..=3).contains(&ops.generate_random().unwrap()));
/// assert!(ops.generate_random().is_some());
/// assert_eq!(ops.generate_random(), None);
/// ```
#[derive(Debug, Clone)]
pub struct IntOps {
    rng: StdRng,
    range: RangeInclusive<i64>,
    remaining: Option<usize>,
}

impl IntOps {
    /// Keys drawn from the whole `i64` range by an RNG seeded with `seed`. The source never runs
    /// dry.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range: i64::MIN..=i64::MAX,
            remaining: None,
        }
    }

    /// Draws keys from `range` only.
    pub fn with_range(self, range: RangeInclusive<i64>) -> Self {
        Self { range, ..self }
    }

    /// Reports end-of-sequence after `draws` keys.
    pub fn with_limit(self, draws: usize) -> Self {
        Self {
            remaining: Some(draws),
            ..self
        }
    }
}

impl KeyOps<i64> for IntOps {
    fn compare(&self, a: &i64, b: &i64) -> Ordering {
        a.cmp(b)
    }

    fn duplicate(&self, key: &i64) -> Option<i64> {
        Some(*key)
    }

    fn print(&self, key: &i64) {
        print_key(key);
    }

    fn is_even(&self, key: &i64) -> bool {
        key % 2 == 0
    }

    fn generate_random(&mut self) -> Option<i64> {
        if let Some(remaining) = &mut self.remaining {
            *remaining = remaining.checked_sub(1)?;
        }
        Some(self.rng.random_range(self.range.clone()))
    }
}

/// Operations for `String` keys. Strings compare lexicographically and a string is even when its
/// length is. Random keys are lowercase ASCII.
#[derive(Debug, Clone)]
pub struct StrOps {
    rng: StdRng,
    len: RangeInclusive<usize>,
    remaining: Option<usize>,
}

impl StrOps {
    /// Random strings of 1 to 8 characters from an RNG seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            len: 1..=8,
            remaining: None,
        }
    }

    /// Draws string lengths from `len`.
    pub fn with_len(self, len: RangeInclusive<usize>) -> Self {
        Self { len, ..self }
    }

    /// Reports end-of-sequence after `draws` keys.
    pub fn with_limit(self, draws: usize) -> Self {
        Self {
            remaining: Some(draws),
            ..self
        }
    }
}

impl KeyOps<String> for StrOps {
    fn compare(&self, a: &String, b: &String) -> Ordering {
        a.cmp(b)
    }

    fn duplicate(&self, key: &String) -> Option<String> {
        Some(key.clone())
    }

    fn print(&self, key: &String) {
        print_key(key);
    }

    fn is_even(&self, key: &String) -> bool {
        key.len() % 2 == 0
    }

    fn generate_random(&mut self) -> Option<String> {
        if let Some(remaining) = &mut self.remaining {
            *remaining = remaining.checked_sub(1)?;
        }
        let len = self.rng.random_range(self.len.clone());
        Some(
            (0..len)
                .map(|_| char::from(self.rng.random_range(b'a'..=b'z')))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_flags() {
        assert_eq!(Parity::from_flag(1), Some(Parity::Even));
        assert_eq!(Parity::from_flag(i32::MAX), Some(Parity::Even));
        assert_eq!(Parity::from_flag(0), Some(Parity::Odd));
        assert_eq!(Parity::from_flag(-5), None);
    }

    #[test]
    fn parity_accepts() {
        assert!(Parity::Even.accepts(true));
        assert!(!Parity::Even.accepts(false));
        assert!(Parity::Odd.accepts(false));
        assert!(!Parity::Odd.accepts(true));
    }

    #[test]
    fn int_keys_stay_in_range() {
        let mut ops = IntOps::new(1).with_range(-3..=3);
        for _ in 0..1000 {
            let key = ops.generate_random().unwrap();
            assert!((-3..=3).contains(&key));
        }
    }

    #[test]
    fn same_seed_same_keys() {
        let mut a = IntOps::new(42);
        let mut b = IntOps::new(42);
        for _ in 0..100 {
            assert_eq!(a.generate_random(), b.generate_random());
        }
    }

    #[test]
    fn limit_exhausts_the_source() {
        let mut ops = StrOps::new(3).with_limit(3);
        assert!(ops.generate_random().is_some());
        assert!(ops.generate_random().is_some());
        assert!(ops.generate_random().is_some());
        assert_eq!(ops.generate_random(), None);
        assert_eq!(ops.generate_random(), None);
    }

    #[test]
    fn int_parity() {
        let ops = IntOps::new(0);
        assert!(ops.is_even(&0));
        assert!(ops.is_even(&-4));
        assert!(!ops.is_even(&7));
        assert!(!ops.is_even(&-7));
    }

    #[test]
    fn string_keys_are_lowercase_with_bounded_length() {
        let mut ops = StrOps::new(9).with_len(2..=4);
        for _ in 0..200 {
            let key = ops.generate_random().unwrap();
            assert!((2..=4).contains(&key.len()));
            assert!(key.bytes().all(|b| b.is_ascii_lowercase()));
        }
        assert!(ops.is_even(&"ab".to_string()));
        assert!(!ops.is_even(&"abc".to_string()));
    }

    #[test]
    fn store_at_overwrites_or_appends() {
        let ops = IntOps::new(0);
        let mut out = vec![9, 9];

        ops.store_at(&mut out, &1, 0).unwrap();
        ops.store_at(&mut out, &2, 1).unwrap();
        ops.store_at(&mut out, &3, 2).unwrap();
        assert_eq!(out, [1, 2, 3]);

        // A gap is not padded: the key lands at the end.
        ops.store_at(&mut out, &4, 10).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
    }
}
