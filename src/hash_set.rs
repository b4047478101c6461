use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::error::Result;
use crate::hash_map::DefaultHashBuilder;
use crate::hash_map::fold_hash;
use crate::hash_table;
use crate::hash_table::HashTable;

/// A hash set implemented on the Robin Hood [`HashTable`].
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash values.
/// Because removals shift displaced neighbors back instead of leaving
/// tombstones, the set stays compact under workloads that insert and remove
/// members every cycle, such as the live-cell set of a cellular automaton.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: HashTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(feature = "foldhash")]
impl<T> HashSet<T, DefaultHashBuilder>
where
    T: Hash + Eq,
{
    /// Creates an empty set with the default hasher.
    ///
    /// ```rust
    /// # use rh_hash::HashSet;
    /// let set: HashSet<i32> = HashSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a set with at least `capacity` slots and the default hasher.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

#[cfg(feature = "foldhash")]
impl<T> Default for HashSet<T, DefaultHashBuilder>
where
    T: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with the given hasher builder.
    ///
    /// ```rust
    /// # use rh_hash::HashSet;
    /// # use rh_hash::fnv::Fnv1BuildHasher;
    /// let set: HashSet<(i64, i64), _> = HashSet::with_hasher(Fnv1BuildHasher);
    /// assert!(set.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates a set with at least `capacity` slots and the given hasher
    /// builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Creates a set with at least `capacity` slots, a growth threshold of
    /// `load_factor`, and the given hasher builder.
    pub fn with_capacity_and_load_factor_and_hasher(
        capacity: usize,
        load_factor: f32,
        hash_builder: S,
    ) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_capacity_and_load_factor(capacity, load_factor)?,
            hash_builder,
        })
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the size of the underlying slot array.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes all values, keeping the slot array at its current size.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Grows the set until `additional` more values fit without resizing.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.table.reserve(additional)
    }

    /// Adds a value to the set.
    ///
    /// Returns `Ok(true)` if the value was not already present. Fails only
    /// with [`Error::OutOfMemory`](crate::Error::OutOfMemory) when the set
    /// must grow and cannot.
    ///
    /// ```rust
    /// # use rh_hash::HashSet;
    /// let mut set = HashSet::new();
    /// assert_eq!(set.insert(2)?, true);
    /// assert_eq!(set.insert(2)?, false);
    /// assert_eq!(set.len(), 1);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn insert(&mut self, value: T) -> Result<bool> {
        let hash = fold_hash(self.hash_builder.hash_one(&value));
        let replaced = self.table.insert(hash, |a, b| a == b, value)?;
        Ok(replaced.is_none())
    }

    /// Returns `true` if the set contains the value.
    ///
    /// ```rust
    /// # use rh_hash::HashSet;
    /// let mut set = HashSet::new();
    /// set.insert(1)?;
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&2));
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        let hash = fold_hash(self.hash_builder.hash_one(value));
        self.table.find(hash, |v| v == value).is_some()
    }

    /// Removes a value from the set, returning whether it was present.
    ///
    /// ```rust
    /// # use rh_hash::HashSet;
    /// let mut set = HashSet::new();
    /// set.insert(1)?;
    /// assert!(set.remove(&1));
    /// assert!(!set.remove(&1));
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        let hash = fold_hash(self.hash_builder.hash_one(value));
        self.table.remove(hash, |v| v == value).is_some()
    }

    /// Removes and returns the stored value equal to the given one, if any.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = fold_hash(self.hash_builder.hash_one(value));
        self.table.remove(hash, |v| v == value)
    }

    /// Returns an iterator over the set's values in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes all values and yields them by value.
    ///
    /// Dropping the iterator early still leaves the set empty.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns the underlying table's probe-distance histogram.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.probe_histogram()
    }

    /// Pretty-prints the underlying table's probe-distance histogram.
    #[cfg(all(feature = "stats", feature = "std"))]
    pub fn print_probe_histogram(&self) {
        self.table.print_probe_histogram();
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a set's values.
pub struct Iter<'a, T> {
    inner: hash_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Draining iterator over a set's owned values.
pub struct Drain<'a, T> {
    inner: hash_table::Drain<'a, T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::mem;

    use super::*;
    use crate::fnv::Fnv1BuildHasher;

    #[test]
    fn insert_contains_remove() {
        let mut set: HashSet<u64> = HashSet::new();
        for v in 0..64 {
            assert!(set.insert(v).unwrap());
        }
        assert!(!set.insert(10).unwrap());
        assert_eq!(set.len(), 64);

        assert!(set.remove(&10));
        assert!(!set.contains(&10));
        assert!(!set.remove(&10));
        assert_eq!(set.len(), 63);

        assert_eq!(set.take(&11), Some(11));
        assert_eq!(set.take(&11), None);
    }

    #[test]
    fn sets_compare_by_membership() {
        let mut a: HashSet<u64> = HashSet::new();
        let mut b: HashSet<u64> = HashSet::new();
        for v in 0..10 {
            a.insert(v).unwrap();
            b.insert(9 - v).unwrap();
        }
        assert_eq!(a, b);

        b.remove(&4);
        assert_ne!(a, b);
    }

    type Cell = (i64, i64);

    /// One generation of Conway's Life over a sparse live-cell set: visit
    /// the 3x3 neighborhood of every live cell, apply the birth/survival
    /// rule, and collect the next generation into `next`.
    fn step(current: &HashSet<Cell, Fnv1BuildHasher>, next: &mut HashSet<Cell, Fnv1BuildHasher>) {
        for &(x, y) in current {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let (cx, cy) = (x + dx, y + dy);
                    let mut neighbors = 0;
                    for nx in -1..=1i64 {
                        for ny in -1..=1i64 {
                            if (nx, ny) != (0, 0)
                                && current.contains(&(cx + nx, cy + ny))
                            {
                                neighbors += 1;
                            }
                        }
                    }
                    if neighbors == 3 || (neighbors == 2 && current.contains(&(cx, cy))) {
                        next.insert((cx, cy)).unwrap();
                    }
                }
            }
        }
    }

    fn generation(
        current: &mut HashSet<Cell, Fnv1BuildHasher>,
        next: &mut HashSet<Cell, Fnv1BuildHasher>,
    ) {
        next.clear();
        step(current, next);
        mem::swap(current, next);
    }

    fn sorted(set: &HashSet<Cell, Fnv1BuildHasher>) -> Vec<Cell> {
        let mut cells: Vec<Cell> = set.iter().copied().collect();
        cells.sort_unstable();
        cells
    }

    // The consumer this table was designed around: two set handles swapped
    // each generation, with per-generation clears reusing the slot arrays.
    #[test]
    fn blinker_oscillates() {
        let mut current: HashSet<Cell, _> = HashSet::with_hasher(Fnv1BuildHasher);
        let mut next: HashSet<Cell, _> = HashSet::with_hasher(Fnv1BuildHasher);
        for cell in [(0, -1), (0, 0), (0, 1)] {
            current.insert(cell).unwrap();
        }

        generation(&mut current, &mut next);
        assert_eq!(sorted(&current), [(-1, 0), (0, 0), (1, 0)]);

        generation(&mut current, &mut next);
        assert_eq!(sorted(&current), [(0, -1), (0, 0), (0, 1)]);
    }

    #[test]
    fn glider_translates_diagonally() {
        let glider = [(0, 2), (1, 0), (1, 2), (2, 1), (2, 2)];
        let mut current: HashSet<Cell, _> = HashSet::with_hasher(Fnv1BuildHasher);
        let mut next: HashSet<Cell, _> = HashSet::with_hasher(Fnv1BuildHasher);
        for cell in glider {
            current.insert(cell).unwrap();
        }

        // A glider reproduces itself shifted by (1, 1) every four
        // generations.
        for _ in 0..4 {
            generation(&mut current, &mut next);
        }

        let mut expected: Vec<Cell> = glider.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
        expected.sort_unstable();
        assert_eq!(sorted(&current), expected);
    }
}
