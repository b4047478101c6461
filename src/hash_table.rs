use alloc::vec::Vec;
use core::fmt::Debug;
use core::mem;

use crate::error::Error;
use crate::error::Result;

/// Fraction of slots that may be occupied before the table grows, used by
/// constructors that do not take an explicit load factor.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Rounds a requested slot count up to the next power of two, with a minimum
/// of one slot. Power-of-two sizes let bucket selection and probe stepping use
/// masking instead of modulo.
#[inline(always)]
fn ceil_capacity(requested: usize) -> usize {
    requested.max(1).next_power_of_two()
}

/// Overflow-checked [`ceil_capacity`] for the fallible constructor: a request
/// above the largest representable power of two is an allocation that can
/// never succeed, not a panic.
#[inline(always)]
fn checked_ceil_capacity(requested: usize) -> Option<usize> {
    requested.max(1).checked_next_power_of_two()
}

/// Number of probe steps separating a slot from the ideal bucket of the hash
/// stored in it. `mask` is `capacity - 1`.
#[inline(always)]
fn probe_distance(hash: u32, index: usize, mask: usize) -> usize {
    index.wrapping_sub(hash as usize) & mask
}

/// An occupied slot: the entry plus its full hash, cached so probe distances
/// can be recomputed during displacement and growth without re-hashing.
#[derive(Clone)]
struct Bucket<V> {
    hash: u32,
    value: V,
}

/// Places `incoming` into `slots` using Robin Hood displacement.
///
/// Walks the probe sequence from the entry's ideal bucket. Whenever the
/// resident of a slot is closer to its own ideal bucket than the carried
/// entry is to its own ("rich" resident, "poor" newcomer), the two are
/// swapped and the displaced resident continues probing. Equal distances do
/// not swap, so repeated builds of the same entry set are deterministic.
///
/// The caller must guarantee the key is not already present and that at least
/// one slot is empty, which bounds the walk to `slots.len()` steps.
fn insert_displaced<V>(slots: &mut [Option<Bucket<V>>], mut incoming: Bucket<V>) {
    let mask = slots.len() - 1;
    let mut index = incoming.hash as usize & mask;
    let mut distance = 0;

    loop {
        let slot = &mut slots[index];
        match slot {
            None => {
                *slot = Some(incoming);
                return;
            }
            Some(resident) => {
                let resident_distance = probe_distance(resident.hash, index, mask);
                if resident_distance < distance {
                    mem::swap(resident, &mut incoming);
                    // The carried entry is now the displaced resident, whose
                    // actual distance at this slot is the one just computed.
                    // The running distance continues from there.
                    distance = resident_distance;
                }
            }
        }

        index = (index + 1) & mask;
        distance += 1;
    }
}

/// A hash table using Robin Hood linear probing with backward-shift deletion.
///
/// `HashTable<V>` stores whole entries of type `V` in a single contiguous
/// slot array and provides insertion, lookup, and removal. Like a raw table,
/// it does not hash for you: every operation takes the entry's hash and an
/// equality predicate. The [`HashMap`](crate::HashMap) and
/// [`HashSet`](crate::HashSet) wrappers layer a [`BuildHasher`] on top.
///
/// Collisions are resolved by linear probing. On insertion, an entry that has
/// probed farther from its ideal bucket than a slot's resident evicts that
/// resident, which keeps the variance of probe distances low and lets lookups
/// terminate early on a miss. Removals close the gap by shifting subsequent
/// displaced entries one slot back toward their ideal buckets, so the table
/// never accumulates tombstones.
///
/// The slot array always holds a power-of-two number of slots and grows by
/// doubling once occupancy would exceed the configured load factor. Growth
/// is the only fallible operation; it reports [`Error::OutOfMemory`] instead
/// of aborting, leaving the table unchanged and retryable.
///
/// [`BuildHasher`]: core::hash::BuildHasher
///
/// ## Example
///
/// ```rust
/// # use core::hash::BuildHasher;
/// # use rh_hash::fnv::Fnv1BuildHasher;
/// # use rh_hash::hash_table::HashTable;
/// #
/// # fn hash_key(key: u64) -> u32 {
/// #     Fnv1BuildHasher.hash_one(key) as u32
/// # }
/// #
/// let mut table: HashTable<(u64, &str)> = HashTable::with_capacity(8);
///
/// let hash = hash_key(7);
/// table.insert(hash, |(a, _), (b, _)| a == b, (7, "seven"))?;
///
/// assert_eq!(table.find(hash, |(k, _)| *k == 7), Some(&(7, "seven")));
/// assert_eq!(table.remove(hash, |(k, _)| *k == 7), Some((7, "seven")));
/// assert!(table.is_empty());
/// # Ok::<(), rh_hash::Error>(())
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Vec<Option<Bucket<V>>>,
    populated: usize,
    load_factor: f32,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;

        let mask = self.slots.len() - 1;
        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("capacity", &self.slots.len())
            .field("load_factor", &self.load_factor)
            .field(
                "slots",
                &self
                    .slots
                    .iter()
                    .enumerate()
                    .map(|(index, slot)| match slot {
                        Some(bucket) => format!(
                            "{index:04}: {:08x} d{:02}",
                            bucket.hash,
                            probe_distance(bucket.hash, index, mask)
                        ),
                        None => format!("{index:04}: ............"),
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<V> HashTable<V> {
    /// Creates a table with at least `capacity` slots and the
    /// [`DEFAULT_LOAD_FACTOR`].
    ///
    /// The slot count is rounded up to the next power of two, with a minimum
    /// of one slot.
    ///
    /// ```rust
    /// # use rh_hash::hash_table::HashTable;
    /// let table: HashTable<u64> = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 128);
    /// assert!(table.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(ceil_capacity(capacity), || None);
        HashTable {
            slots,
            populated: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Creates a table with at least `capacity` slots and the given growth
    /// threshold.
    ///
    /// `load_factor` must lie strictly between 0 and 1; anything else
    /// (including NaN) fails with [`Error::InvalidLoadFactor`]. Allocation
    /// failure reports [`Error::OutOfMemory`].
    ///
    /// ```rust
    /// # use rh_hash::Error;
    /// # use rh_hash::hash_table::HashTable;
    /// let table: HashTable<u64> = HashTable::with_capacity_and_load_factor(1, 0.9)?;
    /// assert_eq!(table.capacity(), 1);
    ///
    /// let err = HashTable::<u64>::with_capacity_and_load_factor(1, 1.5);
    /// assert!(matches!(err, Err(Error::InvalidLoadFactor(_))));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        if !(load_factor > 0.0 && load_factor < 1.0) {
            return Err(Error::InvalidLoadFactor(load_factor));
        }

        let requested = checked_ceil_capacity(capacity).ok_or(Error::OutOfMemory)?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(requested)
            .map_err(|_| Error::OutOfMemory)?;
        slots.resize_with(requested, || None);

        Ok(HashTable {
            slots,
            populated: 0,
            load_factor,
        })
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the size of the slot array.
    ///
    /// Always a power of two. The number of entries the table holds before
    /// growing is `capacity() * load_factor()`.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the growth threshold configured at creation.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Removes all entries, keeping the slot array at its current size.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.populated = 0;
    }

    /// Grows the table until `additional` more entries fit without crossing
    /// the load factor.
    ///
    /// On [`Error::OutOfMemory`] the table is unchanged and still valid.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        while self.exceeds_load(self.populated + additional) {
            self.grow()?;
        }
        Ok(())
    }

    /// Inserts an entry or updates the one sharing its key, returning the
    /// replaced entry if there was one.
    ///
    /// `hash` must be the hash of the entry being inserted. `same_key` is
    /// called with a resident entry and the incoming one and must report
    /// whether they carry the same key. Fails only with
    /// [`Error::OutOfMemory`] when growth is required and the new slot array
    /// cannot be allocated; the table is unchanged in that case and the
    /// insertion can be retried.
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use rh_hash::fnv::Fnv1BuildHasher;
    /// # use rh_hash::hash_table::HashTable;
    /// #
    /// # fn hash_key(key: u64) -> u32 {
    /// #     Fnv1BuildHasher.hash_one(key) as u32
    /// # }
    /// #
    /// let mut table: HashTable<(u64, u64)> = HashTable::with_capacity(0);
    /// let hash = hash_key(1);
    ///
    /// assert_eq!(table.insert(hash, |(a, _), (b, _)| a == b, (1, 10))?, None);
    /// assert_eq!(table.insert(hash, |(a, _), (b, _)| a == b, (1, 20))?, Some((1, 10)));
    /// assert_eq!(table.len(), 1);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn insert(
        &mut self,
        hash: u32,
        same_key: impl Fn(&V, &V) -> bool,
        value: V,
    ) -> Result<Option<V>> {
        // Update in place when the key is already present; occupancy, cached
        // hash, and the populated count stay as they are.
        if let Some(index) = self.find_index(hash, |resident| same_key(resident, &value)) {
            if let Some(bucket) = &mut self.slots[index] {
                return Ok(Some(mem::replace(&mut bucket.value, value)));
            }
        }

        // A low load factor can need more than one doubling to get back
        // under the threshold.
        while self.exceeds_load(self.populated + 1) {
            self.grow()?;
        }

        insert_displaced(&mut self.slots, Bucket { hash, value });
        self.populated += 1;

        Ok(None)
    }

    /// Returns a reference to the entry matching `hash` and `eq`, if any.
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use rh_hash::fnv::Fnv1BuildHasher;
    /// # use rh_hash::hash_table::HashTable;
    /// #
    /// # fn hash_key(key: u64) -> u32 {
    /// #     Fnv1BuildHasher.hash_one(key) as u32
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(0);
    /// table.insert(hash_key(3), |a, b| a == b, 3)?;
    ///
    /// assert_eq!(table.find(hash_key(3), |v| *v == 3), Some(&3));
    /// assert_eq!(table.find(hash_key(4), |v| *v == 4), None);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn find(&self, hash: u32, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        self.slots[index].as_ref().map(|bucket| &bucket.value)
    }

    /// Returns a mutable reference to the entry matching `hash` and `eq`, if
    /// any.
    ///
    /// The parts of the entry that determine its hash or equality must not be
    /// modified through the returned reference.
    pub fn find_mut(&mut self, hash: u32, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        self.slots[index].as_mut().map(|bucket| &mut bucket.value)
    }

    /// Removes and returns the entry matching `hash` and `eq`, if any.
    ///
    /// The gap left behind is closed by shifting each following entry that is
    /// displaced from its ideal bucket one slot backward. Every shifted entry
    /// moves one step closer to its ideal bucket, so the probe-distance
    /// ordering survives and no tombstone is needed.
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use rh_hash::fnv::Fnv1BuildHasher;
    /// # use rh_hash::hash_table::HashTable;
    /// #
    /// # fn hash_key(key: u64) -> u32 {
    /// #     Fnv1BuildHasher.hash_one(key) as u32
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(0);
    /// table.insert(hash_key(9), |a, b| a == b, 9)?;
    ///
    /// assert_eq!(table.remove(hash_key(9), |v| *v == 9), Some(9));
    /// assert_eq!(table.remove(hash_key(9), |v| *v == 9), None);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn remove(&mut self, hash: u32, eq: impl Fn(&V) -> bool) -> Option<V> {
        let mut hole = self.find_index(hash, eq)?;
        let removed = self.slots[hole].take()?;
        let mask = self.slots.len() - 1;

        // Backward shift: pull each successor that is not already in its
        // ideal bucket one slot back, stopping at the first empty slot or
        // distance-zero resident.
        loop {
            let next = (hole + 1) & mask;
            let shift = matches!(
                &self.slots[next],
                Some(bucket) if probe_distance(bucket.hash, next, mask) > 0
            );
            if !shift {
                break;
            }
            self.slots[hole] = self.slots[next].take();
            hole = next;
        }

        self.populated -= 1;
        Some(removed.value)
    }

    /// Returns an iterator over the entries in slot-index order.
    ///
    /// The iterator borrows the table; the table cannot be mutated while it
    /// is live.
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use rh_hash::fnv::Fnv1BuildHasher;
    /// # use rh_hash::hash_table::HashTable;
    /// #
    /// # fn hash_key(key: u64) -> u32 {
    /// #     Fnv1BuildHasher.hash_one(key) as u32
    /// # }
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(0);
    /// for key in 0..4 {
    ///     table.insert(hash_key(key), |a, b| a == b, key)?;
    /// }
    ///
    /// let mut seen: Vec<u64> = table.iter().copied().collect();
    /// seen.sort_unstable();
    /// assert_eq!(seen, [0, 1, 2, 3]);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Removes all entries and yields them by value, in slot-index order.
    ///
    /// Dropping the iterator without exhausting it still leaves the table
    /// empty. The slot array keeps its size.
    pub fn drain(&mut self) -> Drain<'_, V> {
        self.populated = 0;
        Drain {
            slots: self.slots.iter_mut(),
        }
    }

    /// Walks the probe sequence for `hash` and returns the index of the slot
    /// holding the matching entry.
    ///
    /// The walk ends at the first empty slot, or as soon as a resident sits
    /// closer to its own ideal bucket than the search has probed: by the
    /// Robin Hood ordering the key cannot occur beyond that point. The step
    /// count is capped at the slot count so the walk terminates even if the
    /// layout were corrupted.
    fn find_index(&self, hash: u32, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let mask = self.slots.len() - 1;
        let mut index = hash as usize & mask;

        for distance in 0..self.slots.len() {
            let bucket = self.slots[index].as_ref()?;

            if bucket.hash == hash && eq(&bucket.value) {
                return Some(index);
            }
            if probe_distance(bucket.hash, index, mask) < distance {
                return None;
            }

            index = (index + 1) & mask;
        }

        None
    }

    /// Whether holding `populated` entries would cross the load factor at
    /// the current slot count.
    #[inline(always)]
    fn exceeds_load(&self, populated: usize) -> bool {
        populated as f64 / self.slots.len() as f64 > f64::from(self.load_factor)
    }

    /// Doubles the slot array and re-inserts every entry using its cached
    /// hash.
    ///
    /// The new array is fully allocated before any slot is moved, so an
    /// allocation failure leaves the table exactly as it was. Old entries are
    /// re-inserted in slot-index order with the normal displacement walk;
    /// keys are known unique at this point, so no update check is needed.
    fn grow(&mut self) -> Result<()> {
        let doubled = self.slots.len().checked_mul(2).ok_or(Error::OutOfMemory)?;

        let mut new_slots: Vec<Option<Bucket<V>>> = Vec::new();
        new_slots
            .try_reserve_exact(doubled)
            .map_err(|_| Error::OutOfMemory)?;
        new_slots.resize_with(doubled, || None);

        let old_slots = mem::replace(&mut self.slots, new_slots);
        for bucket in old_slots.into_iter().flatten() {
            insert_displaced(&mut self.slots, bucket);
        }

        Ok(())
    }

    /// Returns, per probe distance, how many entries sit that far from their
    /// ideal bucket.
    ///
    /// Index 0 counts entries resting in their ideal bucket. The histogram
    /// ends at the longest occupied distance.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mask = self.slots.len() - 1;
        let mut histogram = Vec::new();

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(bucket) = slot else { continue };
            let distance = probe_distance(bucket.hash, index, mask);
            if histogram.len() <= distance {
                histogram.resize(distance + 1, 0);
            }
            histogram[distance] += 1;
        }

        histogram
    }

    /// Pretty-prints the probe-distance histogram to stdout.
    #[cfg(all(feature = "stats", feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let histogram = self.probe_histogram();
        let total: usize = histogram.iter().sum();

        println!("=== Probe Distance Histogram ===");
        println!(
            "Population: {}/{} slots ({:.2}% load)",
            self.populated,
            self.slots.len(),
            (self.populated as f64 / self.slots.len() as f64) * 100.0
        );
        for (distance, count) in histogram.iter().enumerate() {
            println!(
                "{distance:>4}: {count:>8} ({:.02}%)",
                if total == 0 {
                    0.0
                } else {
                    (*count as f64 / total as f64) * 100.0
                }
            );
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Immutable iterator over a table's entries in slot-index order.
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Option<Bucket<V>>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find_map(|slot| slot.as_ref().map(|bucket| &bucket.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

/// Draining iterator over a table's entries in slot-index order.
///
/// Created by [`HashTable::drain`]. Slots not yet visited are emptied when
/// the iterator is dropped.
pub struct Drain<'a, V> {
    slots: core::slice::IterMut<'a, Option<Bucket<V>>>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find_map(|slot| slot.take().map(|bucket| bucket.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots.len()))
    }
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for slot in self.slots.by_ref() {
            *slot = None;
        }
    }
}
