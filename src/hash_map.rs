use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::error::Result;
use crate::hash_table;
use crate::hash_table::HashTable;

/// The default hasher builder, backed by `foldhash`.
#[cfg(feature = "foldhash")]
pub type DefaultHashBuilder = foldhash::fast::RandomState;

/// Placeholder hasher builder used when the `foldhash` feature is disabled.
///
/// Uninhabited: without `foldhash`, maps and sets must be given a hasher
/// builder explicitly via `with_hasher`.
#[cfg(not(feature = "foldhash"))]
pub enum DefaultHashBuilder {}

/// Folds a 64-bit hasher output down to the table's 32-bit hash width.
#[inline(always)]
pub(crate) fn fold_hash(hash: u64) -> u32 {
    ((hash >> 32) as u32) ^ (hash as u32)
}

/// A hash map implemented on the Robin Hood [`HashTable`].
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash keys. The
/// underlying storage keeps every entry in a single slot array using linear
/// probing with Robin Hood displacement; removals use backward shifting, so
/// a map that sees heavy insert/remove churn never degrades the way
/// tombstone-based open addressing does.
///
/// Growth allocations are surfaced rather than aborted on: [`insert`] and
/// [`reserve`] return a [`Result`] and leave the map untouched when the
/// larger slot array cannot be allocated.
///
/// [`insert`]: HashMap::insert
/// [`reserve`]: HashMap::reserve
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug + Hash + Eq,
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

#[cfg(feature = "foldhash")]
impl<K, V> HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates an empty map with the default hasher.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a map with at least `capacity` slots and the default hasher.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Creates a map with at least `capacity` slots, a growth threshold of
    /// `load_factor`, and the default hasher.
    ///
    /// Fails with [`Error::InvalidLoadFactor`](crate::Error::InvalidLoadFactor)
    /// unless `load_factor` lies strictly between 0 and 1.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let map: HashMap<i32, String> = HashMap::with_capacity_and_load_factor(64, 0.9)?;
    /// assert_eq!(map.capacity(), 64);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_capacity_and_load_factor_and_hasher(
            capacity,
            load_factor,
            DefaultHashBuilder::default(),
        )
    }
}

#[cfg(feature = "foldhash")]
impl<K, V> Default for HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map with the given hasher builder.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// # use rh_hash::fnv::Fnv1BuildHasher;
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(Fnv1BuildHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates a map with at least `capacity` slots and the given hasher
    /// builder.
    ///
    /// The slot count is rounded up to a power of two.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Creates a map with at least `capacity` slots, a growth threshold of
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

    /// Returns the number of entries in the map.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a")?;
    /// assert_eq!(map.len(), 1);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the size of the underlying slot array.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the map's growth threshold.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Removes all entries, keeping the slot array at its current size.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert(1, "a")?;
    /// map.clear();
    /// assert!(map.is_empty());
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Grows the map until `additional` more entries fit without resizing.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.table.reserve(additional)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `Ok(None)` is returned. If
    /// it did, the entry is overwritten in its slot and the old value is
    /// returned. Fails only with
    /// [`Error::OutOfMemory`](crate::Error::OutOfMemory) when the map must
    /// grow and cannot; the map is unchanged in that case.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(37, "a")?, None);
    /// assert_eq!(map.insert(37, "b")?, Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let hash = fold_hash(self.hash_builder.hash_one(&key));
        let replaced = self
            .table
            .insert(hash, |(a, _), (b, _)| a == b, (key, value))?;
        Ok(replaced.map(|(_, v)| v))
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert(1, "a")?;
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = fold_hash(self.hash_builder.hash_one(key));
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert(1, 10)?;
    /// if let Some(v) = map.get_mut(&1) {
    ///     *v += 1;
    /// }
    /// assert_eq!(map.get(&1), Some(&11));
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = fold_hash(self.hash_builder.hash_one(key));
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the given key.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert(1, "a")?;
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning the value if the key was
    /// present.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert(1, "a")?;
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = fold_hash(self.hash_builder.hash_one(key));
        self.table.remove(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns an iterator over the map's `(&key, &value)` pairs in slot
    /// order.
    ///
    /// ```rust
    /// # use rh_hash::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert("a", 1)?;
    /// map.insert("b", 2)?;
    ///
    /// let mut pairs: Vec<(&str, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    /// pairs.sort_unstable();
    /// assert_eq!(pairs, [("a", 1), ("b", 2)]);
    /// # Ok::<(), rh_hash::Error>(())
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the map's keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the map's values in slot order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Removes all entries and yields them as owned `(key, value)` pairs.
    ///
    /// Dropping the iterator early still leaves the map empty.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a map's `(&key, &value)` pairs.
pub struct Iter<'a, K, V> {
    inner: hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator over a map's keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// Iterator over a map's values.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// Draining iterator over a map's owned `(key, value)` pairs.
pub struct Drain<'a, K, V> {
    inner: hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
