//! A hash table keyed by integers, with visitor traversal.
//!
//! It is based on the table from the `hashbrown` crate. Entries live in a plain slot
//! array next to the control bytes, so the table needs no unsafe code.

use crate::raw::{EMPTY, bitmask::BitMask, imp::Group, is_full};
use std::{
    alloc::{Layout, handle_alloc_error},
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
    iter::FusedIterator,
    mem,
};

mod tests;

/// Default hash builder for [NumTable].
pub type DefaultHashBuilder = ahash::RandomState;

/// Returned by a [NumTable::foreach] visitor to continue or end the traversal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Visit the next entry.
    Continue,
    /// Stop without visiting the remaining entries.
    Stop,
}

/// The error type for `try_reserve` methods.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// Error due to the computed capacity exceeding the collection's maximum
    /// (usually `isize::MAX` bytes).
    CapacityOverflow,

    /// The memory allocator returned an error
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => {
                f.write_str("capacity overflow while reserving table space")
            }
            TryReserveError::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes failed while reserving table space",
                layout.size()
            ),
        }
    }
}

impl std::error::Error for TryReserveError {}

/// Whether memory allocation errors should return an error or abort.
#[derive(Copy, Clone)]
enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    /// Error to return on capacity overflow.
    #[inline]
    fn capacity_overflow(self) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::CapacityOverflow,
            Fallibility::Infallible => panic!("capacity overflow"),
        }
    }

    /// Error to return on allocation error.
    #[inline]
    fn alloc_err(self, layout: Layout) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::AllocError { layout },
            Fallibility::Infallible => handle_alloc_error(layout),
        }
    }
}

/// The storage behind [NumTable]: control bytes and a slot per bucket.
#[derive(Clone)]
struct RawTable<T> {
    // Mask to get an index from a hash value. The value is one less than the
    // number of buckets in the table.
    bucket_mask: usize,

    // One byte per bucket, followed by a copy of the first `Group::WIDTH`
    // bytes so a group can be loaded at any bucket index.
    ctrl: Box<[u8]>,

    slots: Box<[Option<T>]>,

    // Number of elements that can be inserted before we need to grow the table
    growth_left: usize,

    // Number of elements in the table, only really used by len()
    items: usize,
}

impl<T> RawTable<T> {
    /// Creates a new empty table without allocating any memory.
    #[inline]
    fn new() -> Self {
        Self {
            bucket_mask: 0,
            ctrl: Box::default(),
            slots: Box::default(),
            growth_left: 0,
            items: 0,
        }
    }

    /// Allocates a new table able to hold at least `capacity` elements.
    fn fallible_with_capacity(
        capacity: usize,
        fallibility: Fallibility,
    ) -> Result<Self, TryReserveError> {
        if capacity == 0 {
            Ok(Self::new())
        } else {
            let buckets =
                capacity_to_buckets(capacity).ok_or_else(|| fallibility.capacity_overflow())?;
            Self::allocate(buckets, fallibility)
        }
    }

    /// Allocates a new table able to hold at least `capacity` elements, panicking
    /// or aborting when that is not possible.
    fn with_capacity(capacity: usize) -> Self {
        match Self::fallible_with_capacity(capacity, Fallibility::Infallible) {
            Ok(table) => table,
            Err(_) => unreachable!("infallible allocation returned an error"),
        }
    }

    /// Allocates a table with `buckets` empty buckets. `buckets` must be a power
    /// of two no smaller than `Group::WIDTH`.
    fn allocate(buckets: usize, fallibility: Fallibility) -> Result<Self, TryReserveError> {
        debug_assert!(buckets.is_power_of_two());
        debug_assert!(buckets >= Group::WIDTH);

        let num_ctrl_bytes = buckets
            .checked_add(Group::WIDTH)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        let slots_layout =
            Layout::array::<Option<T>>(buckets).map_err(|_| fallibility.capacity_overflow())?;
        let ctrl_layout =
            Layout::array::<u8>(num_ctrl_bytes).map_err(|_| fallibility.capacity_overflow())?;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(buckets)
            .map_err(|_| fallibility.alloc_err(slots_layout))?;
        slots.resize_with(buckets, || None);

        let mut ctrl = Vec::new();
        ctrl.try_reserve_exact(num_ctrl_bytes)
            .map_err(|_| fallibility.alloc_err(ctrl_layout))?;
        ctrl.resize(num_ctrl_bytes, EMPTY);

        Ok(Self {
            bucket_mask: buckets - 1,
            ctrl: ctrl.into_boxed_slice(),
            slots: slots.into_boxed_slice(),
            growth_left: bucket_mask_to_capacity(buckets - 1),
            items: 0,
        })
    }

    /// Returns the number of buckets in the table.
    #[inline]
    fn buckets(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of elements the table can hold without reallocating.
    #[inline]
    fn capacity(&self) -> usize {
        self.items + self.growth_left
    }

    /// Returns the number of heap bytes owned by the table.
    #[inline]
    fn allocation_size(&self) -> usize {
        self.ctrl.len() + self.slots.len() * mem::size_of::<Option<T>>()
    }

    /// Sets a control byte, and possibly also the replicated control byte at
    /// the end of the array.
    #[inline]
    fn set_ctrl(&mut self, index: usize, ctrl: u8) {
        // Replicate the first Group::WIDTH control bytes at the end of
        // the array without using a branch:
        // - If index >= Group::WIDTH then index == index2.
        // - Otherwise index2 == self.bucket_mask + 1 + index.
        //
        // Tables always have at least Group::WIDTH buckets, so the replicated
        // bytes are exactly the first group.
        let index2 = ((index.wrapping_sub(Group::WIDTH)) & self.bucket_mask) + Group::WIDTH;

        self.ctrl[index] = ctrl;
        self.ctrl[index2] = ctrl;
    }

    /// Sets a control byte to the hash, and possibly also the replicated control byte at
    /// the end of the array.
    #[inline]
    fn set_ctrl_h2(&mut self, index: usize, hash: u64) {
        self.set_ctrl(index, h2(hash))
    }

    /// Returns an iterator-like object for a probe sequence on the table.
    ///
    /// This iterator never terminates, but is guaranteed to visit each bucket
    /// group exactly once. The loop using `probe_seq` must terminate upon
    /// reaching a group containing an empty bucket.
    #[inline]
    fn probe_seq(&self, hash: u64) -> ProbeSeq {
        ProbeSeq {
            pos: h1(hash) & self.bucket_mask,
            stride: 0,
        }
    }

    /// Searches for an empty bucket which is suitable for inserting a new
    /// element.
    ///
    /// There must be at least 1 empty bucket in the table.
    #[inline]
    fn find_insert_slot(&self, hash: u64) -> usize {
        let mut probe_seq = self.probe_seq(hash);
        loop {
            let group = Group::load(&self.ctrl, probe_seq.pos);
            if let Some(bit) = group.match_empty().lowest_set_bit() {
                return (probe_seq.pos + bit) & self.bucket_mask;
            }
            probe_seq.move_next(self.bucket_mask);
        }
    }

    /// Searches for an element in the table and returns its bucket index.
    #[inline]
    fn find(&self, hash: u64, mut eq: impl FnMut(&T) -> bool) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }

        let h2_hash = h2(hash);
        let mut probe_seq = self.probe_seq(hash);

        loop {
            let group = Group::load(&self.ctrl, probe_seq.pos);

            for bit in group.match_byte(h2_hash) {
                let index = (probe_seq.pos + bit) & self.bucket_mask;
                if let Some(elm) = &self.slots[index] {
                    if eq(elm) {
                        return Some(index);
                    }
                }
            }

            if group.match_empty().any_bit_set() {
                return None;
            }

            probe_seq.move_next(self.bucket_mask);
        }
    }

    /// Gets a mutable reference to the element in bucket `index`.
    #[inline]
    fn slot_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots[index].as_mut()
    }

    /// Inserts a new element into the table.
    ///
    /// This does not check if the given element already exists in the table.
    #[inline]
    fn insert(&mut self, hash: u64, value: T, hasher: impl Fn(&T) -> u64) {
        if self.growth_left == 0
            && cold_path(|| self.reserve_rehash(1, &hasher, Fallibility::Infallible)).is_err()
        {
            unreachable!("infallible allocation returned an error");
        }

        let index = self.find_insert_slot(hash);
        debug_assert!(!is_full(self.ctrl[index]));

        self.set_ctrl_h2(index, hash);
        self.slots[index] = Some(value);
        self.growth_left -= 1;
        self.items += 1;
    }

    /// Ensures that at least `additional` items can be inserted into the table
    /// without reallocation.
    #[inline]
    fn reserve(
        &mut self,
        additional: usize,
        hasher: impl Fn(&T) -> u64,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        if additional > self.growth_left {
            cold_path(|| self.reserve_rehash(additional, &hasher, fallibility))
        } else {
            Ok(())
        }
    }

    /// Out-of-line slow path for `reserve` and `try_reserve`.
    fn reserve_rehash(
        &mut self,
        additional: usize,
        hasher: &impl Fn(&T) -> u64,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        let new_items = self
            .items
            .checked_add(additional)
            .ok_or_else(|| fallibility.capacity_overflow())?;

        let full_capacity = bucket_mask_to_capacity(self.bucket_mask);

        self.resize(usize::max(new_items, full_capacity + 1), hasher, fallibility)
    }

    /// Allocates a new table of a different size and moves the contents of the
    /// current table into it.
    fn resize(
        &mut self,
        capacity: usize,
        hasher: &impl Fn(&T) -> u64,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        debug_assert!(self.items <= capacity);

        let mut new_table = Self::fallible_with_capacity(capacity, fallibility)?;

        tracing::trace!(
            old_buckets = self.buckets(),
            new_buckets = new_table.buckets(),
            items = self.items,
            "resizing table"
        );

        // We can use a simpler version of insert() here since:
        // - we know there is enough space in the table.
        // - all elements are unique.
        for slot in self.slots.iter_mut() {
            if let Some(item) = slot.take() {
                let hash = hasher(&item);
                let index = new_table.find_insert_slot(hash);
                new_table.set_ctrl_h2(index, hash);
                new_table.slots[index] = Some(item);
            }
        }

        new_table.growth_left -= self.items;
        new_table.items = self.items;

        *self = new_table;

        Ok(())
    }

    /// Removes all elements from the table without freeing the backing memory.
    fn clear(&mut self) {
        self.ctrl.fill(EMPTY);
        self.slots.fill_with(|| None);
        self.items = 0;
        self.growth_left = bucket_mask_to_capacity(self.bucket_mask);
    }

    /// Returns an iterator over every element in the table.
    #[inline]
    fn iter(&self) -> RawIter<'_, T> {
        let current_group = if self.slots.is_empty() {
            BitMask(0)
        } else {
            Group::load(&self.ctrl, 0).match_full()
        };

        RawIter {
            ctrl: &self.ctrl,
            slots: &self.slots,
            current_group,
            group_pos: 0,
            items: self.items,
        }
    }
}

/// A hash table keyed by integers.
///
/// Entries are `(K, V)` pairs with unique keys. The table grows as entries are inserted and
/// never shrinks. Traversal is either through [NumTable::foreach], with a visitor that can
/// stop early, or through the regular iterators.
///
/// ```
/// use numtable::{Flow, NumTable};
///
/// let mut table = NumTable::with_capacity(128);
/// table.insert(1, 3);
/// table.insert(2, 4);
///
/// let mut total = 0;
/// table.foreach(|_, v| {
///     total += v;
///     Flow::Continue
/// });
/// assert_eq!(total, 7);
/// assert_eq!(table.lookup(&2), Some(4));
/// table.free();
/// ```
#[derive(Clone)]
pub struct NumTable<K, V, S = DefaultHashBuilder> {
    hash_builder: S,
    table: RawTable<(K, V)>,
}

impl<K, V> NumTable<K, V, DefaultHashBuilder> {
    /// Creates an empty [NumTable].
    ///
    /// The table is initially created with a capacity of 0, so it will not allocate until it
    /// is first inserted into.
    #[inline]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty [NumTable] with the specified capacity.
    ///
    /// The table will be able to hold at least `capacity` elements without
    /// reallocating. If `capacity` is 0, the table will not allocate.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> NumTable<K, V, S> {
    /// Creates an empty [NumTable] which will use the given hash builder to hash keys.
    #[inline]
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            hash_builder,
            table: RawTable::new(),
        }
    }

    /// Creates an empty [NumTable] with the specified capacity, using `hash_builder`
    /// to hash the keys.
    ///
    /// The table will be able to hold at least `capacity` elements without
    /// reallocating. If `capacity` is 0, the table will not allocate.
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            hash_builder,
            table: RawTable::with_capacity(capacity),
        }
    }

    /// Returns a reference to the table's [BuildHasher].
    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements the table can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of elements in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.items
    }

    /// Returns `true` if the table contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of bytes used by the table, including its heap storage.
    pub fn memsize(&self) -> usize {
        mem::size_of::<Self>() + self.table.allocation_size()
    }

    /// An iterator visiting all key-value pairs in arbitrary order.
    /// The iterator element type is `(&'a K, &'a V)`.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// An iterator visiting all keys in arbitrary order.
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in arbitrary order.
    #[inline]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Calls `f` on every entry in arbitrary order until it returns [Flow::Stop].
    ///
    /// Returns [Flow::Stop] if the traversal was stopped by `f` and [Flow::Continue] if
    /// every entry was visited.
    pub fn foreach<F>(&self, mut f: F) -> Flow
    where
        F: FnMut(&K, &V) -> Flow,
    {
        for (k, v) in self.iter() {
            if f(k, v) == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Clears the table, removing all key-value pairs. Keeps the allocated memory
    /// for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Destroys the table, releasing its storage.
    ///
    /// This is the same as dropping it, but records the release in the trace log.
    pub fn free(self) {
        tracing::debug!(
            items = self.len(),
            buckets = self.table.buckets(),
            "freeing table"
        );
    }
}

impl<K, V, S> NumTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Reserves capacity for at least `additional` more elements to be inserted
    /// in the table. The collection may reserve more space to avoid
    /// frequent reallocations.
    ///
    /// # Panics
    ///
    /// Panics if the new allocation size overflows [usize].
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        if self
            .try_reserve_inner(additional, Fallibility::Infallible)
            .is_err()
        {
            unreachable!("infallible allocation returned an error");
        }
    }

    /// Tries to reserve capacity for at least `additional` more elements to be inserted
    /// in the table. The collection may reserve more space to avoid
    /// frequent reallocations.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, then an error
    /// is returned.
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.try_reserve_inner(additional, Fallibility::Fallible)
    }

    #[inline]
    fn try_reserve_inner(
        &mut self,
        additional: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        self.table.reserve(
            additional,
            entry_hasher(&self.hash_builder),
            fallibility,
        )
    }

    /// Inserts a key-value pair into the table.
    ///
    /// If the table did not have this key present, [None] is returned.
    ///
    /// If the table did have this key present, the value is updated, and the old
    /// value is returned.
    pub fn insert(&mut self, k: K, v: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&k);
        match self.table.find(hash, key_eq(&k)) {
            Some(index) => self
                .table
                .slot_mut(index)
                .map(|item| mem::replace(&mut item.1, v)),
            None => {
                self.table
                    .insert(hash, (k, v), entry_hasher(&self.hash_builder));
                None
            }
        }
    }

    /// Inserts a key-value pair without checking whether the key is already present.
    ///
    /// The caller must ensure `k` is not in the table, otherwise the table will hold two
    /// entries for the same key and it is unspecified which one lookups find.
    pub fn insert_new(&mut self, k: K, v: V) {
        let hash = self.hash_builder.hash_one(&k);
        debug_assert!(
            self.table.find(hash, key_eq(&k)).is_none(),
            "insert_new called with a key already in the table"
        );
        self.table
            .insert(hash, (k, v), entry_hasher(&self.hash_builder));
    }

    /// Sets the value of `k` to the result of `f`, which receives the current value
    /// if there is one.
    ///
    /// Returns `true` if the key was already present.
    pub fn update<F>(&mut self, k: K, f: F) -> bool
    where
        F: FnOnce(Option<&V>) -> V,
    {
        let hash = self.hash_builder.hash_one(&k);
        match self.table.find(hash, key_eq(&k)) {
            Some(index) => {
                if let Some((_, v)) = self.table.slot_mut(index) {
                    let new = f(Some(&*v));
                    *v = new;
                }
                true
            }
            None => {
                let v = f(None);
                self.table
                    .insert(hash, (k, v), entry_hasher(&self.hash_builder));
                false
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    #[inline]
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(k);
        let index = self.table.find(hash, key_eq(k))?;
        match &self.table.slots[index] {
            Some((_, v)) => Some(v),
            None => None,
        }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    #[inline]
    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(k);
        let index = self.table.find(hash, key_eq(k))?;
        self.table.slot_mut(index).map(|(_, v)| v)
    }

    /// Returns `true` if the table contains a value for the specified key.
    #[inline]
    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(k).is_some()
    }

    /// Returns a copy of the value corresponding to the key.
    #[inline]
    pub fn lookup<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Copy,
    {
        self.get(k).copied()
    }
}

impl<K, V, S: Default> Default for NumTable<K, V, S> {
    #[inline]
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for NumTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for NumTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        // Keys may be already present or show multiple times in the iterator.
        // Reserve the entire hint lower bound if the table is empty.
        // Otherwise reserve half the hint (rounded up), so the table
        // will only resize twice in the worst case.
        let iter = iter.into_iter();
        let reserve = if self.is_empty() {
            iter.size_hint().0
        } else {
            (iter.size_hint().0 + 1) / 2
        };
        self.reserve(reserve);
        iter.for_each(move |(k, v)| {
            self.insert(k, v);
        });
    }
}

impl<K, V, S> FromIterator<(K, V)> for NumTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<'a, K, V, S> IntoIterator for &'a NumTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Iterator which returns a reference to every full bucket in the table.
///
/// The order in which the iterator yields buckets is unspecified.
struct RawIter<'a, T> {
    ctrl: &'a [u8],
    slots: &'a [Option<T>],

    // Mask of full buckets in the current group. Bits are cleared from this
    // mask as each element is processed.
    current_group: BitMask,

    // Index of the first bucket of the current group.
    group_pos: usize,

    // Number of elements left to yield.
    items: usize,
}

impl<T> Clone for RawIter<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            ctrl: self.ctrl,
            slots: self.slots,
            current_group: self.current_group,
            group_pos: self.group_pos,
            items: self.items,
        }
    }
}

impl<'a, T> Iterator for RawIter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.items == 0 {
            return None;
        }

        let slots = self.slots;
        loop {
            if let Some(bit) = self.current_group.lowest_set_bit() {
                self.current_group = self.current_group.remove_lowest_bit();
                if let Some(item) = &slots[self.group_pos + bit] {
                    self.items -= 1;
                    return Some(item);
                }
                continue;
            }

            // Bucket counts are multiples of the group size, so groups never
            // straddle the end of the table here.
            self.group_pos += Group::WIDTH;
            if self.group_pos >= slots.len() {
                self.items = 0;
                return None;
            }
            self.current_group = Group::load(self.ctrl, self.group_pos).match_full();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.items, Some(self.items))
    }
}

impl<T> ExactSizeIterator for RawIter<'_, T> {}
impl<T> FusedIterator for RawIter<'_, T> {}

/// An iterator over the entries of a [NumTable].
///
/// This `struct` is created by the [NumTable::iter] method.
pub struct Iter<'a, K, V> {
    inner: RawIter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        // Avoid `Option::map` because it bloats LLVM IR.
        match self.inner.next() {
            Some((k, v)) => Some((k, v)),
            None => None,
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a [NumTable].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        match self.inner.next() {
            Some((k, _)) => Some(k),
            None => None,
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [NumTable].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        match self.inner.next() {
            Some((_, v)) => Some(v),
            None => None,
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

#[inline(never)]
#[cold]
fn cold_path<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}

/// Compares the key of an entry with `k`.
#[inline]
fn key_eq<Q, K, V>(k: &Q) -> impl Fn(&(K, V)) -> bool + '_
where
    K: Borrow<Q>,
    Q: ?Sized + Eq,
{
    move |entry| k == entry.0.borrow()
}

/// Hashes the key of an entry, for moving entries into a resized table.
#[inline]
fn entry_hasher<K: Hash, V, S: BuildHasher>(hash_builder: &S) -> impl Fn(&(K, V)) -> u64 + '_ {
    move |entry| hash_builder.hash_one(&entry.0)
}

/// Returns the maximum effective capacity for the given bucket mask, taking
/// the maximum load factor into account.
#[inline]
fn bucket_mask_to_capacity(bucket_mask: usize) -> usize {
    if bucket_mask < 8 {
        // For tables with 1/2/4/8 buckets, we always reserve one empty slot.
        // Keep in mind that the bucket mask is one less than the bucket count.
        bucket_mask
    } else {
        // For larger tables we reserve 12.5% of the slots as empty.
        ((bucket_mask + 1) / 8) * 7
    }
}

/// Returns the number of buckets needed to hold the given number of items,
/// taking the maximum load factor into account.
///
/// Returns `None` if an overflow occurs.
#[inline]
fn capacity_to_buckets(cap: usize) -> Option<usize> {
    debug_assert_ne!(cap, 0);

    // For small tables we require at least 1 empty bucket so that lookups are
    // guaranteed to terminate if an element doesn't exist in the table.
    let result = if cap < 8 {
        // We don't bother with a table size of 2 buckets since that can only
        // hold a single element. Instead we skip directly to a 4 bucket table
        // which can hold 3 elements.
        if cap < 4 { 4 } else { 8 }
    } else {
        // Otherwise require 1/8 buckets to be empty (87.5% load)
        let adjusted_cap = cap.checked_mul(8)? / 7;

        // Any overflows will have been caught by the checked_mul. Also, any
        // rounding errors from the division above will be cleaned up by
        // next_power_of_two (which can't overflow because of the previous divison).
        adjusted_cap.next_power_of_two()
    };

    // Have at least the number of buckets required to fill a group.
    // This avoids logic to deal with control bytes not associated with a bucket
    // when batch processing a group.
    Some(usize::max(result, Group::WIDTH))
}

/// Primary hash function, used to select the initial bucket to probe from.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn h1(hash: u64) -> usize {
    // On 32-bit platforms we simply ignore the higher hash bits.
    hash as usize
}

/// Secondary hash function, saved in the low 7 bits of the control byte.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn h2(hash: u64) -> u8 {
    // Grab the top 7 bits of the hash. While the hash is normally a full 64-bit
    // value, some hash functions (such as FxHash) produce a usize result
    // instead, which means that the top 32 bits are 0 on 32-bit platforms.
    let hash_len = usize::min(mem::size_of::<usize>(), mem::size_of::<u64>());
    let top7 = hash >> (hash_len * 8 - 7);
    (top7 & 0x7f) as u8 // truncation
}

/// Probe sequence based on triangular numbers, which is guaranteed (since our
/// table size is a power of two) to visit every group of elements exactly once.
///
/// A triangular probe has us jump by 1 more group every time. So first we
/// jump by 1 group (meaning we just continue our linear scan), then 2 groups
/// (skipping over 1 group), then 3 groups (skipping over 2 groups), and so on.
///
/// Proof that the probe will visit every group in the table:
/// <https://fgiesen.wordpress.com/2015/02/22/triangular-numbers-mod-2n/>
struct ProbeSeq {
    pos: usize,
    stride: usize,
}

impl ProbeSeq {
    #[inline]
    fn move_next(&mut self, bucket_mask: usize) {
        // We should have found an empty bucket by now and ended the probe.
        debug_assert!(
            self.stride <= bucket_mask,
            "Went past end of probe sequence"
        );

        self.stride += Group::WIDTH;
        self.pos += self.stride;
        self.pos &= bucket_mask;
    }
}
