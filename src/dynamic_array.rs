use core::alloc::Layout;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use log::trace;

use crate::error::{ArrayError, Result};
use crate::sorting;

/// Capacity of an array created with [`DynamicArray::new`].
pub const DEFAULT_CAPACITY: usize = 10;

const GROWTH_FACTOR: usize = 2;

/// Growable contiguous array with checked indexing and in-place sorting.
///
/// Slots `[0, size)` are initialized; slots `[size, capacity)` are not.
/// Capacity only ever grows.
pub struct DynamicArray<T> {
    data: NonNull<T>,
    size: usize,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T> DynamicArray<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Empty array able to hold `capacity` elements before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Self::allocate(capacity),
            size: 0,
            capacity,
            _marker: PhantomData,
        }
    }

    /// Array of `size` elements produced by `f`, with capacity exactly `size`.
    pub fn from_size_with<F: FnMut() -> T>(size: usize, mut f: F) -> Self {
        let mut arr = Self::with_capacity(size);
        for _ in 0..size {
            arr.append(f());
        }
        arr
    }

    pub fn append(&mut self, value: T) {
        self.grow_for(1);
        // SAFETY: grow_for(1) guarantees size < capacity, so the slot at
        // `size` is inside the allocation and currently uninitialized.
        unsafe {
            ptr::write(self.data.as_ptr().add(self.size), value);
        }
        self.size += 1;
    }

    /// Inserts `value` before the element currently at `index`.
    ///
    /// Only occupied positions are accepted: `index` must be below `size()`,
    /// so this cannot be used to append.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        self.grow_for(1);
        // SAFETY: index < size < capacity after grow_for(1). The block
        // [index, size) is moved one slot right into [index + 1, size + 1),
        // which is in bounds; ptr::copy handles the overlap. The slot at
        // index is then logically uninitialized and gets overwritten.
        unsafe {
            let slot = self.data.as_ptr().add(index);
            ptr::copy(slot, slot.add(1), self.size - index);
            ptr::write(slot, value);
        }
        self.size += 1;
        Ok(())
    }

    /// Appends every item, reserving room for the iterator's lower size hint
    /// up front.
    pub fn append_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        let iter = items.into_iter();
        let (lower, _) = iter.size_hint();
        self.grow_for(lower);
        for item in iter {
            self.append(item);
        }
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.check_index(index)?;
        // SAFETY: index < size, and every slot below size is initialized.
        unsafe { Ok(&*self.data.as_ptr().add(index)) }
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_index(index)?;
        // SAFETY: index < size, and every slot below size is initialized.
        unsafe { Ok(&mut *self.data.as_ptr().add(index)) }
    }

    /// Removes and returns the element at `index`, shifting the tail left.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;
        // SAFETY: index < size, so the slot holds a value we move out. The
        // block [index + 1, size) is then moved onto [index, size - 1),
        // leaving slot size - 1 as a stale bitwise copy that is excluded
        // from the live range below.
        let value = unsafe {
            let slot = self.data.as_ptr().add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.size - index - 1);
            value
        };
        self.size -= 1;
        Ok(value)
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.size == 0 {
            None
        } else {
            self.size -= 1;
            // SAFETY: the slot at the old last index is initialized and is no
            // longer part of the live range, so reading it transfers ownership.
            unsafe { Some(ptr::read(self.data.as_ptr().add(self.size))) }
        }
    }

    pub fn front(&self) -> Option<&T> {
        self.get(0).ok()
    }

    pub fn back(&self) -> Option<&T> {
        self.size.checked_sub(1).and_then(|last| self.get(last).ok())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Drops every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        let len = self.size;
        self.size = 0;
        // SAFETY: the first `len` slots were initialized. size is reset
        // first so a panicking destructor cannot lead to a double drop.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.data.as_ptr(), len));
        }
    }

    /// Grows the allocation to hold at least `new_cap` elements.
    pub fn reserve(&mut self, new_cap: usize) {
        if new_cap <= self.capacity {
            return;
        }
        trace!("dynamic array growing from {} to {} slots", self.capacity, new_cap);
        let new_data = Self::allocate(new_cap);
        // SAFETY: both buffers hold at least `size` slots and are distinct
        // allocations (or dangling for zero-sized layouts, where the copy is
        // a no-op). Elements are moved bitwise, so the old buffer is released
        // without dropping them.
        unsafe {
            ptr::copy_nonoverlapping(self.data.as_ptr(), new_data.as_ptr(), self.size);
            self.deallocate();
        }
        self.data = new_data;
        self.capacity = new_cap;
    }

    /// Sorts with `compare` using a Lomuto-partition quicksort.
    ///
    /// Not stable. A comparator that is not a total order yields some
    /// permutation of the elements.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        trace!("quicksort over {} elements", self.size);
        sorting::quick_sort_by(self.live_mut(), compare);
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.size {
            Err(ArrayError::IndexOutOfRange {
                index,
                size: self.size,
            })
        } else {
            Ok(())
        }
    }

    fn grow_for(&mut self, additional: usize) {
        let required = match self.size.checked_add(additional) {
            Some(required) => required,
            None => capacity_overflow(),
        };
        if required > self.capacity {
            let doubled = self.capacity.saturating_mul(GROWTH_FACTOR);
            self.reserve(doubled.max(required));
        }
    }

    fn live(&self) -> &[T] {
        // SAFETY: data is non-null and aligned (dangling only when nothing is
        // allocated), and the first `size` slots are initialized.
        unsafe { core::slice::from_raw_parts(self.data.as_ptr(), self.size) }
    }

    fn live_mut(&mut self) -> &mut [T] {
        // SAFETY: as in live(); &mut self guarantees exclusive access.
        unsafe { core::slice::from_raw_parts_mut(self.data.as_ptr(), self.size) }
    }

    fn layout(capacity: usize) -> Layout {
        match Layout::array::<T>(capacity) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(),
        }
    }

    fn allocate(capacity: usize) -> NonNull<T> {
        let layout = Self::layout(capacity);
        if layout.size() == 0 {
            return NonNull::dangling();
        }
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { std::alloc::alloc(layout) as *mut T };
        match NonNull::new(raw) {
            Some(data) => data,
            None => std::alloc::handle_alloc_error(layout),
        }
    }

    // SAFETY: caller must not use the current buffer afterwards and must have
    // moved or dropped every element in it.
    unsafe fn deallocate(&mut self) {
        let layout = Self::layout(self.capacity);
        if layout.size() != 0 {
            std::alloc::dealloc(self.data.as_ptr() as *mut u8, layout);
        }
    }
}

impl<T: Ord> DynamicArray<T> {
    /// Sorts by natural order using bubble sort, stopping after the first
    /// pass that swaps nothing.
    pub fn sort_natural(&mut self) {
        trace!("bubble sort over {} elements", self.size);
        sorting::bubble_sort_by(self.live_mut(), |a, b| a.cmp(b));
    }
}

impl<T: Default> DynamicArray<T> {
    /// Array already holding `len` default values, with capacity `len`.
    pub fn with_len(len: usize) -> Self {
        Self::from_size_with(len, T::default)
    }
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        let mut new_arr = Self::with_capacity(self.capacity);
        for value in self.live() {
            new_arr.append(value.clone());
        }
        new_arr
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: clear() dropped every element and the buffer is not used again.
        unsafe { self.deallocate() };
    }
}

impl<T> core::ops::Index<usize> for DynamicArray<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T> core::ops::IndexMut<usize> for DynamicArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Display> fmt::Display for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.live().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.live()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.live() == other.live()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append_all(iter);
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.append_all(iter);
        arr
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

// SAFETY: DynamicArray<T> owns its buffer exclusively, so it can move to
// another thread whenever T can.
unsafe impl<T: Send> Send for DynamicArray<T> {}

// SAFETY: &DynamicArray<T> only hands out &T. Every mutation goes through
// &mut self, which the borrow checker keeps exclusive.
unsafe impl<T: Sync> Sync for DynamicArray<T> {}
