//! Per-frame bump allocator.
//!
//! The UI context resets the arena at the start of every frame. Allocations
//! hand out small copyable handles rather than references, so the arena can
//! be borrowed mutably again between allocations. Each handle remembers the
//! generation it was made in; after a reset, old handles resolve to `None`
//! instead of aliasing new data.

use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use bytemuck::Pod;

pub const DEFAULT_ARENA_CAPACITY: usize = 256 * 1024;
/// Largest alignment the backing storage guarantees.
const MAX_ALIGN: usize = align_of::<u64>();

/// A run of `T` stored in a [`FrameArena`].
pub struct ArenaSlice<T> {
    offset: u32,
    len: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArenaSlice<T> {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for ArenaSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaSlice<T> {}

impl<T> std::fmt::Debug for ArenaSlice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaSlice")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("generation", &self.generation)
            .finish()
    }
}

/// UTF-8 text stored in a [`FrameArena`].
#[derive(Debug, Clone, Copy)]
pub struct ArenaStr(ArenaSlice<u8>);

impl ArenaStr {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct FrameArena {
    storage: Vec<u64>,
    offset: usize,
    generation: u32,
    high_water: usize,
}

impl FrameArena {
    pub fn new(capacity: usize) -> Self {
        let words = capacity.div_ceil(size_of::<u64>());
        Self {
            storage: vec![0; words],
            offset: 0,
            generation: 0,
            high_water: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len() * size_of::<u64>()
    }

    pub fn used(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.offset
    }

    /// Most bytes in use at any point since creation.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Free everything at once; outstanding handles become stale.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.storage)
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.storage)
    }

    /// Reserve room for `count` values of `T`. `None` when the arena is full
    /// or `T` cannot live in it (zero-sized or over-aligned).
    fn reserve<T: Pod>(&mut self, count: usize) -> Option<(usize, usize)> {
        let size = size_of::<T>();
        let align = align_of::<T>();
        if size == 0 || align > MAX_ALIGN {
            return None;
        }
        let start = self.offset.checked_next_multiple_of(align)?;
        let bytes = size.checked_mul(count)?;
        let end = start.checked_add(bytes)?;
        if end > self.capacity() || end > u32::MAX as usize {
            log::warn!(
                "frame arena exhausted: {} bytes requested, {} of {} in use",
                bytes,
                self.offset,
                self.capacity()
            );
            return None;
        }
        self.offset = end;
        self.high_water = self.high_water.max(end);
        Some((start, end))
    }

    pub fn alloc_slice<T: Pod>(&mut self, values: &[T]) -> Option<ArenaSlice<T>> {
        let (start, end) = self.reserve::<T>(values.len())?;
        self.bytes_mut()[start..end].copy_from_slice(bytemuck::cast_slice(values));
        Some(ArenaSlice {
            offset: start as u32,
            len: values.len() as u32,
            generation: self.generation,
            _marker: PhantomData,
        })
    }

    pub fn alloc<T: Pod>(&mut self, value: T) -> Option<ArenaSlice<T>> {
        self.alloc_slice(std::slice::from_ref(&value))
    }

    pub fn alloc_str(&mut self, text: &str) -> Option<ArenaStr> {
        if text.is_empty() {
            return Some(ArenaStr(ArenaSlice {
                offset: self.offset as u32,
                len: 0,
                generation: self.generation,
                _marker: PhantomData,
            }));
        }
        self.alloc_slice(text.as_bytes()).map(ArenaStr)
    }

    fn range<T>(&self, handle: &ArenaSlice<T>) -> Option<std::ops::Range<usize>> {
        if handle.generation != self.generation {
            return None;
        }
        let start = handle.offset as usize;
        let end = start + handle.len as usize * size_of::<T>();
        (end <= self.offset).then_some(start..end)
    }

    /// Contents of `handle`, or `None` if it predates the last reset.
    pub fn get<T: Pod>(&self, handle: ArenaSlice<T>) -> Option<&[T]> {
        let range = self.range(&handle)?;
        bytemuck::try_cast_slice(&self.bytes()[range]).ok()
    }

    pub fn get_mut<T: Pod>(&mut self, handle: ArenaSlice<T>) -> Option<&mut [T]> {
        let range = self.range(&handle)?;
        bytemuck::try_cast_slice_mut(&mut self.bytes_mut()[range]).ok()
    }

    pub fn get_str(&self, handle: ArenaStr) -> Option<&str> {
        if handle.is_empty() {
            return (handle.0.generation == self.generation).then_some("");
        }
        std::str::from_utf8(self.get(handle.0)?).ok()
    }
}

impl Default for FrameArena {
    fn default() -> Self {
        Self::new(DEFAULT_ARENA_CAPACITY)
    }
}

impl std::fmt::Debug for FrameArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameArena")
            .field("capacity", &self.capacity())
            .field("used", &self.offset)
            .field("generation", &self.generation)
            .finish()
    }
}
