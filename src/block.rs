use std::{ops::Range, ptr::NonNull};

/// Metadata for one fixed-size slot of the pool's data region.
///
/// Blocks never own their span: `data` points into the pool's single bulk
/// data allocation and is only valid while the pool is alive.
#[derive(Debug)]
pub struct Block {
  pub(crate) data: NonNull<u8>,
  pub(crate) is_allocated: bool,
  pub(crate) size: usize,
  /// Next block in creation order.
  pub(crate) next: Option<usize>,
  /// Next free block, only meaningful while this block is free and the pool
  /// keeps an explicit free-list.
  pub(crate) next_free: Option<usize>,
}

impl Block {
  pub(crate) fn new(
    data: NonNull<u8>,
    size: usize,
    next: Option<usize>,
  ) -> Self {
    Self {
      data,
      is_allocated: false,
      size,
      next,
      next_free: next,
    }
  }

  pub fn is_allocated(&self) -> bool {
    self.is_allocated
  }

  pub fn size(&self) -> usize {
    self.size
  }

  /// Index of the next block in the chain, `None` for the last one.
  pub fn next(&self) -> Option<usize> {
    self.next
  }

  pub fn data_ptr(&self) -> *const u8 {
    self.data.as_ptr()
  }

  /// Address range covered by this block's payload.
  pub fn span(&self) -> Range<usize> {
    let start = self.data.as_ptr() as usize;
    start..start + self.size
  }
}

/// Identity of an acquired block, as handed out by
/// [`MemoryPool::acquire`](crate::MemoryPool::acquire).
///
/// A handle is only a token: the payload is reached through the pool
/// ([`MemoryPool::data`](crate::MemoryPool::data) and
/// [`MemoryPool::data_mut`](crate::MemoryPool::data_mut)), so a handle can
/// never outlive the memory it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle {
  index: usize,
  addr: usize,
}

impl BlockHandle {
  pub(crate) fn new(
    index: usize,
    data: NonNull<u8>,
  ) -> Self {
    Self {
      index,
      addr: data.as_ptr() as usize,
    }
  }

  /// Position of the block in its pool's chain.
  pub fn index(&self) -> usize {
    self.index
  }

  /// Start address of the block's payload.
  pub fn addr(&self) -> usize {
    self.addr
  }

  pub(crate) fn matches(
    &self,
    index: usize,
    block: &Block,
  ) -> bool {
    self.index == index && self.addr == block.data.as_ptr() as usize
  }
}
