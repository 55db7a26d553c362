use std::{alloc::Layout, fmt, mem, ops::Range, ptr, slice};

use tracing::{debug, trace, warn};

use crate::{
  block::{Block, BlockHandle},
  config::{PoolConfig, SearchMode},
  error::{PoolError, PoolResult, Region},
  region::{RawAllocator, RawRegion, SystemAllocator},
};

/// Alignment of the data region, so a block of suitable size can hold any
/// primitive at its start, as a standalone `malloc` result could.
const DATA_ALIGN: usize = 16;

/// Fixed-size block pool.
///
/// Owns two bulk regions obtained once at initialization: the block
/// metadata array and the data buffer those blocks partition. Acquire and
/// release only flip flags and never call the allocator again.
pub struct MemoryPool<A: RawAllocator = SystemAllocator> {
  // Field order is teardown order: data buffer first, then the metadata.
  data: RawRegion<A>,
  records: RawRegion<A>,
  config: PoolConfig,
  head: usize,
  free_head: Option<usize>,
  allocated: usize,
}

/// Point-in-time counters of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
  pub block_size: usize,
  pub block_count: usize,
  pub total_size: usize,
  pub allocated: usize,
  pub free: usize,
}

// The pool exclusively owns both regions; nothing it hands out aliases them
// without borrowing the pool.
unsafe impl<A: RawAllocator + Send> Send for MemoryPool<A> {}

impl MemoryPool {
  pub fn new(
    block_size: usize,
    block_count: usize,
  ) -> PoolResult<Self> {
    Self::with_config(PoolConfig::new(block_size, block_count))
  }

  pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
    Self::with_allocator(config, SystemAllocator)
  }
}

impl<A: RawAllocator> MemoryPool<A> {
  /// Validates `config`, then obtains the metadata array and the data buffer
  /// from `allocator` and links every block into the chain.
  ///
  /// If the second allocation fails the first one is handed back before the
  /// error is returned.
  pub fn with_allocator(
    config: PoolConfig,
    allocator: A,
  ) -> PoolResult<Self> {
    config.validate()?;

    let block_size = config.block_size;
    let block_count = config.block_count;
    let total_size = block_size * block_count;

    let records_layout = Layout::array::<Block>(block_count).map_err(|_| PoolError::InvalidConfig {
      reason: "block metadata does not fit in memory",
    })?;
    let data_layout =
      Layout::from_size_align(total_size, DATA_ALIGN).map_err(|_| PoolError::InvalidConfig {
        reason: "block size times block count overflows",
      })?;

    let records = RawRegion::zeroed(records_layout, allocator.clone(), Region::Metadata)?;
    let data = RawRegion::zeroed(data_layout, allocator, Region::Data)?;

    let base = data.base();
    let first = records.base().cast::<Block>();

    for index in 0..block_count {
      let next = (index + 1 < block_count).then_some(index + 1);

      unsafe {
        // Every span is computed from the region base, never from the
        // previous block.
        let span = base.add(index * block_size);
        first.add(index).write(Block::new(span, block_size, next));
      }
    }

    debug!(
      block_size,
      block_count,
      total_size,
      search = ?config.search,
      "memory pool initialized"
    );

    Ok(Self {
      data,
      records,
      config,
      head: 0,
      free_head: Some(0),
      allocated: 0,
    })
  }

  /// Marks the first free block as allocated and returns its handle.
  pub fn acquire(&mut self) -> PoolResult<BlockHandle> {
    let found = match self.config.search {
      SearchMode::FirstFit => self.find_free_block(),
      SearchMode::FreeList => self.free_head,
    };

    let Some(index) = found else {
      warn!(capacity = self.config.block_count, "memory pool exhausted");
      return Err(PoolError::Exhausted {
        capacity: self.config.block_count,
      });
    };

    let (handle, next_free) = {
      let block = &mut self.records_mut()[index];
      block.is_allocated = true;
      (BlockHandle::new(index, block.data), block.next_free.take())
    };

    if self.config.search == SearchMode::FreeList {
      self.free_head = next_free;
    }
    self.allocated += 1;

    trace!(index, allocated = self.allocated, "block acquired");

    Ok(handle)
  }

  /// Clears the block's flag and zeroes its payload.
  ///
  /// Releasing a block that is already free only zeroes it again.
  pub fn release(
    &mut self,
    handle: BlockHandle,
  ) -> PoolResult<()> {
    let Some(index) = self.find_block(&handle) else {
      warn!(index = handle.index(), "release of a block this pool does not own");
      return Err(PoolError::NotFound {
        index: handle.index(),
      });
    };

    let free_head = self.free_head;
    let keeps_free_list = self.config.search == SearchMode::FreeList;

    let was_allocated = {
      let block = &mut self.records_mut()[index];
      let was_allocated = mem::replace(&mut block.is_allocated, false);

      unsafe { ptr::write_bytes(block.data.as_ptr(), 0, block.size) };

      if was_allocated && keeps_free_list {
        block.next_free = free_head;
      }
      was_allocated
    };

    if was_allocated {
      if keeps_free_list {
        self.free_head = Some(index);
      }
      self.allocated -= 1;
    }

    trace!(index, allocated = self.allocated, "block released");

    Ok(())
  }

  /// Hands both regions back to the allocator, data buffer first.
  ///
  /// With [`PoolConfig::strict_destroy`] set, blocks still allocated at this
  /// point are reported as [`PoolError::Outstanding`]; the memory is released
  /// either way.
  pub fn destroy(self) -> PoolResult<()> {
    let allocated = self.allocated;
    let strict = self.config.strict_destroy;

    debug!(
      block_count = self.config.block_count,
      allocated, "memory pool destroyed"
    );

    drop(self);

    if strict && allocated > 0 {
      warn!(allocated, "memory pool destroyed with blocks still in use");
      return Err(PoolError::Outstanding { allocated });
    }

    Ok(())
  }

  /// Prints every block in chain order as `[size | allocated]`.
  pub fn dump_blocks(&self) {
    println!("{self}");
  }

  pub fn block_size(&self) -> usize {
    self.config.block_size
  }

  pub fn block_count(&self) -> usize {
    self.config.block_count
  }

  pub fn total_size(&self) -> usize {
    self.data.len()
  }

  pub fn allocated_count(&self) -> usize {
    self.allocated
  }

  pub fn free_count(&self) -> usize {
    self.config.block_count - self.allocated
  }

  pub fn config(&self) -> &PoolConfig {
    &self.config
  }

  pub fn stats(&self) -> PoolStats {
    PoolStats {
      block_size: self.block_size(),
      block_count: self.block_count(),
      total_size: self.total_size(),
      allocated: self.allocated_count(),
      free: self.free_count(),
    }
  }

  /// Address range of the whole data region.
  pub fn data_span(&self) -> Range<usize> {
    let start = self.data.base().as_ptr() as usize;
    start..start + self.data.len()
  }

  /// Blocks in chain order, allocated and free interleaved.
  pub fn blocks(&self) -> Chain<'_> {
    Chain {
      records: self.records(),
      current: Some(self.head),
    }
  }

  pub fn contains(
    &self,
    handle: BlockHandle,
  ) -> bool {
    self.lookup(&handle).is_some()
  }

  /// Metadata of the block named by `handle`.
  pub fn block(
    &self,
    handle: BlockHandle,
  ) -> PoolResult<&Block> {
    self
      .lookup(&handle)
      .map(|index| &self.records()[index])
      .ok_or(PoolError::NotFound {
        index: handle.index(),
      })
  }

  /// Payload of an acquired block.
  pub fn data(
    &self,
    handle: BlockHandle,
  ) -> PoolResult<&[u8]> {
    let index = self.allocated_index(&handle)?;
    let block = &self.records()[index];

    Ok(unsafe { slice::from_raw_parts(block.data.as_ptr(), block.size) })
  }

  /// Mutable payload of an acquired block.
  pub fn data_mut(
    &mut self,
    handle: BlockHandle,
  ) -> PoolResult<&mut [u8]> {
    let index = self.allocated_index(&handle)?;
    let block = &self.records()[index];
    let (data, size) = (block.data, block.size);

    Ok(unsafe { slice::from_raw_parts_mut(data.as_ptr(), size) })
  }

  fn records(&self) -> &[Block] {
    let first = self.records.base().cast::<Block>();
    unsafe { slice::from_raw_parts(first.as_ptr(), self.config.block_count) }
  }

  fn records_mut(&mut self) -> &mut [Block] {
    let first = self.records.base().cast::<Block>();
    unsafe { slice::from_raw_parts_mut(first.as_ptr(), self.config.block_count) }
  }

  fn find_free_block(&self) -> Option<usize> {
    let records = self.records();
    let mut current = Some(self.head);

    while let Some(index) = current {
      if !records[index].is_allocated {
        return Some(index);
      }
      current = records[index].next;
    }

    None
  }

  /// Locates the record `handle` refers to. First-fit pools walk the chain;
  /// free-list pools trust the index and only check identity.
  fn find_block(
    &self,
    handle: &BlockHandle,
  ) -> Option<usize> {
    if self.config.search == SearchMode::FreeList {
      return self.lookup(handle);
    }

    let records = self.records();
    let mut current = Some(self.head);

    while let Some(index) = current {
      if handle.matches(index, &records[index]) {
        return Some(index);
      }
      current = records[index].next;
    }

    None
  }

  fn lookup(
    &self,
    handle: &BlockHandle,
  ) -> Option<usize> {
    let index = handle.index();

    self
      .records()
      .get(index)
      .filter(|block| handle.matches(index, block))
      .map(|_| index)
  }

  fn allocated_index(
    &self,
    handle: &BlockHandle,
  ) -> PoolResult<usize> {
    let index = self.lookup(handle).ok_or(PoolError::NotFound {
      index: handle.index(),
    })?;

    if !self.records()[index].is_allocated {
      return Err(PoolError::NotAllocated { index });
    }

    Ok(index)
  }
}

impl<A: RawAllocator> fmt::Display for MemoryPool<A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    for block in self.blocks() {
      write!(f, "[{} | {}] => ", block.size(), u8::from(block.is_allocated()))?;
    }
    Ok(())
  }
}

impl<A: RawAllocator> fmt::Debug for MemoryPool<A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("MemoryPool")
      .field("config", &self.config)
      .field("allocated", &self.allocated)
      .field("data", &self.data.base())
      .finish()
  }
}

/// Iterator over a pool's blocks following the `next` links.
pub struct Chain<'a> {
  records: &'a [Block],
  current: Option<usize>,
}

impl<'a> Iterator for Chain<'a> {
  type Item = &'a Block;

  fn next(&mut self) -> Option<Self::Item> {
    let block = &self.records[self.current?];
    self.current = block.next;
    Some(block)
  }
}

/// Acquires from a pool that may not have been initialized.
pub fn acquire<A: RawAllocator>(pool: Option<&mut MemoryPool<A>>) -> PoolResult<BlockHandle> {
  pool.ok_or(PoolError::NullPool)?.acquire()
}

/// Releases into a pool that may not have been initialized.
pub fn release<A: RawAllocator>(
  pool: Option<&mut MemoryPool<A>>,
  handle: BlockHandle,
) -> PoolResult<()> {
  pool.ok_or(PoolError::NullPool)?.release(handle)
}

/// Destroys `pool` if there is one. Destroying nothing succeeds.
pub fn destroy<A: RawAllocator>(pool: Option<MemoryPool<A>>) -> PoolResult<()> {
  match pool {
    Some(pool) => pool.destroy(),
    None => Ok(()),
  }
}

/// Prints the pool's chain, or nothing for an uninitialized pool.
pub fn dump_blocks<A: RawAllocator>(pool: Option<&MemoryPool<A>>) {
  if let Some(pool) = pool {
    pool.dump_blocks();
  }
}
