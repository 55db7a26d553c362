use crate::error::{PoolError, PoolResult};

/// Strategy used by [`MemoryPool::acquire`](crate::MemoryPool::acquire) to
/// locate a free block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
  /// Walk the chain from the head and take the first block whose
  /// `is_allocated` flag is clear. O(block_count) per acquire.
  #[default]
  FirstFit,
  /// Pop from an intrusive stack of free block indices. O(1) acquire and
  /// release; most recently released blocks are reused first.
  FreeList,
}

/// Parameters fixed at pool initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
  /// Payload size of every block, in bytes.
  pub block_size: usize,
  /// Number of blocks carved out of the data region.
  pub block_count: usize,
  pub search: SearchMode,
  /// Report blocks that are still allocated when the pool is destroyed.
  pub strict_destroy: bool,
}

impl PoolConfig {
  pub fn new(
    block_size: usize,
    block_count: usize,
  ) -> Self {
    Self {
      block_size,
      block_count,
      search: SearchMode::default(),
      strict_destroy: false,
    }
  }

  /// Strict teardown, first-fit search: every misuse is surfaced.
  pub fn debug(
    block_size: usize,
    block_count: usize,
  ) -> Self {
    Self::new(block_size, block_count).with_strict_destroy(true)
  }

  /// Constant-time acquire and release.
  pub fn performance(
    block_size: usize,
    block_count: usize,
  ) -> Self {
    Self::new(block_size, block_count).with_search(SearchMode::FreeList)
  }

  pub fn with_search(
    mut self,
    search: SearchMode,
  ) -> Self {
    self.search = search;
    self
  }

  pub fn with_strict_destroy(
    mut self,
    strict: bool,
  ) -> Self {
    self.strict_destroy = strict;
    self
  }

  /// Size of the single bulk data allocation, if it is representable.
  pub fn total_size(&self) -> Option<usize> {
    self
      .block_size
      .checked_mul(self.block_count)
      .filter(|&total| total <= isize::MAX as usize)
  }

  /// Checks the parameters before anything is allocated.
  pub fn validate(&self) -> PoolResult<()> {
    if self.block_count == 0 {
      return Err(PoolError::InvalidConfig {
        reason: "block count must be positive",
      });
    }

    if self.block_size == 0 {
      return Err(PoolError::InvalidConfig {
        reason: "block size must be positive",
      });
    }

    if self.total_size().is_none() {
      return Err(PoolError::InvalidConfig {
        reason: "block size times block count overflows",
      });
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validate() {
    assert!(PoolConfig::new(16, 3).validate().is_ok());

    assert_eq!(
      Err(PoolError::InvalidConfig {
        reason: "block count must be positive",
      }),
      PoolConfig::new(16, 0).validate()
    );

    assert_eq!(
      Err(PoolError::InvalidConfig {
        reason: "block size must be positive",
      }),
      PoolConfig::new(0, 3).validate()
    );

    assert!(PoolConfig::new(usize::MAX, 2).validate().is_err());
    assert!(PoolConfig::new(isize::MAX as usize, 2).validate().is_err());
  }

  #[test]
  fn test_presets() {
    let debug = PoolConfig::debug(8, 4);
    assert!(debug.strict_destroy);
    assert_eq!(SearchMode::FirstFit, debug.search);

    let fast = PoolConfig::performance(8, 4);
    assert!(!fast.strict_destroy);
    assert_eq!(SearchMode::FreeList, fast.search);

    assert_eq!(Some(32), fast.total_size());
  }
}
