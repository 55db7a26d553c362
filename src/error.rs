//! Error and status types for the pool manager.

use std::fmt;

use thiserror::Error;

/// Which of the two bulk regions an allocation failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
  /// The array of [`Block`](crate::Block) metadata records.
  Metadata,
  /// The contiguous buffer holding every block's payload.
  Data,
}

impl fmt::Display for Region {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Self::Metadata => write!(f, "metadata"),
      Self::Data => write!(f, "data"),
    }
  }
}

/// Failures reported by [`MemoryPool`](crate::MemoryPool) operations.
#[must_use = "errors should be handled"]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
  #[error("invalid pool configuration: {reason}")]
  InvalidConfig { reason: &'static str },

  #[error("unable to allocate {size} bytes for the pool {region} region")]
  AllocationFailed { region: Region, size: usize },

  #[error("operation on an uninitialized pool")]
  NullPool,

  #[error("pool exhausted: all {capacity} blocks are in use")]
  Exhausted { capacity: usize },

  #[error("block {index} does not belong to this pool")]
  NotFound { index: usize },

  #[error("block {index} is not currently allocated")]
  NotAllocated { index: usize },

  #[error("pool destroyed with {allocated} blocks still allocated")]
  Outstanding { allocated: usize },
}

impl PoolError {
  /// Status code this error is reported as.
  pub fn status(&self) -> Status {
    match self {
      Self::InvalidConfig { .. } | Self::AllocationFailed { .. } => Status::InitError,
      Self::NullPool => Status::AllocError,
      Self::Exhausted { .. } => Status::PoolExhausted,
      Self::NotFound { .. } | Self::NotAllocated { .. } => Status::NotFound,
      Self::Outstanding { .. } => Status::DestroyError,
    }
  }

  /// Whether the same call may succeed later without changing its arguments.
  ///
  /// Exhaustion clears once blocks are released; a failed system allocation
  /// may succeed once memory pressure drops.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::Exhausted { .. } | Self::AllocationFailed { .. })
  }
}

pub type PoolResult<T> = Result<T, PoolError>;

/// Flat status codes for callers that dispatch on an enumeration rather than
/// on [`PoolError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
  Ok,
  InitError,
  DestroyError,
  AllocError,
  PoolExhausted,
  NotFound,
}

impl Status {
  pub fn of<T>(result: &PoolResult<T>) -> Self {
    match result {
      Ok(_) => Self::Ok,
      Err(err) => err.status(),
    }
  }

  pub fn is_ok(self) -> bool {
    self == Self::Ok
  }
}

impl fmt::Display for Status {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let code = match self {
      Self::Ok => "MEMORY_POOL_OK",
      Self::InitError => "MEMORY_POOL_INIT_ERROR",
      Self::DestroyError => "MEMORY_POOL_DESTROY_ERROR",
      Self::AllocError => "MEMORY_POOL_ALLOC_ERROR",
      Self::PoolExhausted => "MEMORY_POOL_EXHAUSTED",
      Self::NotFound => "MEMORY_POOL_NOT_FOUND",
    };
    f.write_str(code)
  }
}
