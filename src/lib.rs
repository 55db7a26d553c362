//! # rpool - A Fixed-Size Memory Pool Library
//!
//! This crate provides a **fixed-size block pool**: one large upfront
//! allocation carved into equal blocks that are handed out and taken back
//! without ever calling the system allocator again.
//!
//! ## Overview
//!
//! ```text
//!   Pool Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                      DATA REGION (one calloc)                        │
//!   │                                                                      │
//!   │   ┌──────────────┬──────────────┬──────────────┬──────────────┐      │
//!   │   │   block 0    │   block 1    │   block 2    │   block 3    │      │
//!   │   │   in use     │    free      │   in use     │    free      │      │
//!   │   └──────────────┴──────────────┴──────────────┴──────────────┘      │
//!   │   ▲              ▲              ▲              ▲                     │
//!   │   base           base + 1*size  base + 2*size  base + 3*size         │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Acquire flips a flag. Release flips it back and zeroes the block.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rpool
//!   ├── block      - Block metadata record and BlockHandle
//!   ├── config     - PoolConfig, SearchMode
//!   ├── error      - PoolError, Status codes
//!   ├── pool       - MemoryPool: init / acquire / release / destroy
//!   └── region     - RawAllocator seam, libc-backed SystemAllocator
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rpool::{MemoryPool, PoolError};
//!
//! let mut pool = MemoryPool::new(16, 3)?;
//!
//! let block = pool.acquire()?;
//! pool.data_mut(block)?[..4].copy_from_slice(&42u32.to_ne_bytes());
//!
//! pool.release(block)?;
//! pool.destroy()?;
//! # Ok::<(), PoolError>(())
//! ```
//!
//! ## How It Works
//!
//! Initialization performs exactly two system allocations:
//!
//! ```text
//!   Metadata region (block_count records):
//!   ┌────────────────────┬────────────────────┬────────────────────┐
//!   │ data: base + 0     │ data: base + 16    │ data: base + 32    │
//!   │ is_allocated: 0    │ is_allocated: 0    │ is_allocated: 0    │
//!   │ size: 16           │ size: 16           │ size: 16           │
//!   │ next: 1            │ next: 2            │ next: none         │
//!   └────────────────────┴────────────────────┴────────────────────┘
//!
//!   Data region (block_size * block_count bytes, zero-filled):
//!   ┌────────────────────┬────────────────────┬────────────────────┐
//!   │      16 bytes      │      16 bytes      │      16 bytes      │
//!   └────────────────────┴────────────────────┴────────────────────┘
//! ```
//!
//! Blocks are linked by index, not by pointer, and every block's span is
//! computed from the region base. Callers get a [`BlockHandle`], a plain
//! identity token; the bytes are reached through the pool, so no handle can
//! be used once the pool is gone.
//!
//! ## Features
//!
//! - **Two bulk allocations**: no allocator calls after initialization
//! - **Two search modes**: first-fit chain walk or O(1) intrusive free-list
//! - **Rollback**: a failed initialization returns whatever it obtained
//! - **Zero on release**: no stale data reaches the next acquirer
//! - **Status codes**: every error maps onto a flat [`Status`]
//!
//! ## Limitations
//!
//! - **Single-threaded**: the pool is `Send` but not `Sync`; wrap it in a
//!   mutex to share it
//! - **Fixed size**: every block has the same size, chosen up front
//! - **Fixed capacity**: an exhausted pool never grows

pub mod block;
pub mod config;
pub mod error;
pub mod pool;
pub mod region;

pub use block::{Block, BlockHandle};
pub use config::{PoolConfig, SearchMode};
pub use error::{PoolError, PoolResult, Region, Status};
pub use pool::{Chain, MemoryPool, PoolStats};
pub use region::{RawAllocator, SystemAllocator};
