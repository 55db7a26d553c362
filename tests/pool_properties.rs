//! Property tests for the pool's layout and acquire/release invariants.

use proptest::prelude::*;
use rpool::{BlockHandle, MemoryPool, PoolConfig, PoolError, SearchMode, Status};

fn search_mode() -> impl Strategy<Value = SearchMode> {
  prop_oneof![Just(SearchMode::FirstFit), Just(SearchMode::FreeList)]
}

fn pool(
  block_size: usize,
  block_count: usize,
  search: SearchMode,
) -> MemoryPool {
  MemoryPool::with_config(PoolConfig::new(block_size, block_count).with_search(search)).unwrap()
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn spans_partition_the_data_region(
    block_size in 1usize..256,
    block_count in 1usize..64,
    search in search_mode(),
  ) {
    let pool = pool(block_size, block_count, search);
    let region = pool.data_span();

    let mut spans: Vec<_> = pool.blocks().map(|block| block.span()).collect();
    prop_assert_eq!(block_count, spans.len());

    spans.sort_by_key(|span| span.start);

    prop_assert_eq!(region.start, spans[0].start);
    prop_assert_eq!(region.end, spans[spans.len() - 1].end);

    for pair in spans.windows(2) {
      prop_assert_eq!(pair[0].end, pair[1].start);
    }

    for (index, block) in pool.blocks().enumerate() {
      prop_assert_eq!(region.start + index * block_size, block.data_ptr() as usize);
      prop_assert_eq!(block_size, block.size());
    }
  }
}

// ---------------------------------------------------------------------------
// Acquire / release
// ---------------------------------------------------------------------------

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn allocated_plus_free_is_block_count(
    block_count in 1usize..16,
    ops in proptest::collection::vec(any::<Option<usize>>(), 1..64),
    search in search_mode(),
  ) {
    let mut pool = pool(8, block_count, search);
    let mut held: Vec<BlockHandle> = Vec::new();

    // `None` acquires, `Some(n)` releases the n-th held handle.
    for op in ops {
      match op {
        None => match pool.acquire() {
          Ok(handle) => {
            prop_assert!(!held.contains(&handle));
            held.push(handle);
          }
          Err(err) => {
            prop_assert_eq!(block_count, held.len());
            prop_assert_eq!(Status::PoolExhausted, err.status());
          }
        },
        Some(n) if !held.is_empty() => {
          let handle = held.swap_remove(n % held.len());
          prop_assert!(pool.release(handle).is_ok());
        }
        Some(_) => {}
      }

      let allocated = pool.blocks().filter(|block| block.is_allocated()).count();
      let free = pool.blocks().filter(|block| !block.is_allocated()).count();

      prop_assert_eq!(block_count, allocated + free);
      prop_assert_eq!(held.len(), allocated);
      prop_assert_eq!(allocated, pool.allocated_count());
      prop_assert_eq!(free, pool.free_count());
    }
  }

  #[test]
  fn release_restores_flag_and_zeroes(
    block_size in 1usize..128,
    fill in 1u8..=255,
    search in search_mode(),
  ) {
    let mut pool = pool(block_size, 2, search);
    let handle = pool.acquire().unwrap();

    pool.data_mut(handle).unwrap().fill(fill);
    pool.release(handle).unwrap();

    let block = pool.block(handle).unwrap();
    prop_assert!(!block.is_allocated());

    let again = pool.acquire().unwrap();
    prop_assert_eq!(handle, again);
    prop_assert!(pool.data(again).unwrap().iter().all(|&b| b == 0));
  }

  #[test]
  fn acquire_past_capacity_is_exhaustion(
    block_count in 1usize..32,
    search in search_mode(),
  ) {
    let mut pool = pool(4, block_count, search);

    for _ in 0..block_count {
      prop_assert!(pool.acquire().is_ok());
    }

    prop_assert_eq!(Err(PoolError::Exhausted { capacity: block_count }), pool.acquire());
    prop_assert_eq!(Ok(()), pool.destroy());
  }
}
