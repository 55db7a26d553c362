use std::mem;

use rpool::{MemoryPool, PoolError, PoolResult};
use tracing_subscriber::EnvFilter;

/// One sample from the coffee machine's pour sensor.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
struct TestMetrics {
  pour_mode: i32,
  pour_duration: i32,
  flow: f32,
  heat: f64,
}

impl TestMetrics {
  const SIZE: usize = mem::size_of::<Self>();

  fn encode(
    &self,
    out: &mut [u8],
  ) {
    out[0..4].copy_from_slice(&self.pour_mode.to_ne_bytes());
    out[4..8].copy_from_slice(&self.pour_duration.to_ne_bytes());
    out[8..12].copy_from_slice(&self.flow.to_ne_bytes());
    out[16..24].copy_from_slice(&self.heat.to_ne_bytes());
  }

  fn pour_mode_at(bytes: &[u8]) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[0..4]);
    i32::from_ne_bytes(raw)
  }
}

fn main() -> PoolResult<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")))
    .init();

  // Each block holds a batch of samples instead of one malloc per sample.
  let samples_per_block = 1024;
  let mut pool = MemoryPool::new(samples_per_block * TestMetrics::SIZE, 5)?;

  println!("Blocks after instantiation");
  pool.dump_blocks();

  let first = pool.acquire()?;
  println!("Blocks after 1st acquire");
  pool.dump_blocks();

  let second = pool.acquire()?;
  println!("Blocks after 2nd acquire");
  pool.dump_blocks();

  let metric_one = TestMetrics {
    pour_mode: 200,
    pour_duration: 300,
    flow: 2.3,
    heat: 23.4345,
  };
  let metric_two = TestMetrics {
    pour_mode: 100,
    pour_duration: 268,
    flow: 5.0,
    heat: 72.578,
  };

  {
    let data = pool.data_mut(first)?;
    metric_one.encode(&mut data[..TestMetrics::SIZE]);
    metric_two.encode(&mut data[TestMetrics::SIZE..2 * TestMetrics::SIZE]);
  }

  let data = pool.data(first)?;
  println!("\nTest data [block {}]:", first.index());
  println!("First element pour mode: {}", TestMetrics::pour_mode_at(data));
  println!(
    "Second element pour mode: {}",
    TestMetrics::pour_mode_at(&data[TestMetrics::SIZE..])
  );

  pool.release(first)?;
  println!("Blocks after 1st release");
  pool.dump_blocks();

  match pool.data(first) {
    Err(PoolError::NotAllocated { index }) => println!("Block {index} is back in the pool"),
    other => println!("Unexpected access result: {other:?}"),
  }

  pool.release(second)?;
  pool.destroy()
}
