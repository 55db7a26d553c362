use std::{alloc::Layout, mem, ptr, ptr::NonNull};

use libc::c_void;

use crate::error::{PoolError, PoolResult, Region};

/// Alignment guaranteed by `malloc`/`calloc` on the supported platforms.
const MIN_ALIGN: usize = 2 * mem::size_of::<usize>();

/// Source of the pool's bulk regions.
///
/// The pool calls [`allocate_zeroed`](RawAllocator::allocate_zeroed) exactly
/// twice at initialization and [`deallocate`](RawAllocator::deallocate)
/// exactly twice at teardown. Nothing else in the crate talks to the system
/// allocator.
///
/// # Safety
///
/// A returned pointer must be valid for reads and writes of `layout.size()`
/// bytes, aligned to `layout.align()`, zero-filled, and must stay valid until
/// it is passed back to `deallocate` with the same layout. Clones must be able
/// to deallocate memory handed out by each other.
pub unsafe trait RawAllocator: Clone {
  fn allocate_zeroed(
    &self,
    layout: Layout,
  ) -> Option<NonNull<u8>>;

  /// # Safety
  ///
  /// `ptr` must come from `allocate_zeroed` on this allocator (or a clone)
  /// with the same `layout`, and must not be used afterwards.
  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  );
}

/// The C heap, through `libc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

unsafe impl RawAllocator for SystemAllocator {
  fn allocate_zeroed(
    &self,
    layout: Layout,
  ) -> Option<NonNull<u8>> {
    unsafe {
      if layout.align() <= MIN_ALIGN {
        return NonNull::new(libc::calloc(layout.size(), 1) as *mut u8);
      }

      let mut out: *mut c_void = ptr::null_mut();
      let align = layout.align().max(mem::size_of::<usize>());
      if libc::posix_memalign(&mut out, align, layout.size()) != 0 {
        return None;
      }

      let address = NonNull::new(out as *mut u8)?;
      ptr::write_bytes(address.as_ptr(), 0, layout.size());
      Some(address)
    }
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    _layout: Layout,
  ) {
    unsafe { libc::free(ptr.as_ptr() as *mut c_void) }
  }
}

/// One bulk allocation, returned to its allocator on drop.
///
/// Holding each region in its own owner is what makes a failed
/// initialization roll back: whatever was already obtained is dropped on the
/// error path.
pub(crate) struct RawRegion<A: RawAllocator> {
  base: NonNull<u8>,
  layout: Layout,
  allocator: A,
}

impl<A: RawAllocator> RawRegion<A> {
  pub(crate) fn zeroed(
    layout: Layout,
    allocator: A,
    region: Region,
  ) -> PoolResult<Self> {
    match allocator.allocate_zeroed(layout) {
      Some(base) => Ok(Self {
        base,
        layout,
        allocator,
      }),
      None => {
        tracing::error!(%region, size = layout.size(), "unable to allocate memory for the pool");
        Err(PoolError::AllocationFailed {
          region,
          size: layout.size(),
        })
      }
    }
  }

  pub(crate) fn base(&self) -> NonNull<u8> {
    self.base
  }

  pub(crate) fn len(&self) -> usize {
    self.layout.size()
  }
}

impl<A: RawAllocator> Drop for RawRegion<A> {
  fn drop(&mut self) {
    unsafe { self.allocator.deallocate(self.base, self.layout) }
  }
}
