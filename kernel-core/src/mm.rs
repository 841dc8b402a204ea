//! Static placement allocator and MPU sub-region mask computation.
//!
//! Pure logic only — no register access. The arch layer
//! (`kernel::mpu::apply_srd_mask`) is the one that writes the computed byte
//! array into hardware.

use crate::config::{
    LARGE_BLOCK_SIZE, LARGE_POOL_BASE, LARGE_POOL_REGIONS, LARGE_POOL_REGION_SIZE, MAX_TASKS,
    NUM_SRAM_REGIONS, SMALL_BLOCK_SIZE, SMALL_POOL_BASE, SMALL_POOL_SIZE, SRAM_USER_SIZE,
};

/// One allocation table entry: `(base, size)` of a live allocation.
/// Parallel arrays, matching `original_source/mm.c`'s `addrTable`/
/// `sizeTable`, indexed by logical allocation slot rather than by task id
/// (a task may later be restarted into the same slot).
pub struct AllocTable {
    base: [u32; MAX_TASKS],
    size: [u32; MAX_TASKS],
    used: [bool; MAX_TASKS],
}

impl AllocTable {
    pub const fn new() -> Self {
        AllocTable {
            base: [0; MAX_TASKS],
            size: [0; MAX_TASKS],
            used: [false; MAX_TASKS],
        }
    }

    fn overlaps(&self, base: u32, size: u32) -> Option<(u32, u32)> {
        let end = base + size;
        for i in 0..MAX_TASKS {
            if !self.used[i] {
                continue;
            }
            let (b, s) = (self.base[i], self.size[i]);
            let e = b + s;
            if base < e && b < end {
                return Some((b, e));
            }
        }
        None
    }

    /// Satisfies a stack allocation request. Returns the base address of
    /// the rounded allocation, or `None` if it can't be satisfied.
    ///
    /// Rounding: requests <= 512 B round to 512 B in the small pool;
    /// otherwise round up to the next multiple of 1024 B in the large pool.
    /// On a first-fit collision, the candidate base advances past the
    /// colliding allocation and the scan restarts from the pool base. If the
    /// small pool can't fit a 512 B request, the request is promoted to
    /// 1024 B and retried in the large pool — ported from
    /// `original_source/mm.c::mallocFromHeap`.
    pub fn allocate(&mut self, requested: u32) -> Option<u32> {
        if requested == 0 || requested > SRAM_USER_SIZE {
            return None;
        }

        if requested <= SMALL_BLOCK_SIZE {
            if let Some(base) = self.try_place(SMALL_POOL_BASE, SMALL_POOL_SIZE, SMALL_BLOCK_SIZE)
            {
                return self.commit(base, SMALL_BLOCK_SIZE);
            }
            // Small pool exhausted: promote to a 1024 B large-pool block.
            let large_size = LARGE_BLOCK_SIZE;
            let large_total = LARGE_POOL_REGIONS * LARGE_POOL_REGION_SIZE;
            let base = self.try_place(LARGE_POOL_BASE, large_total, large_size)?;
            return self.commit(base, large_size);
        }

        let rounded = ((requested + LARGE_BLOCK_SIZE - 1) / LARGE_BLOCK_SIZE) * LARGE_BLOCK_SIZE;
        let large_total = LARGE_POOL_REGIONS * LARGE_POOL_REGION_SIZE;
        let base = self.try_place(LARGE_POOL_BASE, large_total, rounded)?;
        self.commit(base, rounded)
    }

    fn try_place(&self, pool_base: u32, pool_size: u32, block: u32) -> Option<u32> {
        let pool_end = pool_base + pool_size;
        let mut candidate = pool_base;
        loop {
            if candidate + block > pool_end {
                return None;
            }
            match self.overlaps(candidate, block) {
                None => return Some(candidate),
                Some((_, collision_end)) => candidate = collision_end,
            }
        }
    }

    fn commit(&mut self, base: u32, size: u32) -> Option<u32> {
        let slot = self.used.iter().position(|u| !*u)?;
        self.base[slot] = base;
        self.size[slot] = size;
        self.used[slot] = true;
        Some(base)
    }
}

impl Default for AllocTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Given the top-of-region address and size of a just-allocated stack (full
/// descending convention: `top = base + size - 1`), compute the
/// sub-region-disable mask that grants exactly that range unprivileged
/// access.
///
/// Walks the range in sub-region-sized steps and sets the corresponding bit
/// in `srd[region - 2]`. Crossing `0x20001E00` inside the small pool shifts
/// the step size to 1024 B because the range spilled into the large pool —
/// ported from `original_source/mm.c::generateSramSrdMasks`.
pub fn generate_srd_mask(top_of_stack: u32, size_in_bytes: u32) -> [u8; NUM_SRAM_REGIONS] {
    let mut srd = [0u8; NUM_SRAM_REGIONS];
    let base = top_of_stack - (size_in_bytes - 1);

    let small_end = SMALL_POOL_BASE + SMALL_POOL_SIZE; // 0x2000_1FFF + 1
    let mut scale: u32 = if base >= LARGE_POOL_BASE {
        LARGE_BLOCK_SIZE
    } else {
        SMALL_BLOCK_SIZE
    };

    let mut ptr = if base < SMALL_POOL_BASE { SMALL_POOL_BASE } else { base };
    let end = base + size_in_bytes;

    while ptr < end {
        if ptr >= SMALL_POOL_BASE && ptr < small_end {
            let shift = (ptr - SMALL_POOL_BASE) / scale;
            srd[0] |= 1 << shift;
            if ptr >= small_end - 512 {
                // 0x20001E00: last 512 B sub-region of the small pool.
                scale = LARGE_BLOCK_SIZE;
            }
        } else if ptr >= LARGE_POOL_BASE
            && ptr < LARGE_POOL_BASE + LARGE_POOL_REGIONS * LARGE_POOL_REGION_SIZE
        {
            let region = (ptr - LARGE_POOL_BASE) / LARGE_POOL_REGION_SIZE; // 0..=2
            let region_base = LARGE_POOL_BASE + region * LARGE_POOL_REGION_SIZE;
            let shift = (ptr - region_base) / scale;
            srd[1 + region as usize] |= 1 << shift;
        }
        ptr += scale / 4;
    }

    srd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_allocation_fails() {
        let mut t = AllocTable::new();
        assert_eq!(t.allocate(0), None);
    }

    #[test]
    fn oversized_allocation_fails() {
        let mut t = AllocTable::new();
        assert_eq!(t.allocate(SRAM_USER_SIZE + 1), None);
    }

    #[test]
    fn small_allocation_rounds_up_to_512() {
        let mut t = AllocTable::new();
        let base = t.allocate(10).unwrap();
        assert_eq!(base, SMALL_POOL_BASE);
    }

    #[test]
    fn large_allocation_rounds_up_to_1024_multiple() {
        let mut t = AllocTable::new();
        let base = t.allocate(1500).unwrap();
        assert_eq!(base, LARGE_POOL_BASE);
    }

    #[test]
    fn allocations_do_not_overlap() {
        let mut t = AllocTable::new();
        let a = t.allocate(512).unwrap();
        let b = t.allocate(512).unwrap();
        assert_ne!(a, b);
        assert!(a + 512 <= b || b + 512 <= a);
    }

    #[test]
    fn small_pool_exhaustion_promotes_to_large_block() {
        let mut t = AllocTable::new();
        let slots = SMALL_POOL_SIZE / SMALL_BLOCK_SIZE;
        for _ in 0..slots {
            assert!(t.allocate(1).is_some());
        }
        // Small pool is full; the next 512 B-or-less request must be
        // promoted into the large pool instead of failing.
        let promoted = t.allocate(1).unwrap();
        assert!(promoted >= LARGE_POOL_BASE);
    }

    #[test]
    fn srd_mask_covers_exactly_the_allocated_sub_regions() {
        let size = 512;
        let top = SMALL_POOL_BASE + size - 1;
        let srd = generate_srd_mask(top, size);
        assert_eq!(srd[0], 0b0000_0001);
        assert_eq!(srd[1], 0);
        assert_eq!(srd[2], 0);
        assert_eq!(srd[3], 0);
    }

    #[test]
    fn srd_mask_for_large_pool_region_one() {
        let size = 1024;
        let top = LARGE_POOL_BASE + size - 1;
        let srd = generate_srd_mask(top, size);
        assert_eq!(srd[1], 0b0000_0001);
        assert_eq!(srd[0], 0);
    }

    #[test]
    fn two_tasks_never_have_overlapping_srd_bitmaps() {
        let size = 512;
        let top_a = SMALL_POOL_BASE + size - 1;
        let top_b = SMALL_POOL_BASE + 2 * size - 1;
        let a = generate_srd_mask(top_a, size);
        let b = generate_srd_mask(top_b, size);
        for i in 0..NUM_SRAM_REGIONS {
            assert_eq!(a[i] & b[i], 0);
        }
    }
}
