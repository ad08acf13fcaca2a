//! # Bucket — Arena-Backed Storage for Sieving Primes
//!
//! The medium and big cross-off tiers keep their sieving primes in
//! fixed-capacity buckets. Buckets live in one arena per tier and link to
//! each other through integer handles, so a list is just a head index and
//! moving a prime between lists never touches an allocator. Freed buckets
//! go on a free list and are reused.

use crate::error::{Error, Result};

/// Handle meaning "no bucket".
pub const NONE: u32 = u32::MAX;

/// One sieving prime: the compressed increment p/30, the byte index of its
/// next multiple, and its position in the wheel's crossing table.
#[derive(Debug, Clone, Copy)]
pub struct SievingPrime {
    pub prime_div_30: u32,
    pub multiple_index: u32,
    pub wheel_index: u32,
}

pub struct Bucket {
    next: u32,
    records: Vec<SievingPrime>,
}

impl Bucket {
    #[inline]
    pub fn records(&self) -> &[SievingPrime] {
        &self.records
    }

    #[inline]
    pub fn records_mut(&mut self) -> &mut [SievingPrime] {
        &mut self.records
    }

    #[inline]
    pub fn next(&self) -> u32 {
        self.next
    }
}

/// Arena of fixed-capacity buckets addressed by `u32` handles.
pub struct BucketArena {
    buckets: Vec<Bucket>,
    free: u32,
    capacity: usize,
}

impl BucketArena {
    pub fn new(capacity: u32) -> BucketArena {
        BucketArena {
            buckets: Vec::new(),
            free: NONE,
            capacity: capacity as usize,
        }
    }

    fn alloc(&mut self, next: u32) -> Result<u32> {
        if self.free != NONE {
            let idx = self.free;
            let b = &mut self.buckets[idx as usize];
            self.free = b.next;
            b.next = next;
            b.records.clear();
            return Ok(idx);
        }
        self.buckets
            .try_reserve(1)
            .map_err(|_| Error::resource_exhausted("bucket arena growth failed"))?;
        let mut records = Vec::new();
        records
            .try_reserve_exact(self.capacity)
            .map_err(|_| Error::resource_exhausted("bucket allocation failed"))?;
        self.buckets.push(Bucket { next, records });
        Ok(self.buckets.len() as u32 - 1)
    }

    fn release(&mut self, idx: u32) {
        let b = &mut self.buckets[idx as usize];
        b.records.clear();
        b.next = self.free;
        self.free = idx;
    }

    #[inline]
    pub fn bucket(&self, idx: u32) -> &Bucket {
        &self.buckets[idx as usize]
    }

    #[inline]
    pub fn bucket_mut(&mut self, idx: u32) -> &mut Bucket {
        &mut self.buckets[idx as usize]
    }
}

/// A singly linked list of buckets inside an arena: a head handle.
#[derive(Debug, Clone, Copy)]
pub struct BucketList {
    head: u32,
}

impl BucketList {
    pub fn new() -> BucketList {
        BucketList { head: NONE }
    }

    #[inline]
    pub fn head(&self) -> u32 {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head == NONE
    }

    /// Append a record, growing the list by one bucket when the head is full.
    pub fn push(&mut self, arena: &mut BucketArena, record: SievingPrime) -> Result<()> {
        if self.head == NONE || arena.bucket(self.head).records.len() == arena.capacity {
            self.head = arena.alloc(self.head)?;
        }
        arena.bucket_mut(self.head).records.push(record);
        Ok(())
    }

    /// Detach the whole chain, returning its head handle. The caller walks
    /// the chain with [`BucketArena::bucket`] and frees each bucket via the
    /// iterator below.
    pub fn take(&mut self) -> u32 {
        std::mem::replace(&mut self.head, NONE)
    }

    /// Drain the list bucket by bucket, handing each bucket's records to
    /// `consume` and releasing the bucket afterwards.
    pub fn drain(
        &mut self,
        arena: &mut BucketArena,
        mut consume: impl FnMut(&mut BucketArena, &[SievingPrime]) -> Result<()>,
    ) -> Result<()> {
        let mut cur = self.take();
        while cur != NONE {
            let next = arena.bucket(cur).next;
            // Records are Copy; move them out so `consume` may push into
            // other lists of the same arena.
            let records = std::mem::take(&mut arena.bucket_mut(cur).records);
            consume(arena, &records)?;
            // Hand the allocation back so the free bucket keeps its capacity.
            arena.bucket_mut(cur).records = records;
            arena.release(cur);
            cur = next;
        }
        Ok(())
    }

    /// Visit every record mutably, in place.
    pub fn for_each_mut(
        &self,
        arena: &mut BucketArena,
        mut visit: impl FnMut(&mut SievingPrime),
    ) {
        let mut cur = self.head;
        while cur != NONE {
            let b = arena.bucket_mut(cur);
            let next = b.next;
            for rec in b.records_mut() {
                visit(rec);
            }
            cur = next;
        }
    }
}

impl Default for BucketList {
    fn default() -> BucketList {
        BucketList::new()
    }
}
