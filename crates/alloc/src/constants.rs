/// Factor by which a full array multiplies its capacity before inserting.
pub const GROWTH_FACTOR: usize = 2;
/// Capacity an empty, unallocated array grows to on its first insertion.
pub const MIN_NON_ZERO_CAPACITY: usize = 1;
