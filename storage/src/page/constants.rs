/// Size of every page in a page file. Changing it invalidates existing files.
pub const PAGE_SIZE: usize = 4096;

pub const PAGE_SIZE_U64: u64 = PAGE_SIZE as u64;
