pub mod in_memory;
pub mod push;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
