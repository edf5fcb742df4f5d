pub mod error;
pub mod file_handle;
pub mod file_system;
pub mod page_store;
