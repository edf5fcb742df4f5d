pub mod constants;
pub mod page_file;
