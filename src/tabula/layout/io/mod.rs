pub mod annotation_write;
pub mod sheet_read;
