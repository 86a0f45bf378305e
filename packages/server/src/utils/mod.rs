pub mod filename;
pub mod multipart;
