pub mod date;
pub mod media;
pub mod metadata;
pub mod scan;
pub mod transform;
pub mod writer;
