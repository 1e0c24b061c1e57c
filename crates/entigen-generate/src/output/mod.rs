pub mod writer;

pub use writer::{write_artifacts, write_bytes_atomic};
