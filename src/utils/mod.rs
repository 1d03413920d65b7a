pub mod size;

pub use size::{human_size, natural_size};
