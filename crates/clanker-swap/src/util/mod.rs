pub mod generation;

pub use generation::{Generation, Generations};
