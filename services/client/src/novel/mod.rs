pub mod writer;

pub use writer::{NovelWriter, GENERATION_PLACEHOLDER, GENERATION_UNAVAILABLE};
