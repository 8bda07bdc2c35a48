pub mod memory;
pub mod wikipedia;

pub use memory::{MemoryPage, MemoryProvider};
pub use wikipedia::WikipediaProvider;
