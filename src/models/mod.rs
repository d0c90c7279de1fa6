pub mod filters;
pub mod item;

pub use filters::*;
pub use item::*;
