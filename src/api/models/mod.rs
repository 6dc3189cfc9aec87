pub mod common;
pub mod authors;
pub mod books;

pub use common::*;
pub use authors::*;
pub use books::*;
