pub mod course;
pub mod curriculum;

pub use course::*;
pub use curriculum::*;
