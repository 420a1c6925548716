mod dynamic_array;
mod error;
mod sorting;

pub use dynamic_array::{DynamicArray, DEFAULT_CAPACITY};
pub use error::{ArrayError, Result};
