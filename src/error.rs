use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArrayError {
    /// Index outside the live range `[0, size)`.
    #[error("Index: {index}, Size: {size}")]
    IndexOutOfRange { index: usize, size: usize },
}

pub type Result<T> = core::result::Result<T, ArrayError>;
