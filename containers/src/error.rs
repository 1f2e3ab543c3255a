use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    KeyOutOfRange { key: usize, max_key: usize },
    CapacityExceeded { count: usize },
    ItemNotFound { z_index: usize },
}

pub type ContainerResult<T> = Result<T, ContainerError>;

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::KeyOutOfRange { key, max_key } => {
                write!(
                    f,
                    "key {} is outside the configured key range 0..{}",
                    key, max_key
                )
            }
            ContainerError::CapacityExceeded { count } => {
                write!(
                    f,
                    "dense storage is full ({} live entries, u32 slot indices)",
                    count
                )
            }
            ContainerError::ItemNotFound { z_index } => {
                write!(f, "item not present in bucket {}", z_index)
            }
        }
    }
}

impl std::error::Error for ContainerError {}
