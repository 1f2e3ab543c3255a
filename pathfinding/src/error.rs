use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    PathNotFound { from: u32, to: u32 },
    SizeOverflow { size: usize },
}

pub type PathResult<T> = Result<T, PathError>;

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::PathNotFound { from, to } => {
                write!(f, "no path from {} to {}", from, to)
            }
            PathError::SizeOverflow { size } => {
                write!(
                    f,
                    "entity mapping would exceed the solver's {} vertices",
                    size
                )
            }
        }
    }
}

impl std::error::Error for PathError {}
