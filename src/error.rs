use thiserror::Error;

/// Errors reported by the image and block drivers.
///
/// Flag masks are never rejected, and the fitting code cannot fail; every
/// error here is about buffer sizes disagreeing with the declared geometry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DxtError {
    #[error("{what} buffer has {actual} bytes, expected {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("storage for a {width}×{height} image overflows usize")]
    Overflow { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, DxtError>;

pub(crate) fn check_len(what: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(DxtError::SizeMismatch {
            what,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DxtError::SizeMismatch {
            what: "pixel",
            expected: 64,
            actual: 60,
        };
        assert_eq!(err.to_string(), "pixel buffer has 60 bytes, expected 64");

        let err = DxtError::Overflow {
            width: 3,
            height: 4,
        };
        assert_eq!(err.to_string(), "storage for a 3×4 image overflows usize");
    }

    #[test]
    fn test_check_len() {
        assert!(check_len("block", 8, 8).is_ok());
        assert!(matches!(
            check_len("block", 7, 8),
            Err(DxtError::SizeMismatch { expected: 8, actual: 7, .. })
        ));
    }
}
