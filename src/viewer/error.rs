use thiserror::Error;

/// Errors raised by viewer construction and callbacks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewerError {
    /// The two reflectivity volumes do not share one shape.
    #[error("mismatch of input arrays: absolute {absolute:?} vs normalized {normalized:?}")]
    ShapeMismatch {
        absolute: [usize; 3],
        normalized: [usize; 3],
    },

    /// A slider value or click resolved to an index outside the data.
    #[error("{axis} index {index} is out of range for length {len}")]
    IndexOutOfRange {
        axis: &'static str,
        index: i64,
        len: usize,
    },
}

impl ViewerError {
    /// Check `index` against `len`, returning it as a `usize` when it fits.
    pub(crate) fn check_index(axis: &'static str, index: i64, len: usize) -> Result<usize, Self> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < len)
            .ok_or(ViewerError::IndexOutOfRange { axis, index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_index() {
        assert_eq!(ViewerError::check_index("frame", 2, 3), Ok(2));
        assert_eq!(
            ViewerError::check_index("frame", 3, 3),
            Err(ViewerError::IndexOutOfRange {
                axis: "frame",
                index: 3,
                len: 3
            })
        );
        assert!(ViewerError::check_index("frame", -1, 3).is_err());
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = ViewerError::ShapeMismatch {
            absolute: [10, 10, 8],
            normalized: [10, 10, 9],
        };
        assert_eq!(
            err.to_string(),
            "mismatch of input arrays: absolute [10, 10, 8] vs normalized [10, 10, 9]"
        );
    }
}
