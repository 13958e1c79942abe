//! Shape resolution.
//!
//! A plain vector is a column vector of its own length.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::helpers::classify;
use crate::runtime::NativeRuntime;
use crate::session::Sexp;
use crate::types::Result;

/// Effective `rows x cols` geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// A single column of `len` rows.
    pub const fn column(len: usize) -> Self {
        Self { rows: len, cols: 1 }
    }

    /// Number of cells, `None` on overflow.
    pub fn capacity(self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Native row/column counts of a matrix-shaped handle.
pub(crate) fn matrix_dims<R: NativeRuntime>(handle: &Sexp<'_, R>) -> Result<Shape> {
    let raw = classify::non_null(handle)?;
    let runtime = handle.runtime();
    Ok(Shape::new(runtime.row_count(raw)?, runtime.col_count(raw)?))
}

/// Matrix dimensions if present, otherwise `(length, 1)`.
pub fn resolve_shape<R: NativeRuntime>(handle: &Sexp<'_, R>) -> Result<Shape> {
    let shape = if classify::is_matrix(handle)? {
        matrix_dims(handle)?
    } else {
        Shape::column(handle.runtime().length(handle.raw())?)
    };
    log::trace!("Resolved shape of {} as {}", handle.raw(), shape);
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;
    use crate::session::Session;

    #[test]
    fn test_plain_vector_is_a_column() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let v = session.handle(session.runtime().raw([1, 2, 3, 4, 5]));
        assert_eq!(resolve_shape(&v).unwrap(), Shape::column(5));
    }

    #[test]
    fn test_matrix_uses_dimension_metadata() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let rt = session.runtime();
        let raw = rt.integer(0..12);
        rt.set_dim(raw, 3, 4).unwrap();
        assert_eq!(resolve_shape(&session.handle(raw)).unwrap(), Shape::new(3, 4));
    }

    #[test]
    fn test_null_handle_is_rejected() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        assert!(resolve_shape(&session.null()).unwrap_err().is_null_handle());
    }

    #[test]
    fn test_capacity_and_display() {
        assert_eq!(Shape::new(3, 4).capacity(), Some(12));
        assert_eq!(Shape::new(usize::MAX, 2).capacity(), None);
        assert_eq!(Shape::new(3, 4).to_string(), "3x4");
    }
}
