//! Matrix reification.

use crate::helpers::fill::fill;
use crate::helpers::shape::{resolve_shape, Shape};
use crate::helpers::{classify, coerce};
use crate::runtime::NativeRuntime;
use crate::session::Sexp;
use crate::types::{Element, Matrix, Result, Vector};

/// Reify `handle` as a matrix of `T`.
///
/// A matrix already of `T`'s type is wrapped directly. Anything else is
/// coerced, and a new matrix is allocated and filled from the coerced values.
/// Matrix sources keep their dimensions; plain vectors become one column.
/// A zero-column source is treated as a single column of its length.
///
/// # Errors
///
/// * `NullHandle` - `handle` is absent
/// * `CoercionFailed` - the runtime refused the conversion
pub fn as_matrix<'s, T: Element, R: NativeRuntime>(
    handle: &Sexp<'s, R>,
) -> Result<Option<Matrix<'s, T, R>>> {
    if !classify::is_vector(handle)? {
        log::debug!("{} is not a vector; no {} matrix", handle.raw(), T::TYPE);
        return Ok(None);
    }

    if classify::is_matrix(handle)? && handle.type_of()? == T::TYPE.sexp_type() {
        log::debug!("{} is already a {} matrix; wrapping", handle.raw(), T::TYPE);
        return Matrix::wrap(handle.clone()).map(Some);
    }

    let mut shape = resolve_shape(handle)?;
    if shape.cols == 0 {
        shape = Shape::column(handle.runtime().length(handle.raw())?);
    }

    let source: Vector<'s, T, R> = Vector::wrap(coerce::coerce_to::<T, R>(handle)?)?;
    let session = handle.session();
    let mut matrix = Matrix::allocate(session, shape)?;
    let report = fill(&mut matrix, &source, session.config().fill.stride)?;
    matrix.set_fill_report(report);
    Ok(Some(matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;
    use crate::session::Session;
    use crate::types::{Config, FillStride, Logical};

    #[test]
    fn test_fast_path_wraps_without_coercion() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let rt = session.runtime();
        let raw = rt.numeric([1.0, 2.0, 3.0, 4.0]);
        rt.set_dim(raw, 2, 2).unwrap();

        let m = as_matrix::<f64, _>(&session.handle(raw)).unwrap().unwrap();
        assert_eq!(m.handle().raw(), raw);
        assert!(m.fill_report().is_none());
        assert_eq!(rt.coercion_count(), 0);
    }

    #[test]
    fn test_type_change_keeps_matrix_shape() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let rt = session.runtime();
        let raw = rt.logical([Logical::True, Logical::False, Logical::Na, Logical::True]);
        rt.set_dim(raw, 2, 2).unwrap();

        let m = as_matrix::<f64, _>(&session.handle(raw)).unwrap().unwrap();
        assert_eq!(m.shape(), Shape::new(2, 2));
        assert_eq!(m.get(0, 0).unwrap(), 1.0);
        assert_eq!(m.get(1, 0).unwrap(), 0.0);
        assert!(crate::types::is_na_real(m.get(0, 1).unwrap()));
        assert!(!m.was_truncated());
    }

    #[test]
    fn test_plain_vector_becomes_single_column() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let raw = session.runtime().integer([3, 1, 2]);
        let m = as_matrix::<i32, _>(&session.handle(raw)).unwrap().unwrap();
        assert_eq!(m.shape(), Shape::column(3));
        assert_eq!(m.column(0).unwrap(), vec![3, 1, 2]);
        assert_ne!(m.handle().raw(), raw);
    }

    #[test]
    fn test_zero_column_source_falls_back_to_column() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let rt = session.runtime();
        let raw = rt.integer(Vec::<i32>::new());
        rt.set_dim(raw, 3, 0).unwrap();

        let m = as_matrix::<f64, _>(&session.handle(raw)).unwrap().unwrap();
        assert_eq!(m.shape(), Shape::new(0, 1));
    }

    #[test]
    fn test_row_count_stride_from_config() {
        let mut config = Config::default();
        config.fill.stride = FillStride::RowCount;
        let session = Session::open(MemoryRuntime::new(), config).unwrap();
        let rt = session.runtime();
        let raw = rt.integer(0..6);
        rt.set_dim(raw, 2, 3).unwrap();

        let m = as_matrix::<f64, _>(&session.handle(raw)).unwrap().unwrap();
        assert!(!m.was_truncated());
        assert_eq!(
            m.to_rows().unwrap(),
            vec![vec![0.0, 2.0, 4.0], vec![1.0, 3.0, 5.0]]
        );
    }
}
