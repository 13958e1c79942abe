//! Typed 2-D views over native matrices.
//!
//! Storage is column-major: cell `(r, c)` lives at flat index
//! `c * rows + r`, as the native runtime lays matrices out.

use std::fmt;
use std::marker::PhantomData;

use crate::helpers::fill::{FillReport, GridSink};
use crate::helpers::shape::Shape;
use crate::runtime::NativeRuntime;
use crate::session::{Session, Sexp};
use crate::types::{Element, MarshalError, Result};

/// A typed, zero-copy matrix view.
pub struct Matrix<'s, T: Element, R: NativeRuntime> {
    handle: Sexp<'s, R>,
    rows: usize,
    cols: usize,
    report: Option<FillReport>,
    _marker: PhantomData<T>,
}

pub type LogicalMatrix<'s, R> = Matrix<'s, crate::types::Logical, R>;
pub type IntegerMatrix<'s, R> = Matrix<'s, i32, R>;
pub type NumericMatrix<'s, R> = Matrix<'s, f64, R>;
pub type CharacterMatrix<'s, R> = Matrix<'s, Option<String>, R>;
pub type ComplexMatrix<'s, R> = Matrix<'s, num_complex::Complex64, R>;
pub type RawMatrix<'s, R> = Matrix<'s, u8, R>;

impl<'s, T: Element, R: NativeRuntime> Matrix<'s, T, R> {
    /// Wrap an existing matrix-shaped handle of `T`'s native type.
    pub(crate) fn wrap(handle: Sexp<'s, R>) -> Result<Self> {
        let actual = handle.type_of()?;
        if actual != T::TYPE.sexp_type() {
            return Err(MarshalError::type_mismatch(T::TYPE, actual));
        }
        let runtime = handle.runtime();
        let rows = runtime.row_count(handle.raw())?;
        let cols = runtime.col_count(handle.raw())?;
        Ok(Self {
            handle,
            rows,
            cols,
            report: None,
            _marker: PhantomData,
        })
    }

    /// Allocate a new matrix of `shape`, every cell at the element default.
    pub(crate) fn allocate(session: &'s Session<R>, shape: Shape) -> Result<Self> {
        let raw = session
            .runtime()
            .alloc_matrix(T::TYPE.sexp_type(), shape.rows, shape.cols)?;
        log::debug!("Allocated {} {} matrix {}", shape, T::TYPE, raw);
        let handle = session.adopt(raw)?;
        Ok(Self {
            handle,
            rows: shape.rows,
            cols: shape.cols,
            report: None,
            _marker: PhantomData,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.rows, self.cols)
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows {
            return Err(MarshalError::index_out_of_bounds(row, self.rows));
        }
        if col >= self.cols {
            return Err(MarshalError::index_out_of_bounds(col, self.cols));
        }
        Ok(col * self.rows + row)
    }

    /// Cell `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        let index = self.offset(row, col)?;
        let scalar = self.handle.runtime().elt(self.handle.raw(), index)?;
        let tag = scalar.sexp_type();
        T::from_scalar(scalar).ok_or_else(|| MarshalError::type_mismatch(T::TYPE, tag))
    }

    /// Overwrite cell `(row, col)` in native storage.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let index = self.offset(row, col)?;
        self.handle
            .runtime()
            .set_elt(self.handle.raw(), index, value.into_scalar())
    }

    pub fn column(&self, col: usize) -> Result<Vec<T>> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    pub fn row(&self, row: usize) -> Result<Vec<T>> {
        (0..self.cols).map(|c| self.get(row, c)).collect()
    }

    /// Copy out row by row.
    pub fn to_rows(&self) -> Result<Vec<Vec<T>>> {
        (0..self.rows).map(|r| self.row(r)).collect()
    }

    /// Report of the fill pass that populated this matrix, if it was built
    /// by copying rather than wrapped directly.
    pub fn fill_report(&self) -> Option<FillReport> {
        self.report
    }

    /// True if populating this matrix stopped before the last cell.
    pub fn was_truncated(&self) -> bool {
        self.report.is_some_and(|r| r.truncated)
    }

    pub(crate) fn set_fill_report(&mut self, report: FillReport) {
        self.report = Some(report);
    }

    pub fn handle(&self) -> &Sexp<'s, R> {
        &self.handle
    }

    pub fn into_handle(self) -> Sexp<'s, R> {
        self.handle
    }
}

impl<T: Element, R: NativeRuntime> GridSink<T> for Matrix<'_, T, R> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn write(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.set(row, col, value)
    }
}

impl<T: Element, R: NativeRuntime> Clone for Matrix<'_, T, R> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            rows: self.rows,
            cols: self.cols,
            report: self.report,
            _marker: PhantomData,
        }
    }
}

impl<T: Element, R: NativeRuntime> fmt::Debug for Matrix<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("type", &T::TYPE)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("report", &self.report)
            .field("handle", &self.handle)
            .finish()
    }
}
