//! Redistribution of a flat sequence into a 2-D container.
//!
//! The walk is column-outer, row-inner. Under [`FillStride::ColumnCount`]
//! the cell `(r, c)` reads source index `c * cols + r`, which is the usual
//! column-major order only for square destinations or single columns.
//! [`FillStride::RowCount`] reads `c * rows + r`.
//!
//! The walk stops at the first index past the end of the source. Cells not
//! reached keep the container default; that is not an error.

use serde::{Deserialize, Serialize};

use crate::helpers::shape::Shape;
use crate::types::{FillStride, MarshalError, Result};

/// A readable 1-D container.
pub trait FlatSource<T> {
    fn source_len(&self) -> usize;

    /// Element at `index`; `index < source_len()`.
    fn read(&self, index: usize) -> Result<T>;
}

/// A writable 2-D container addressed by `(row, col)`.
pub trait GridSink<T> {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn write(&mut self, row: usize, col: usize, value: T) -> Result<()>;
}

impl<T: Clone> FlatSource<T> for [T] {
    fn source_len(&self) -> usize {
        self.len()
    }

    fn read(&self, index: usize) -> Result<T> {
        self.get(index)
            .cloned()
            .ok_or_else(|| MarshalError::index_out_of_bounds(index, self.len()))
    }
}

impl<T: Clone> FlatSource<T> for Vec<T> {
    fn source_len(&self) -> usize {
        self.len()
    }

    fn read(&self, index: usize) -> Result<T> {
        self.as_slice().read(index)
    }
}

/// Outcome of one fill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FillReport {
    /// Cells written.
    pub written: usize,
    /// `rows * cols` of the destination, saturating at `usize::MAX`.
    pub capacity: usize,
    /// The walk stopped before visiting every cell.
    pub truncated: bool,
}

impl FillReport {
    /// Cells left at the container default.
    pub fn untouched(&self) -> usize {
        self.capacity - self.written
    }
}

fn stride_of(stride: FillStride, rows: usize, cols: usize) -> usize {
    match stride {
        FillStride::ColumnCount => cols,
        FillStride::RowCount => rows,
    }
}

/// Copy `src` into `dest`.
///
/// # Errors
///
/// Only errors raised by `src` reads or `dest` writes are returned; a short
/// source is reported through [`FillReport::truncated`]. A source index that
/// overflows `usize` ends the walk the same way.
pub fn fill<T, D, S>(dest: &mut D, src: &S, stride: FillStride) -> Result<FillReport>
where
    D: GridSink<T> + ?Sized,
    S: FlatSource<T> + ?Sized,
{
    let rows = dest.rows();
    let cols = dest.cols();
    let len = src.source_len();
    let step = stride_of(stride, rows, cols);

    let mut report = FillReport {
        written: 0,
        capacity: Shape::new(rows, cols).capacity().unwrap_or(usize::MAX),
        truncated: false,
    };

    'columns: for c in 0..cols {
        for r in 0..rows {
            let index = match c.checked_mul(step).and_then(|base| base.checked_add(r)) {
                Some(index) if index < len => index,
                _ => {
                    report.truncated = true;
                    break 'columns;
                }
            };
            dest.write(r, c, src.read(index)?)?;
            report.written += 1;
        }
    }

    if report.truncated {
        log::debug!(
            "Fill stopped at {} of {} cells ({}x{}, source length {}, stride {})",
            report.written,
            report.capacity,
            rows,
            cols,
            len,
            stride
        );
    }
    Ok(report)
}
