//! Owned captures of reified views.
//!
//! Cells are rendered to text so that snapshots of different element types
//! compare the same way and read naturally in scenario files.

use anyhow::Result;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use sexp_core::types::{is_na_real, NA_INTEGER};
use sexp_core::{Element, FillReport, Logical, Matrix, NativeRuntime, Vector};

/// Text rendering of one element. Missing values render as `NA`.
pub trait CellDisplay {
    fn display_cell(&self) -> String;
}

impl CellDisplay for Logical {
    fn display_cell(&self) -> String {
        self.to_string()
    }
}

impl CellDisplay for i32 {
    fn display_cell(&self) -> String {
        if *self == NA_INTEGER {
            "NA".to_string()
        } else {
            self.to_string()
        }
    }
}

impl CellDisplay for f64 {
    fn display_cell(&self) -> String {
        if is_na_real(*self) {
            "NA".to_string()
        } else {
            self.to_string()
        }
    }
}

impl CellDisplay for Option<String> {
    fn display_cell(&self) -> String {
        match self {
            Some(s) => s.clone(),
            None => "NA".to_string(),
        }
    }
}

impl CellDisplay for Complex64 {
    fn display_cell(&self) -> String {
        if is_na_real(self.re) || is_na_real(self.im) {
            return "NA".to_string();
        }
        if self.im < 0.0 {
            format!("{}-{}i", self.re, -self.im)
        } else {
            format!("{}+{}i", self.re, self.im)
        }
    }
}

impl CellDisplay for u8 {
    fn display_cell(&self) -> String {
        format!("{:02x}", self)
    }
}

/// A matrix as rows of rendered cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatrixSnapshot {
    pub rows: usize,
    pub cols: usize,

    /// Row-major cells.
    pub cells: Vec<Vec<String>>,

    /// Present when the matrix was built by a fill pass.
    pub fill: Option<FillReport>,
}

impl MatrixSnapshot {
    pub fn capture<T, R>(matrix: &Matrix<'_, T, R>) -> Result<Self>
    where
        T: Element + CellDisplay,
        R: NativeRuntime,
    {
        let cells = matrix
            .to_rows()?
            .iter()
            .map(|row| row.iter().map(CellDisplay::display_cell).collect())
            .collect();
        Ok(Self {
            rows: matrix.row_count(),
            cols: matrix.column_count(),
            cells,
            fill: matrix.fill_report(),
        })
    }
}

/// A vector as rendered elements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorSnapshot {
    pub values: Vec<String>,
}

impl VectorSnapshot {
    pub fn capture<T, R>(vector: &Vector<'_, T, R>) -> Result<Self>
    where
        T: Element + CellDisplay,
        R: NativeRuntime,
    {
        let values = vector
            .to_vec()?
            .iter()
            .map(CellDisplay::display_cell)
            .collect();
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
