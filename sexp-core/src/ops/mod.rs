//! The `Is*` predicates and `As*` reifiers exposed to the host.
//!
//! `As*` operations return `Ok(None)` when the input is not vector-like.
//! That is an ordinary outcome, not a failure. An absent handle is always
//! an error.

mod matrix;
mod vector;

pub use matrix::as_matrix;
pub use vector::{as_list, as_vector};

pub use crate::helpers::classify::{is_list, is_matrix, is_vector};

use crate::runtime::NativeRuntime;
use crate::session::Sexp;
use crate::types::{
    CharacterMatrix, CharacterVector, ComplexMatrix, ComplexVector, IntegerMatrix, IntegerVector,
    List, LogicalMatrix, LogicalVector, NumericMatrix, NumericVector, RawMatrix, RawVector, Result,
};

/// Method-style access to the predicates and reifiers.
pub trait SexpExt<'s, R: NativeRuntime> {
    fn is_vector(&self) -> Result<bool>;
    fn is_matrix(&self) -> Result<bool>;
    fn is_list(&self) -> Result<bool>;

    fn as_list(&self) -> Result<Option<List<'s, R>>>;
    fn as_logical(&self) -> Result<Option<LogicalVector<'s, R>>>;
    fn as_integer(&self) -> Result<Option<IntegerVector<'s, R>>>;
    fn as_numeric(&self) -> Result<Option<NumericVector<'s, R>>>;
    fn as_character(&self) -> Result<Option<CharacterVector<'s, R>>>;
    fn as_complex(&self) -> Result<Option<ComplexVector<'s, R>>>;
    fn as_raw(&self) -> Result<Option<RawVector<'s, R>>>;

    fn as_logical_matrix(&self) -> Result<Option<LogicalMatrix<'s, R>>>;
    fn as_integer_matrix(&self) -> Result<Option<IntegerMatrix<'s, R>>>;
    fn as_numeric_matrix(&self) -> Result<Option<NumericMatrix<'s, R>>>;
    fn as_character_matrix(&self) -> Result<Option<CharacterMatrix<'s, R>>>;
    fn as_complex_matrix(&self) -> Result<Option<ComplexMatrix<'s, R>>>;
    fn as_raw_matrix(&self) -> Result<Option<RawMatrix<'s, R>>>;
}

impl<'s, R: NativeRuntime> SexpExt<'s, R> for Sexp<'s, R> {
    fn is_vector(&self) -> Result<bool> {
        is_vector(self)
    }

    fn is_matrix(&self) -> Result<bool> {
        is_matrix(self)
    }

    fn is_list(&self) -> Result<bool> {
        is_list(self)
    }

    fn as_list(&self) -> Result<Option<List<'s, R>>> {
        as_list(self)
    }

    fn as_logical(&self) -> Result<Option<LogicalVector<'s, R>>> {
        as_vector(self)
    }

    fn as_integer(&self) -> Result<Option<IntegerVector<'s, R>>> {
        as_vector(self)
    }

    fn as_numeric(&self) -> Result<Option<NumericVector<'s, R>>> {
        as_vector(self)
    }

    fn as_character(&self) -> Result<Option<CharacterVector<'s, R>>> {
        as_vector(self)
    }

    fn as_complex(&self) -> Result<Option<ComplexVector<'s, R>>> {
        as_vector(self)
    }

    fn as_raw(&self) -> Result<Option<RawVector<'s, R>>> {
        as_vector(self)
    }

    fn as_logical_matrix(&self) -> Result<Option<LogicalMatrix<'s, R>>> {
        as_matrix(self)
    }

    fn as_integer_matrix(&self) -> Result<Option<IntegerMatrix<'s, R>>> {
        as_matrix(self)
    }

    fn as_numeric_matrix(&self) -> Result<Option<NumericMatrix<'s, R>>> {
        as_matrix(self)
    }

    fn as_character_matrix(&self) -> Result<Option<CharacterMatrix<'s, R>>> {
        as_matrix(self)
    }

    fn as_complex_matrix(&self) -> Result<Option<ComplexMatrix<'s, R>>> {
        as_matrix(self)
    }

    fn as_raw_matrix(&self) -> Result<Option<RawMatrix<'s, R>>> {
        as_matrix(self)
    }
}
