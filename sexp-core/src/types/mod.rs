//! Core type definitions.

mod config;
mod element;
mod error;
mod list;
mod matrix;
mod vector;

pub use config::{AccessPolicy, Config, FillPolicy, FillStride};
pub use element::{is_na_real, na_real, Element, ElementType, Logical, NA_INTEGER};
pub use error::{ErrorKind, MarshalError, Result};
pub use list::List;
pub use matrix::{
    CharacterMatrix, ComplexMatrix, IntegerMatrix, LogicalMatrix, Matrix, NumericMatrix,
    RawMatrix,
};
pub use vector::{
    CharacterVector, ComplexVector, IntegerVector, LogicalVector, NumericVector, RawVector,
    Vector,
};
