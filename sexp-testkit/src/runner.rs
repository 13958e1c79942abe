//! Runs one operation of the exposed surface against a handle.

use serde::{Deserialize, Serialize};
use sexp_core::{MarshalError, NativeRuntime, Sexp, SexpExt};

use crate::snapshot::{MatrixSnapshot, VectorSnapshot};

/// An operation of the exposed surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    IsVector,
    IsMatrix,
    IsList,
    AsList,
    AsLogical,
    AsInteger,
    AsNumeric,
    AsCharacter,
    AsComplex,
    AsRaw,
    AsLogicalMatrix,
    AsIntegerMatrix,
    AsNumericMatrix,
    AsCharacterMatrix,
    AsComplexMatrix,
    AsRawMatrix,
}

impl Op {
    /// Every operation, in declaration order.
    pub const ALL: [Op; 16] = [
        Op::IsVector,
        Op::IsMatrix,
        Op::IsList,
        Op::AsList,
        Op::AsLogical,
        Op::AsInteger,
        Op::AsNumeric,
        Op::AsCharacter,
        Op::AsComplex,
        Op::AsRaw,
        Op::AsLogicalMatrix,
        Op::AsIntegerMatrix,
        Op::AsNumericMatrix,
        Op::AsCharacterMatrix,
        Op::AsComplexMatrix,
        Op::AsRawMatrix,
    ];

    pub fn is_predicate(self) -> bool {
        matches!(self, Op::IsVector | Op::IsMatrix | Op::IsList)
    }
}

/// Owned result of running an [`Op`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Not convertible.
    Absent,
    Bool { value: bool },
    List { len: usize },
    Vector(VectorSnapshot),
    Matrix(MatrixSnapshot),
    Error { error_type: String, message: String },
}

impl Outcome {
    pub fn from_error(err: &MarshalError) -> Self {
        Outcome::Error {
            error_type: err.error_type().to_string(),
            message: err.to_string(),
        }
    }

    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Absent => "absent",
            Outcome::Bool { .. } => "bool",
            Outcome::List { .. } => "list",
            Outcome::Vector(_) => "vector",
            Outcome::Matrix(_) => "matrix",
            Outcome::Error { .. } => "error",
        }
    }
}

macro_rules! capture {
    ($result:expr, $snapshot:ident, $variant:ident) => {
        match $result {
            Ok(Some(view)) => $snapshot::capture(&view).map(Outcome::$variant),
            Ok(None) => Ok(Outcome::Absent),
            Err(e) => Ok(Outcome::from_error(&e)),
        }
    };
}

/// Run `op` on `handle`.
///
/// Marshaling errors become [`Outcome::Error`]; only failures while
/// capturing a view are returned as `Err`.
pub fn run_op<R: NativeRuntime>(handle: &Sexp<'_, R>, op: Op) -> anyhow::Result<Outcome> {
    log::debug!("Running {:?} on {}", op, handle.raw());
    let predicate = |result: sexp_core::Result<bool>| match result {
        Ok(value) => Outcome::Bool { value },
        Err(e) => Outcome::from_error(&e),
    };

    match op {
        Op::IsVector => Ok(predicate(handle.is_vector())),
        Op::IsMatrix => Ok(predicate(handle.is_matrix())),
        Op::IsList => Ok(predicate(handle.is_list())),
        Op::AsList => Ok(match handle.as_list() {
            Ok(Some(list)) => Outcome::List { len: list.len() },
            Ok(None) => Outcome::Absent,
            Err(e) => Outcome::from_error(&e),
        }),
        Op::AsLogical => capture!(handle.as_logical(), VectorSnapshot, Vector),
        Op::AsInteger => capture!(handle.as_integer(), VectorSnapshot, Vector),
        Op::AsNumeric => capture!(handle.as_numeric(), VectorSnapshot, Vector),
        Op::AsCharacter => capture!(handle.as_character(), VectorSnapshot, Vector),
        Op::AsComplex => capture!(handle.as_complex(), VectorSnapshot, Vector),
        Op::AsRaw => capture!(handle.as_raw(), VectorSnapshot, Vector),
        Op::AsLogicalMatrix => capture!(handle.as_logical_matrix(), MatrixSnapshot, Matrix),
        Op::AsIntegerMatrix => capture!(handle.as_integer_matrix(), MatrixSnapshot, Matrix),
        Op::AsNumericMatrix => capture!(handle.as_numeric_matrix(), MatrixSnapshot, Matrix),
        Op::AsCharacterMatrix => capture!(handle.as_character_matrix(), MatrixSnapshot, Matrix),
        Op::AsComplexMatrix => capture!(handle.as_complex_matrix(), MatrixSnapshot, Matrix),
        Op::AsRawMatrix => capture!(handle.as_raw_matrix(), MatrixSnapshot, Matrix),
    }
}
