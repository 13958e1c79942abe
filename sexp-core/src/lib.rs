//! sexp-core
//!
//! Typed marshaling over tagged native values ("symbolic expressions").
//! Client code holds opaque handles; this crate classifies them, coerces them
//! through the runtime's own coercion primitive, and reifies them as typed
//! vectors and dimension-aware matrices.
//!
//! # Architecture
//!
//! - `runtime`: the native primitive seam ([`NativeRuntime`]) and an in-process
//!   reference runtime ([`MemoryRuntime`])
//! - `types`: element types, views (Vector, Matrix, List), Config, errors
//! - `helpers`: classification, coercion, shape resolution, the fill algorithm
//! - `ops`: the `Is*` predicates and `As*` reifiers exposed to the host
//! - `session`: access check, handles, and scoped preservation

pub mod helpers;
pub mod ops;
pub mod runtime;
pub mod session;
pub mod types;

// Re-export commonly used types at crate root
pub use types::{
    CharacterMatrix,
    CharacterVector,
    ComplexMatrix,
    ComplexVector,
    Config,
    Element,
    ElementType,
    ErrorKind,
    FillStride,
    IntegerMatrix,
    IntegerVector,
    List,
    Logical,
    LogicalMatrix,
    LogicalVector,
    MarshalError,
    Matrix,
    NumericMatrix,
    NumericVector,
    RawMatrix,
    RawVector,
    Result,
    Vector,
};

// Re-export operations at crate root
pub use ops::{as_list, as_matrix, as_vector, is_list, is_matrix, is_vector, SexpExt};

pub use helpers::fill::{fill, FillReport, FlatSource, GridSink};
pub use helpers::shape::{resolve_shape, Shape};
pub use runtime::{MemoryRuntime, NativeRuntime, RawHandle, Scalar, SexpType};
pub use session::{Preserved, Session, Sexp};

/// Version string including the commit hash when it was available at build time.
pub fn version() -> &'static str {
    env!("SEXP_VERSION_STRING")
}
