//! Type classification.
//!
//! Pure queries: nothing is allocated and the handle is never mutated.
//! An absent handle is a precondition violation and fails with `NullHandle`.

use crate::runtime::{NativeRuntime, RawHandle, SexpType};
use crate::session::Sexp;
use crate::types::{MarshalError, Result};

/// The raw handle, or `NullHandle` if absent.
pub(crate) fn non_null<R: NativeRuntime>(handle: &Sexp<'_, R>) -> Result<RawHandle> {
    if handle.is_null() {
        Err(MarshalError::null_handle())
    } else {
        Ok(handle.raw())
    }
}

/// True if the runtime classifies the value as vector-like (lists included).
pub fn is_vector<R: NativeRuntime>(handle: &Sexp<'_, R>) -> Result<bool> {
    let raw = non_null(handle)?;
    handle.runtime().is_vector_tag(raw)
}

/// True if vector-like with rank-2 dimension metadata attached.
pub fn is_matrix<R: NativeRuntime>(handle: &Sexp<'_, R>) -> Result<bool> {
    let raw = non_null(handle)?;
    handle.runtime().is_matrix_shaped(raw)
}

/// True if the value is a generic list.
pub fn is_list<R: NativeRuntime>(handle: &Sexp<'_, R>) -> Result<bool> {
    let raw = non_null(handle)?;
    handle.runtime().is_list_tag(raw)
}

/// The declared type tag.
pub fn element_type_tag<R: NativeRuntime>(handle: &Sexp<'_, R>) -> Result<SexpType> {
    let raw = non_null(handle)?;
    handle.runtime().type_of(raw)
}
