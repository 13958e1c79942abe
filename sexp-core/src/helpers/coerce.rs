//! Coercion through the runtime's own primitive.
//!
//! The runtime may hand back an alias of the source when it already has the
//! target type. The result is registered either way and treated as a fresh,
//! independently scoped handle.

use crate::helpers::classify;
use crate::runtime::{NativeRuntime, SexpType};
use crate::session::Sexp;
use crate::types::{Element, MarshalError, Result};

/// Coerce `handle` to `target`.
///
/// # Errors
///
/// * `NullHandle` - `handle` is absent
/// * `CoercionFailed` - the runtime refused the conversion
pub fn coerce<'s, R: NativeRuntime>(handle: &Sexp<'s, R>, target: SexpType) -> Result<Sexp<'s, R>> {
    let raw = classify::non_null(handle)?;
    let runtime = handle.runtime();
    let from = runtime.type_of(raw)?;

    let coerced = runtime.coerce(raw, target).map_err(|e| {
        log::debug!("Coercion of {} from {} to {} failed: {}", raw, from, target, e);
        if e.is_coercion_failed() || e.is_null_handle() || e.is_invalid_handle() {
            e
        } else {
            MarshalError::coercion_failed(from, target, e.to_string())
        }
    })?;

    if coerced == raw {
        log::debug!("Coercion of {} to {} returned an alias", raw, target);
    } else {
        log::debug!("Coerced {} ({}) to new value {} ({})", raw, from, coerced, target);
    }
    handle.session().adopt(coerced)
}

/// Coerce `handle` to the native type of `T`.
pub fn coerce_to<'s, T: Element, R: NativeRuntime>(handle: &Sexp<'s, R>) -> Result<Sexp<'s, R>> {
    coerce(handle, T::TYPE.sexp_type())
}
