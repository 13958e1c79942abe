//! Vector and list reification.

use crate::helpers::{classify, coerce};
use crate::runtime::{NativeRuntime, SexpType};
use crate::session::Sexp;
use crate::types::{Element, List, Result, Vector};

/// Reify `handle` as a vector of `T`.
///
/// The runtime coerces the value; the view wraps the coerced storage
/// directly, so no elements are copied here.
///
/// # Errors
///
/// * `NullHandle` - `handle` is absent
/// * `CoercionFailed` - the runtime refused the conversion
pub fn as_vector<'s, T: Element, R: NativeRuntime>(
    handle: &Sexp<'s, R>,
) -> Result<Option<Vector<'s, T, R>>> {
    if !classify::is_vector(handle)? {
        log::debug!("{} is not a vector; no {} view", handle.raw(), T::TYPE);
        return Ok(None);
    }
    let coerced = coerce::coerce_to::<T, R>(handle)?;
    Vector::wrap(coerced).map(Some)
}

/// Reify `handle` as a generic list.
///
/// A list is wrapped as is. Any other vector is first coerced to a list by
/// the runtime.
pub fn as_list<'s, R: NativeRuntime>(handle: &Sexp<'s, R>) -> Result<Option<List<'s, R>>> {
    if !classify::is_vector(handle)? {
        log::debug!("{} is not a vector; no list view", handle.raw());
        return Ok(None);
    }
    if classify::is_list(handle)? {
        return List::wrap(handle.clone()).map(Some);
    }
    let coerced = coerce::coerce(handle, SexpType::List)?;
    List::wrap(coerced).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MemoryRuntime, Scalar};
    use crate::session::Session;
    use crate::types::Logical;

    #[test]
    fn test_coerces_to_requested_type() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let raw = session.runtime().integer([0, 1, 5]);
        let v = as_vector::<Logical, _>(&session.handle(raw)).unwrap().unwrap();
        assert_eq!(
            v.to_vec().unwrap(),
            vec![Logical::False, Logical::True, Logical::True]
        );
        assert!(v.handle().is_preserved());
    }

    #[test]
    fn test_non_vector_is_absent() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let sym = session.handle(session.runtime().symbol("x"));
        assert!(as_vector::<f64, _>(&sym).unwrap().is_none());
        assert!(as_list(&sym).unwrap().is_none());
    }

    #[test]
    fn test_null_is_an_error() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        assert!(as_vector::<u8, _>(&session.null())
            .unwrap_err()
            .is_null_handle());
        assert!(as_list(&session.null()).unwrap_err().is_null_handle());
    }

    #[test]
    fn test_list_is_wrapped_without_coercion() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let rt = session.runtime();
        let item = rt.numeric([1.0, 2.0]);
        let raw = rt.list([item]).unwrap();
        let list = as_list(&session.handle(raw)).unwrap().unwrap();
        assert_eq!(list.handle().raw(), raw);
        assert_eq!(rt.coercion_count(), 0);
    }

    #[test]
    fn test_atomic_vector_becomes_list_of_scalars() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let rt = session.runtime();
        let raw = rt.integer([7, 8]);
        let list = as_list(&session.handle(raw)).unwrap().unwrap();
        assert_eq!(list.len(), 2);
        let second = list.get(1).unwrap();
        assert_eq!(rt.length(second.raw()).unwrap(), 1);
        assert_eq!(rt.elt(second.raw(), 0).unwrap(), Scalar::Integer(8));
    }
}
