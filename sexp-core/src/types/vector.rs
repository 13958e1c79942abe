//! Typed 1-D views over native vectors.
//!
//! A [`Vector`] does not copy: reads and writes go straight to the native
//! storage of the handle it wraps.

use std::fmt;
use std::marker::PhantomData;

use crate::helpers::fill::FlatSource;
use crate::runtime::NativeRuntime;
use crate::session::Sexp;
use crate::types::{Element, MarshalError, Result};

/// A typed, zero-copy vector view.
pub struct Vector<'s, T: Element, R: NativeRuntime> {
    handle: Sexp<'s, R>,
    len: usize,
    _marker: PhantomData<T>,
}

pub type LogicalVector<'s, R> = Vector<'s, crate::types::Logical, R>;
pub type IntegerVector<'s, R> = Vector<'s, i32, R>;
pub type NumericVector<'s, R> = Vector<'s, f64, R>;
pub type CharacterVector<'s, R> = Vector<'s, Option<String>, R>;
pub type ComplexVector<'s, R> = Vector<'s, num_complex::Complex64, R>;
pub type RawVector<'s, R> = Vector<'s, u8, R>;

impl<'s, T: Element, R: NativeRuntime> Vector<'s, T, R> {
    /// Wrap a handle whose tag is already `T`'s native type.
    pub(crate) fn wrap(handle: Sexp<'s, R>) -> Result<Self> {
        let actual = handle.type_of()?;
        if actual != T::TYPE.sexp_type() {
            return Err(MarshalError::type_mismatch(T::TYPE, actual));
        }
        let len = handle.runtime().length(handle.raw())?;
        Ok(Self {
            handle,
            len,
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(MarshalError::index_out_of_bounds(index, self.len));
        }
        let scalar = self.handle.runtime().elt(self.handle.raw(), index)?;
        let tag = scalar.sexp_type();
        T::from_scalar(scalar).ok_or_else(|| MarshalError::type_mismatch(T::TYPE, tag))
    }

    /// Overwrite the element at `index` in native storage.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        if index >= self.len {
            return Err(MarshalError::index_out_of_bounds(index, self.len));
        }
        self.handle
            .runtime()
            .set_elt(self.handle.raw(), index, value.into_scalar())
    }

    /// Copy out every element.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<T>> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// The underlying handle.
    pub fn handle(&self) -> &Sexp<'s, R> {
        &self.handle
    }

    pub fn into_handle(self) -> Sexp<'s, R> {
        self.handle
    }
}

impl<T: Element, R: NativeRuntime> FlatSource<T> for Vector<'_, T, R> {
    fn source_len(&self) -> usize {
        self.len
    }

    fn read(&self, index: usize) -> Result<T> {
        self.get(index)
    }
}

impl<T: Element, R: NativeRuntime> Clone for Vector<'_, T, R> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            len: self.len,
            _marker: PhantomData,
        }
    }
}

impl<T: Element, R: NativeRuntime> fmt::Debug for Vector<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("type", &T::TYPE)
            .field("len", &self.len)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;
    use crate::session::Session;
    use crate::types::Logical;

    #[test]
    fn test_reads_and_writes_native_storage() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let raw = session.runtime().numeric([1.0, 2.0, 3.0]);
        let mut v = NumericVector::wrap(session.handle(raw)).unwrap();

        assert_eq!(v.len(), 3);
        assert_eq!(v.get(1).unwrap(), 2.0);
        v.set(1, 20.0).unwrap();

        let again = NumericVector::wrap(session.handle(raw)).unwrap();
        assert_eq!(again.to_vec().unwrap(), vec![1.0, 20.0, 3.0]);
    }

    #[test]
    fn test_rejects_wrong_tag() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let raw = session.runtime().integer([1]);
        let err = LogicalVector::wrap(session.handle(raw)).unwrap_err();
        assert_eq!(err.error_type(), "type_mismatch");
    }

    #[test]
    fn test_out_of_range_access_fails() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let raw = session.runtime().logical([Logical::True]);
        let mut v = LogicalVector::wrap(session.handle(raw)).unwrap();
        assert_eq!(v.get(1).unwrap_err().error_type(), "index_out_of_bounds");
        assert!(v.set(5, Logical::Na).is_err());
    }

    #[test]
    fn test_character_na_is_none() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let raw = session
            .runtime()
            .character([Some("a"), None, Some("c")]);
        let v = CharacterVector::wrap(session.handle(raw)).unwrap();
        assert_eq!(
            v.to_vec().unwrap(),
            vec![Some("a".to_string()), None, Some("c".to_string())]
        );
    }
}
