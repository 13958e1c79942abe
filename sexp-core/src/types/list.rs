//! Generic list view.

use std::fmt;

use crate::runtime::{NativeRuntime, Scalar, SexpType};
use crate::session::Sexp;
use crate::types::{MarshalError, Result};

/// A zero-copy view over a generic list. Elements are handles.
pub struct List<'s, R: NativeRuntime> {
    handle: Sexp<'s, R>,
    len: usize,
}

impl<'s, R: NativeRuntime> List<'s, R> {
    pub(crate) fn wrap(handle: Sexp<'s, R>) -> Result<Self> {
        let actual = handle.type_of()?;
        if actual != SexpType::List {
            return Err(MarshalError::type_mismatch(SexpType::List, actual));
        }
        let len = handle.runtime().length(handle.raw())?;
        Ok(Self { handle, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element `index`, kept alive by this list's registration.
    pub fn get(&self, index: usize) -> Result<Sexp<'s, R>> {
        if index >= self.len {
            return Err(MarshalError::index_out_of_bounds(index, self.len));
        }
        match self.handle.runtime().elt(self.handle.raw(), index)? {
            Scalar::Handle(raw) => Ok(self.handle.child(raw)),
            other => Err(MarshalError::type_mismatch(SexpType::List, other.sexp_type())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Sexp<'s, R>>> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    pub fn handle(&self) -> &Sexp<'s, R> {
        &self.handle
    }
}

impl<R: NativeRuntime> Clone for List<'_, R> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            len: self.len,
        }
    }
}

impl<R: NativeRuntime> fmt::Debug for List<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("len", &self.len)
            .field("handle", &self.handle)
            .finish()
    }
}
