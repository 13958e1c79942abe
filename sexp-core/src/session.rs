//! Sessions, handles, and scoped preservation.
//!
//! A [`Session`] is where the host first acquires access to this layer, so
//! the unmanaged-code demand from [`Config`] is checked there, once. Every
//! [`Sexp`] borrows its session; the borrow is the handle's engine/context
//! reference and keeps views on the runtime's thread.

use std::fmt;
use std::rc::Rc;

use crate::runtime::{NativeRuntime, RawHandle, SexpType};
use crate::types::{Config, MarshalError, Result};

/// An open connection to a native runtime.
pub struct Session<R: NativeRuntime> {
    runtime: R,
    config: Config,
}

impl<R: NativeRuntime> Session<R> {
    /// Open a session, checking the access policy.
    ///
    /// # Errors
    ///
    /// * `PermissionDenied` - `access.unmanaged_code` is disabled
    pub fn open(runtime: R, config: Config) -> Result<Self> {
        if !config.access.unmanaged_code {
            log::warn!("Refusing to open session: unmanaged code access is disabled");
            return Err(MarshalError::permission_denied(
                "unmanaged code access is disabled by configuration",
            ));
        }
        log::info!("Opened marshaling session (fill stride: {})", config.fill.stride);
        Ok(Self { runtime, config })
    }

    /// Open a session with [`Config::default`].
    pub fn with_defaults(runtime: R) -> Result<Self> {
        Self::open(runtime, Config::default())
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wrap a raw handle owned by the host. No registration is made.
    pub fn handle(&self, raw: RawHandle) -> Sexp<'_, R> {
        Sexp {
            session: self,
            raw,
            guard: None,
        }
    }

    /// The absent handle.
    pub fn null(&self) -> Sexp<'_, R> {
        self.handle(RawHandle::NULL)
    }

    /// Register `raw` with the runtime for as long as the guard lives.
    pub fn preserve(&self, raw: RawHandle) -> Result<Preserved<'_, R>> {
        self.runtime.preserve(raw)?;
        Ok(Preserved { session: self, raw })
    }

    /// Wrap a handle this layer derived, keeping it registered while any
    /// clone of the returned handle (or a view over it) is alive.
    pub(crate) fn adopt(&self, raw: RawHandle) -> Result<Sexp<'_, R>> {
        let guard = self.preserve(raw)?;
        Ok(Sexp {
            session: self,
            raw,
            guard: Some(Rc::new(guard)),
        })
    }
}

impl<R: NativeRuntime + fmt::Debug> fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("runtime", &self.runtime)
            .field("config", &self.config)
            .finish()
    }
}

/// Registration of a native value with the runtime; released on drop.
pub struct Preserved<'s, R: NativeRuntime> {
    session: &'s Session<R>,
    raw: RawHandle,
}

impl<R: NativeRuntime> Preserved<'_, R> {
    pub fn raw(&self) -> RawHandle {
        self.raw
    }
}

impl<R: NativeRuntime> Drop for Preserved<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.session.runtime.release(self.raw) {
            log::warn!("Failed to release {}: {}", self.raw, e);
        }
    }
}

impl<R: NativeRuntime> fmt::Debug for Preserved<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Preserved").field(&self.raw).finish()
    }
}

/// A handle to a native value, tied to its session.
///
/// Handles derived by this layer (coercions, allocations) carry a shared
/// [`Preserved`] guard; host handles carry none.
pub struct Sexp<'s, R: NativeRuntime> {
    session: &'s Session<R>,
    raw: RawHandle,
    guard: Option<Rc<Preserved<'s, R>>>,
}

impl<'s, R: NativeRuntime> Sexp<'s, R> {
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    /// The owning session.
    pub fn session(&self) -> &'s Session<R> {
        self.session
    }

    pub fn runtime(&self) -> &'s R {
        &self.session.runtime
    }

    /// True when this handle keeps a preservation registration alive.
    pub fn is_preserved(&self) -> bool {
        self.guard.is_some()
    }

    /// Declared type tag.
    pub fn type_of(&self) -> Result<SexpType> {
        if self.is_null() {
            return Err(MarshalError::null_handle());
        }
        self.runtime().type_of(self.raw)
    }

    /// A handle to a value reachable from this one (a list element).
    ///
    /// The child shares this handle's registration, since it is only
    /// reachable through it.
    pub(crate) fn child(&self, raw: RawHandle) -> Sexp<'s, R> {
        Sexp {
            session: self.session,
            raw,
            guard: self.guard.clone(),
        }
    }
}

impl<R: NativeRuntime> Clone for Sexp<'_, R> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            raw: self.raw,
            guard: self.guard.clone(),
        }
    }
}

impl<R: NativeRuntime> fmt::Debug for Sexp<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sexp")
            .field("raw", &self.raw)
            .field("preserved", &self.is_preserved())
            .finish()
    }
}

impl<R: NativeRuntime> PartialEq for Sexp<'_, R> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.session, other.session) && self.raw == other.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryRuntime;

    #[test]
    fn test_denied_access_refuses_to_open() {
        let mut config = Config::default();
        config.access.unmanaged_code = false;
        let err = Session::open(MemoryRuntime::new(), config).unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_adopted_handles_release_on_last_drop() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let raw = session.runtime().integer([1, 2]);
        {
            let adopted = session.adopt(raw).unwrap();
            let copy = adopted.clone();
            assert!(copy.is_preserved());
            assert_eq!(session.runtime().preserve_count(raw), 1);
            drop(adopted);
            assert_eq!(session.runtime().preserve_count(raw), 1);
        }
        assert_eq!(session.runtime().preserve_count(raw), 0);
    }

    #[test]
    fn test_host_handles_are_not_registered() {
        let session = Session::with_defaults(MemoryRuntime::new()).unwrap();
        let raw = session.runtime().integer([1]);
        let handle = session.handle(raw);
        assert!(!handle.is_preserved());
        assert_eq!(handle.type_of().unwrap(), SexpType::Integer);
        assert!(session.null().type_of().unwrap_err().is_null_handle());
    }
}
