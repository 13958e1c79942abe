//! The native runtime seam.
//!
//! Everything this crate knows about native values goes through
//! [`NativeRuntime`]: a fixed set of tag/shape queries, the runtime's own
//! coercion primitive, element access for views, and scoped preservation.
//! Handles are opaque [`RawHandle`] tokens and are never dereferenced here.
//!
//! The native runtime is single-threaded and not reentrant. Implementations
//! are expected to be `!Sync`, and every view borrows its session, so nothing
//! built on this seam can cross threads.

mod convert;
pub mod memory;

use std::fmt;

use num_complex::Complex64;

use crate::types::{Logical, Result};

pub use memory::MemoryRuntime;

/// Name of the attribute holding `(rows, columns)` dimension metadata.
pub const DIM_ATTRIBUTE: &str = "dim";

/// Opaque token for a native value.
///
/// `RawHandle::NULL` stands in for an absent native pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle(u64);

impl RawHandle {
    pub const NULL: RawHandle = RawHandle(0);

    #[inline]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn into_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<sexp 0x{:08x}>", self.0)
    }
}

/// Native type tag of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SexpType {
    Nil,
    Symbol,
    Pairlist,
    Closure,
    Environment,
    Language,
    Logical,
    Integer,
    Numeric,
    Complex,
    Character,
    Raw,
    List,
    Expression,
    ExternalPtr,
}

impl SexpType {
    /// The runtime's numeric code for this tag.
    pub const fn code(self) -> u8 {
        match self {
            SexpType::Nil => 0,
            SexpType::Symbol => 1,
            SexpType::Pairlist => 2,
            SexpType::Closure => 3,
            SexpType::Environment => 4,
            SexpType::Language => 6,
            SexpType::Logical => 10,
            SexpType::Integer => 13,
            SexpType::Numeric => 14,
            SexpType::Complex => 15,
            SexpType::Character => 16,
            SexpType::Expression => 20,
            SexpType::List => 19,
            SexpType::ExternalPtr => 22,
            SexpType::Raw => 24,
        }
    }

    pub const fn from_code(code: u8) -> Option<SexpType> {
        Some(match code {
            0 => SexpType::Nil,
            1 => SexpType::Symbol,
            2 => SexpType::Pairlist,
            3 => SexpType::Closure,
            4 => SexpType::Environment,
            6 => SexpType::Language,
            10 => SexpType::Logical,
            13 => SexpType::Integer,
            14 => SexpType::Numeric,
            15 => SexpType::Complex,
            16 => SexpType::Character,
            19 => SexpType::List,
            20 => SexpType::Expression,
            22 => SexpType::ExternalPtr,
            24 => SexpType::Raw,
            _ => return None,
        })
    }

    /// Atomic vectors plus generic lists and expression vectors.
    pub const fn is_vector_like(self) -> bool {
        matches!(
            self,
            SexpType::Logical
                | SexpType::Integer
                | SexpType::Numeric
                | SexpType::Complex
                | SexpType::Character
                | SexpType::Raw
                | SexpType::List
                | SexpType::Expression
        )
    }

    pub const fn is_atomic(self) -> bool {
        matches!(
            self,
            SexpType::Logical
                | SexpType::Integer
                | SexpType::Numeric
                | SexpType::Complex
                | SexpType::Character
                | SexpType::Raw
        )
    }

    /// The name the runtime uses in its own messages.
    pub const fn name(self) -> &'static str {
        match self {
            SexpType::Nil => "NULL",
            SexpType::Symbol => "symbol",
            SexpType::Pairlist => "pairlist",
            SexpType::Closure => "closure",
            SexpType::Environment => "environment",
            SexpType::Language => "language",
            SexpType::Logical => "logical",
            SexpType::Integer => "integer",
            SexpType::Numeric => "double",
            SexpType::Complex => "complex",
            SexpType::Character => "character",
            SexpType::Raw => "raw",
            SexpType::List => "list",
            SexpType::Expression => "expression",
            SexpType::ExternalPtr => "externalptr",
        }
    }
}

impl fmt::Display for SexpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One native element, as read from or written to a vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Logical(Logical),
    Integer(i32),
    Numeric(f64),
    Complex(Complex64),
    Character(Option<String>),
    Raw(u8),
    /// Element of a generic list.
    Handle(RawHandle),
}

impl Scalar {
    /// The vector tag this scalar belongs to.
    pub const fn sexp_type(&self) -> SexpType {
        match self {
            Scalar::Logical(_) => SexpType::Logical,
            Scalar::Integer(_) => SexpType::Integer,
            Scalar::Numeric(_) => SexpType::Numeric,
            Scalar::Complex(_) => SexpType::Complex,
            Scalar::Character(_) => SexpType::Character,
            Scalar::Raw(_) => SexpType::Raw,
            Scalar::Handle(_) => SexpType::List,
        }
    }
}

/// Primitive operations a native runtime exposes to this layer.
///
/// All calls are synchronous. Only `coerce` and `alloc_matrix` allocate.
pub trait NativeRuntime {
    /// Declared type tag of the value.
    fn type_of(&self, handle: RawHandle) -> Result<SexpType>;

    /// True if the tag is vector-like (including generic lists).
    fn is_vector_tag(&self, handle: RawHandle) -> Result<bool>;

    /// True if vector-like and rank-2 dimension metadata is attached.
    fn is_matrix_shaped(&self, handle: RawHandle) -> Result<bool>;

    /// True if the tag is the generic-list tag.
    fn is_list_tag(&self, handle: RawHandle) -> Result<bool>;

    /// Convert to `target`, allocating a new value or returning an alias of
    /// `handle` when it already has that type. Fails for unsupported pairs.
    fn coerce(&self, handle: RawHandle, target: SexpType) -> Result<RawHandle>;

    /// Declared element count.
    fn length(&self, handle: RawHandle) -> Result<usize>;

    /// Row count; only meaningful when matrix-shaped.
    fn row_count(&self, handle: RawHandle) -> Result<usize>;

    /// Column count; only meaningful when matrix-shaped.
    fn col_count(&self, handle: RawHandle) -> Result<usize>;

    /// Allocate a `rows x cols` matrix of `tag`, every cell at the element
    /// default, with dimension metadata attached.
    fn alloc_matrix(&self, tag: SexpType, rows: usize, cols: usize) -> Result<RawHandle>;

    /// Read element `index` (storage order).
    fn elt(&self, handle: RawHandle, index: usize) -> Result<Scalar>;

    /// Write element `index` (storage order).
    fn set_elt(&self, handle: RawHandle, index: usize, value: Scalar) -> Result<()>;

    /// Register `handle` as reachable from the host.
    fn preserve(&self, handle: RawHandle) -> Result<()>;

    /// Drop one registration made by `preserve`.
    fn release(&self, handle: RawHandle) -> Result<()>;
}
