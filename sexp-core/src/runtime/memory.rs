//! In-process reference runtime.
//!
//! `MemoryRuntime` keeps tagged values in an arena and implements the
//! primitive set of [`NativeRuntime`] with the native coercion rules. It is
//! what the test suites run against, and a usable runtime for hosts that
//! want typed views without a live native engine.
//!
//! There is no garbage collector: values live as long as the runtime.
//! Preservation is still tracked so callers can check that derived handles
//! are registered while a view is alive.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use num_complex::Complex64;

use super::convert;
use super::{NativeRuntime, RawHandle, Scalar, SexpType, DIM_ATTRIBUTE};
use crate::types::{Logical, MarshalError, Result};

#[derive(Debug, Clone)]
enum Payload {
    Nil,
    Symbol(String),
    Closure,
    Logical(Vec<Logical>),
    Integer(Vec<i32>),
    Numeric(Vec<f64>),
    Complex(Vec<Complex64>),
    Character(Vec<Option<String>>),
    Raw(Vec<u8>),
    List(Vec<RawHandle>),
}

impl Payload {
    fn sexp_type(&self) -> SexpType {
        match self {
            Payload::Nil => SexpType::Nil,
            Payload::Symbol(_) => SexpType::Symbol,
            Payload::Closure => SexpType::Closure,
            Payload::Logical(_) => SexpType::Logical,
            Payload::Integer(_) => SexpType::Integer,
            Payload::Numeric(_) => SexpType::Numeric,
            Payload::Complex(_) => SexpType::Complex,
            Payload::Character(_) => SexpType::Character,
            Payload::Raw(_) => SexpType::Raw,
            Payload::List(_) => SexpType::List,
        }
    }

    fn len(&self) -> usize {
        match self {
            Payload::Nil => 0,
            Payload::Symbol(_) | Payload::Closure => 1,
            Payload::Logical(v) => v.len(),
            Payload::Integer(v) => v.len(),
            Payload::Numeric(v) => v.len(),
            Payload::Complex(v) => v.len(),
            Payload::Character(v) => v.len(),
            Payload::Raw(v) => v.len(),
            Payload::List(v) => v.len(),
        }
    }

    fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Payload::Logical(v) => v.get(index).copied().map(Scalar::Logical),
            Payload::Integer(v) => v.get(index).copied().map(Scalar::Integer),
            Payload::Numeric(v) => v.get(index).copied().map(Scalar::Numeric),
            Payload::Complex(v) => v.get(index).copied().map(Scalar::Complex),
            Payload::Character(v) => v.get(index).cloned().map(Scalar::Character),
            Payload::Raw(v) => v.get(index).copied().map(Scalar::Raw),
            Payload::List(v) => v.get(index).copied().map(Scalar::Handle),
            Payload::Nil | Payload::Symbol(_) | Payload::Closure => None,
        }
    }

    /// Store `value` at `index`. The caller has checked bounds.
    fn set(&mut self, index: usize, value: Scalar) -> Result<()> {
        let expected = self.sexp_type();
        match (self, value) {
            (Payload::Logical(v), Scalar::Logical(x)) => v[index] = x,
            (Payload::Integer(v), Scalar::Integer(x)) => v[index] = x,
            (Payload::Numeric(v), Scalar::Numeric(x)) => v[index] = x,
            (Payload::Complex(v), Scalar::Complex(x)) => v[index] = x,
            (Payload::Character(v), Scalar::Character(x)) => v[index] = x,
            (Payload::Raw(v), Scalar::Raw(x)) => v[index] = x,
            (Payload::List(v), Scalar::Handle(x)) => v[index] = x,
            (_, other) => return Err(MarshalError::type_mismatch(expected, other.sexp_type())),
        }
        Ok(())
    }

    /// A vector of `tag` with every element at its default.
    fn filled(tag: SexpType, len: usize, nil: RawHandle) -> Option<Payload> {
        Some(match tag {
            SexpType::Logical => Payload::Logical(vec![Logical::default(); len]),
            SexpType::Integer => Payload::Integer(vec![0; len]),
            SexpType::Numeric => Payload::Numeric(vec![0.0; len]),
            SexpType::Complex => Payload::Complex(vec![Complex64::default(); len]),
            SexpType::Character => Payload::Character(vec![None; len]),
            SexpType::Raw => Payload::Raw(vec![0; len]),
            SexpType::List => Payload::List(vec![nil; len]),
            _ => return None,
        })
    }

    fn atomic_from(values: &[Scalar], target: SexpType) -> Option<Payload> {
        Some(match target {
            SexpType::Logical => Payload::Logical(values.iter().map(convert::to_logical).collect()),
            SexpType::Integer => Payload::Integer(values.iter().map(convert::to_integer).collect()),
            SexpType::Numeric => Payload::Numeric(values.iter().map(convert::to_numeric).collect()),
            SexpType::Complex => Payload::Complex(values.iter().map(convert::to_complex).collect()),
            SexpType::Character => {
                Payload::Character(values.iter().map(convert::to_character).collect())
            }
            SexpType::Raw => Payload::Raw(values.iter().map(convert::to_raw).collect()),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
struct Cell {
    payload: Payload,
    attributes: BTreeMap<String, RawHandle>,
}

impl Cell {
    fn new(payload: Payload) -> Self {
        Self {
            payload,
            attributes: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Heap {
    cells: Vec<Cell>,
    preserved: HashMap<RawHandle, usize>,
    coercions: usize,
}

impl Heap {
    fn slot(handle: RawHandle) -> Result<usize> {
        if handle.is_null() {
            return Err(MarshalError::null_handle());
        }
        usize::try_from(handle.into_raw() - 1).map_err(|_| MarshalError::invalid_handle(handle))
    }

    fn cell(&self, handle: RawHandle) -> Result<&Cell> {
        let slot = Self::slot(handle)?;
        self.cells
            .get(slot)
            .ok_or_else(|| MarshalError::invalid_handle(handle))
    }

    fn cell_mut(&mut self, handle: RawHandle) -> Result<&mut Cell> {
        let slot = Self::slot(handle)?;
        self.cells
            .get_mut(slot)
            .ok_or_else(|| MarshalError::invalid_handle(handle))
    }

    fn push(&mut self, cell: Cell) -> RawHandle {
        self.cells.push(cell);
        RawHandle::from_raw(self.cells.len() as u64)
    }

    /// `(rows, cols)` when a length-2 integer `dim` attribute is attached.
    fn dims(&self, handle: RawHandle) -> Result<Option<(usize, usize)>> {
        let cell = self.cell(handle)?;
        let Some(&dim) = cell.attributes.get(DIM_ATTRIBUTE) else {
            return Ok(None);
        };
        match &self.cell(dim)?.payload {
            Payload::Integer(v) if v.len() == 2 => {
                let rows = usize::try_from(v[0]).map_err(|_| MarshalError::native("negative dim"))?;
                let cols = usize::try_from(v[1]).map_err(|_| MarshalError::native("negative dim"))?;
                Ok(Some((rows, cols)))
            }
            _ => Ok(None),
        }
    }

    /// Elements of a vector as scalars, ready for conversion.
    ///
    /// Lists contribute their elements only when every element is a
    /// length-1 atomic vector.
    fn flatten(&self, handle: RawHandle, target: SexpType) -> Result<Vec<Scalar>> {
        let payload = &self.cell(handle)?.payload;
        if let Payload::List(items) = payload {
            let mut out = Vec::with_capacity(items.len());
            for &item in items {
                let child = &self.cell(item)?.payload;
                match child.get(0) {
                    Some(value) if child.len() == 1 && child.sexp_type().is_atomic() => {
                        out.push(value)
                    }
                    _ => {
                        return Err(MarshalError::coercion_failed(
                            SexpType::List,
                            target,
                            format!("(list) object cannot be coerced to type '{}'", target),
                        ))
                    }
                }
            }
            return Ok(out);
        }
        Ok((0..payload.len()).filter_map(|i| payload.get(i)).collect())
    }
}

/// Arena-backed native runtime.
///
/// Not `Sync`: the runtime is single-threaded.
#[derive(Debug)]
pub struct MemoryRuntime {
    heap: RefCell<Heap>,
    nil: RawHandle,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRuntime {
    pub fn new() -> Self {
        let mut heap = Heap::default();
        let nil = heap.push(Cell::new(Payload::Nil));
        Self {
            heap: RefCell::new(heap),
            nil,
        }
    }

    fn alloc(&self, payload: Payload) -> RawHandle {
        self.heap.borrow_mut().push(Cell::new(payload))
    }

    /// The nil value. Not vector-like.
    pub fn nil(&self) -> RawHandle {
        self.nil
    }

    pub fn symbol(&self, name: impl Into<String>) -> RawHandle {
        self.alloc(Payload::Symbol(name.into()))
    }

    pub fn closure(&self) -> RawHandle {
        self.alloc(Payload::Closure)
    }

    pub fn logical(&self, values: impl IntoIterator<Item = Logical>) -> RawHandle {
        self.alloc(Payload::Logical(values.into_iter().collect()))
    }

    pub fn integer(&self, values: impl IntoIterator<Item = i32>) -> RawHandle {
        self.alloc(Payload::Integer(values.into_iter().collect()))
    }

    pub fn numeric(&self, values: impl IntoIterator<Item = f64>) -> RawHandle {
        self.alloc(Payload::Numeric(values.into_iter().collect()))
    }

    pub fn complex(&self, values: impl IntoIterator<Item = Complex64>) -> RawHandle {
        self.alloc(Payload::Complex(values.into_iter().collect()))
    }

    pub fn character<S: Into<String>>(&self, values: impl IntoIterator<Item = Option<S>>) -> RawHandle {
        self.alloc(Payload::Character(
            values.into_iter().map(|v| v.map(Into::into)).collect(),
        ))
    }

    /// Character vector without NA elements.
    pub fn strings(&self, values: &[&str]) -> RawHandle {
        self.character(values.iter().map(|s| Some(*s)))
    }

    pub fn raw(&self, values: impl IntoIterator<Item = u8>) -> RawHandle {
        self.alloc(Payload::Raw(values.into_iter().collect()))
    }

    /// Generic list of existing values.
    pub fn list(&self, items: impl IntoIterator<Item = RawHandle>) -> Result<RawHandle> {
        let items: Vec<RawHandle> = items.into_iter().collect();
        {
            let heap = self.heap.borrow();
            for &item in &items {
                heap.cell(item)?;
            }
        }
        Ok(self.alloc(Payload::List(items)))
    }

    /// Attach an attribute. Attribute values are themselves handles.
    pub fn set_attribute(&self, handle: RawHandle, name: &str, value: RawHandle) -> Result<()> {
        let mut heap = self.heap.borrow_mut();
        heap.cell(value)?;
        heap.cell_mut(handle)?
            .attributes
            .insert(name.to_string(), value);
        Ok(())
    }

    pub fn attribute(&self, handle: RawHandle, name: &str) -> Result<Option<RawHandle>> {
        Ok(self.heap.borrow().cell(handle)?.attributes.get(name).copied())
    }

    /// Attach `rows x cols` dimension metadata, making a vector matrix-shaped.
    ///
    /// Fails unless the value is vector-like and `rows * cols` equals its length.
    pub fn set_dim(&self, handle: RawHandle, rows: usize, cols: usize) -> Result<()> {
        let (tag, len) = {
            let heap = self.heap.borrow();
            let cell = heap.cell(handle)?;
            (cell.payload.sexp_type(), cell.payload.len())
        };
        if !tag.is_vector_like() {
            return Err(MarshalError::native(format!(
                "invalid first argument, must be vector (was {})",
                tag
            )));
        }
        if rows.checked_mul(cols) != Some(len) {
            return Err(MarshalError::native(format!(
                "dims [product {}] do not match the length of object [{}]",
                rows.saturating_mul(cols),
                len
            )));
        }
        let as_int = |n: usize| i32::try_from(n).map_err(|_| MarshalError::native("dim too large"));
        let dim = self.integer([as_int(rows)?, as_int(cols)?]);
        self.set_attribute(handle, DIM_ATTRIBUTE, dim)
    }

    /// Number of live preservation registrations for `handle`.
    pub fn preserve_count(&self, handle: RawHandle) -> usize {
        self.heap
            .borrow()
            .preserved
            .get(&handle)
            .copied()
            .unwrap_or(0)
    }

    /// Total preservation registrations across all handles.
    pub fn preserved_total(&self) -> usize {
        self.heap.borrow().preserved.values().sum()
    }

    /// Number of coercions that allocated a new value.
    pub fn coercion_count(&self) -> usize {
        self.heap.borrow().coercions
    }

    /// Number of values in the arena, including nil and attribute values.
    pub fn value_count(&self) -> usize {
        self.heap.borrow().cells.len()
    }
}

impl NativeRuntime for MemoryRuntime {
    fn type_of(&self, handle: RawHandle) -> Result<SexpType> {
        Ok(self.heap.borrow().cell(handle)?.payload.sexp_type())
    }

    fn is_vector_tag(&self, handle: RawHandle) -> Result<bool> {
        Ok(self.type_of(handle)?.is_vector_like())
    }

    fn is_matrix_shaped(&self, handle: RawHandle) -> Result<bool> {
        if !self.is_vector_tag(handle)? {
            return Ok(false);
        }
        Ok(self.heap.borrow().dims(handle)?.is_some())
    }

    fn is_list_tag(&self, handle: RawHandle) -> Result<bool> {
        Ok(self.type_of(handle)? == SexpType::List)
    }

    fn coerce(&self, handle: RawHandle, target: SexpType) -> Result<RawHandle> {
        let mut heap = self.heap.borrow_mut();
        let source = heap.cell(handle)?;
        let from = source.payload.sexp_type();
        if from == target {
            return Ok(handle);
        }
        if !from.is_vector_like() {
            return Err(MarshalError::coercion_failed(
                from,
                target,
                format!("cannot coerce type '{}' to vector of type '{}'", from, target),
            ));
        }
        let attributes = source.attributes.clone();

        let payload = if target == SexpType::List {
            let values = heap.flatten(handle, target)?;
            let items = values
                .into_iter()
                .map(|value| {
                    let single = Payload::atomic_from(&[value.clone()], value.sexp_type())
                        .unwrap_or(Payload::Nil);
                    heap.push(Cell::new(single))
                })
                .collect();
            Payload::List(items)
        } else {
            let values = heap.flatten(handle, target)?;
            Payload::atomic_from(&values, target).ok_or_else(|| {
                MarshalError::coercion_failed(
                    from,
                    target,
                    format!("cannot coerce type '{}' to vector of type '{}'", from, target),
                )
            })?
        };

        heap.coercions += 1;
        let coerced = heap.push(Cell {
            payload,
            attributes,
        });
        log::trace!("coerced {} ({}) to {} ({})", handle, from, coerced, target);
        Ok(coerced)
    }

    fn length(&self, handle: RawHandle) -> Result<usize> {
        Ok(self.heap.borrow().cell(handle)?.payload.len())
    }

    fn row_count(&self, handle: RawHandle) -> Result<usize> {
        let heap = self.heap.borrow();
        let cell = heap.cell(handle)?;
        if !cell.payload.sexp_type().is_vector_like() {
            return Err(MarshalError::native("object is not a matrix"));
        }
        Ok(match heap.dims(handle)? {
            Some((rows, _)) => rows,
            None => cell.payload.len(),
        })
    }

    fn col_count(&self, handle: RawHandle) -> Result<usize> {
        let heap = self.heap.borrow();
        let cell = heap.cell(handle)?;
        if !cell.payload.sexp_type().is_vector_like() {
            return Err(MarshalError::native("object is not a matrix"));
        }
        Ok(match heap.dims(handle)? {
            Some((_, cols)) => cols,
            None => 1,
        })
    }

    fn alloc_matrix(&self, tag: SexpType, rows: usize, cols: usize) -> Result<RawHandle> {
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| MarshalError::native("matrix capacity overflows"))?;
        let payload = Payload::filled(tag, len, self.nil).ok_or_else(|| {
            MarshalError::native(format!("cannot allocate a matrix of type '{}'", tag))
        })?;
        let handle = self.alloc(payload);
        self.set_dim(handle, rows, cols)?;
        Ok(handle)
    }

    fn elt(&self, handle: RawHandle, index: usize) -> Result<Scalar> {
        let heap = self.heap.borrow();
        let payload = &heap.cell(handle)?.payload;
        if !payload.sexp_type().is_vector_like() {
            return Err(MarshalError::type_mismatch("vector", payload.sexp_type()));
        }
        payload
            .get(index)
            .ok_or_else(|| MarshalError::index_out_of_bounds(index, payload.len()))
    }

    fn set_elt(&self, handle: RawHandle, index: usize, value: Scalar) -> Result<()> {
        let mut heap = self.heap.borrow_mut();
        if let Scalar::Handle(child) = value {
            heap.cell(child)?;
        }
        let payload = &mut heap.cell_mut(handle)?.payload;
        if index >= payload.len() {
            return Err(MarshalError::index_out_of_bounds(index, payload.len()));
        }
        payload.set(index, value)
    }

    fn preserve(&self, handle: RawHandle) -> Result<()> {
        let mut heap = self.heap.borrow_mut();
        heap.cell(handle)?;
        *heap.preserved.entry(handle).or_insert(0) += 1;
        Ok(())
    }

    fn release(&self, handle: RawHandle) -> Result<()> {
        let mut heap = self.heap.borrow_mut();
        match heap.preserved.get_mut(&handle) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                heap.preserved.remove(&handle);
            }
            None => {
                return Err(MarshalError::native(format!("{} is not preserved", handle)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{is_na_real, NA_INTEGER};

    #[test]
    fn test_classifies_tags() {
        let rt = MemoryRuntime::new();
        let v = rt.integer([1, 2, 3]);
        let l = rt.list([v]).unwrap();
        let s = rt.symbol("x");

        assert!(rt.is_vector_tag(v).unwrap());
        assert!(rt.is_vector_tag(l).unwrap());
        assert!(rt.is_list_tag(l).unwrap());
        assert!(!rt.is_list_tag(v).unwrap());
        assert!(!rt.is_vector_tag(s).unwrap());
        assert!(!rt.is_vector_tag(rt.nil()).unwrap());
    }

    #[test]
    fn test_matrix_shape_requires_dim_attribute() {
        let rt = MemoryRuntime::new();
        let v = rt.numeric([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(!rt.is_matrix_shaped(v).unwrap());
        assert_eq!(rt.row_count(v).unwrap(), 6);
        assert_eq!(rt.col_count(v).unwrap(), 1);

        rt.set_dim(v, 2, 3).unwrap();
        assert!(rt.is_matrix_shaped(v).unwrap());
        assert_eq!(rt.row_count(v).unwrap(), 2);
        assert_eq!(rt.col_count(v).unwrap(), 3);
    }

    #[test]
    fn test_set_dim_checks_length() {
        let rt = MemoryRuntime::new();
        let v = rt.integer([1, 2, 3, 4, 5]);
        let err = rt.set_dim(v, 2, 3).unwrap_err();
        assert!(err.to_string().contains("do not match"));
        let err = rt.set_dim(rt.symbol("s"), 1, 1).unwrap_err();
        assert_eq!(err.error_type(), "native_error");
    }

    #[test]
    fn test_identity_coercion_aliases() {
        let rt = MemoryRuntime::new();
        let v = rt.integer([1, 2]);
        assert_eq!(rt.coerce(v, SexpType::Integer).unwrap(), v);
        assert_eq!(rt.coercion_count(), 0);
    }

    #[test]
    fn test_coercion_allocates_and_keeps_attributes() {
        let rt = MemoryRuntime::new();
        let v = rt.logical([Logical::True, Logical::False, Logical::Na, Logical::True]);
        rt.set_dim(v, 2, 2).unwrap();

        let c = rt.coerce(v, SexpType::Numeric).unwrap();
        assert_ne!(c, v);
        assert_eq!(rt.coercion_count(), 1);
        assert!(rt.is_matrix_shaped(c).unwrap());
        assert_eq!(rt.elt(c, 0).unwrap(), Scalar::Numeric(1.0));
        assert_eq!(rt.elt(c, 1).unwrap(), Scalar::Numeric(0.0));
        match rt.elt(c, 2).unwrap() {
            Scalar::Numeric(x) => assert!(is_na_real(x)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_list_of_scalars_coerces_elementwise() {
        let rt = MemoryRuntime::new();
        let a = rt.integer([1]);
        let b = rt.strings(&["2.5"]);
        let l = rt.list([a, b]).unwrap();
        let c = rt.coerce(l, SexpType::Numeric).unwrap();
        assert_eq!(rt.elt(c, 0).unwrap(), Scalar::Numeric(1.0));
        assert_eq!(rt.elt(c, 1).unwrap(), Scalar::Numeric(2.5));
    }

    #[test]
    fn test_list_with_long_element_refuses_coercion() {
        let rt = MemoryRuntime::new();
        let a = rt.integer([1, 2]);
        let l = rt.list([a]).unwrap();
        let err = rt.coerce(l, SexpType::Numeric).unwrap_err();
        assert!(err.is_coercion_failed());
        assert!(err
            .to_string()
            .contains("(list) object cannot be coerced to type 'double'"));
    }

    #[test]
    fn test_non_vector_refuses_coercion() {
        let rt = MemoryRuntime::new();
        let err = rt.coerce(rt.closure(), SexpType::Integer).unwrap_err();
        assert!(err.is_coercion_failed());
    }

    #[test]
    fn test_atomic_to_list_wraps_each_element() {
        let rt = MemoryRuntime::new();
        let v = rt.integer([7, NA_INTEGER]);
        let l = rt.coerce(v, SexpType::List).unwrap();
        assert!(rt.is_list_tag(l).unwrap());
        assert_eq!(rt.length(l).unwrap(), 2);
        let Scalar::Handle(first) = rt.elt(l, 0).unwrap() else {
            panic!("expected a handle");
        };
        assert_eq!(rt.type_of(first).unwrap(), SexpType::Integer);
        assert_eq!(rt.elt(first, 0).unwrap(), Scalar::Integer(7));
    }

    #[test]
    fn test_alloc_matrix_fills_defaults() {
        let rt = MemoryRuntime::new();
        let m = rt.alloc_matrix(SexpType::Character, 2, 2).unwrap();
        assert!(rt.is_matrix_shaped(m).unwrap());
        assert_eq!(rt.length(m).unwrap(), 4);
        assert_eq!(rt.elt(m, 3).unwrap(), Scalar::Character(None));
        assert!(rt.alloc_matrix(SexpType::Closure, 1, 1).is_err());
    }

    #[test]
    fn test_element_access_is_checked() {
        let rt = MemoryRuntime::new();
        let v = rt.raw([1, 2]);
        assert_eq!(rt.elt(v, 5).unwrap_err().error_type(), "index_out_of_bounds");
        assert_eq!(
            rt.set_elt(v, 0, Scalar::Integer(3)).unwrap_err().error_type(),
            "type_mismatch"
        );
        rt.set_elt(v, 1, Scalar::Raw(9)).unwrap();
        assert_eq!(rt.elt(v, 1).unwrap(), Scalar::Raw(9));
    }

    #[test]
    fn test_handles_are_validated() {
        let rt = MemoryRuntime::new();
        assert!(rt.type_of(RawHandle::NULL).unwrap_err().is_null_handle());
        assert!(rt
            .type_of(RawHandle::from_raw(10_000))
            .unwrap_err()
            .is_invalid_handle());
    }

    #[test]
    fn test_preservation_is_counted() {
        let rt = MemoryRuntime::new();
        let v = rt.integer([1]);
        rt.preserve(v).unwrap();
        rt.preserve(v).unwrap();
        assert_eq!(rt.preserve_count(v), 2);
        rt.release(v).unwrap();
        rt.release(v).unwrap();
        assert_eq!(rt.preserve_count(v), 0);
        assert!(rt.release(v).is_err());
    }
}
