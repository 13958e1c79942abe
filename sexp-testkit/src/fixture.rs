//! Declarative native values.

use anyhow::{bail, Context, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use sexp_core::{Logical, MemoryRuntime, RawHandle};

/// A native value to build before running an operation.
///
/// TOML has no null, so missing values are listed by position in `na`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fixture {
    /// The absent handle.
    Null,
    Nil,
    Symbol {
        name: String,
    },
    Closure,
    Logical {
        values: Vec<bool>,
        #[serde(default)]
        na: Vec<usize>,
        #[serde(default)]
        dim: Option<[usize; 2]>,
    },
    Integer {
        values: Vec<i32>,
        #[serde(default)]
        na: Vec<usize>,
        #[serde(default)]
        dim: Option<[usize; 2]>,
    },
    Numeric {
        values: Vec<f64>,
        #[serde(default)]
        na: Vec<usize>,
        #[serde(default)]
        dim: Option<[usize; 2]>,
    },
    /// Elements as `[re, im]` pairs.
    Complex {
        values: Vec<[f64; 2]>,
        #[serde(default)]
        na: Vec<usize>,
        #[serde(default)]
        dim: Option<[usize; 2]>,
    },
    Character {
        values: Vec<String>,
        #[serde(default)]
        na: Vec<usize>,
        #[serde(default)]
        dim: Option<[usize; 2]>,
    },
    Raw {
        values: Vec<u8>,
        #[serde(default)]
        dim: Option<[usize; 2]>,
    },
    List {
        items: Vec<Fixture>,
    },
}

impl Fixture {
    pub fn integer(values: Vec<i32>) -> Self {
        Fixture::Integer {
            values,
            na: Vec::new(),
            dim: None,
        }
    }

    pub fn integer_matrix(values: Vec<i32>, rows: usize, cols: usize) -> Self {
        Fixture::Integer {
            values,
            na: Vec::new(),
            dim: Some([rows, cols]),
        }
    }

    pub fn numeric(values: Vec<f64>) -> Self {
        Fixture::Numeric {
            values,
            na: Vec::new(),
            dim: None,
        }
    }

    pub fn logical_matrix(values: Vec<bool>, rows: usize, cols: usize) -> Self {
        Fixture::Logical {
            values,
            na: Vec::new(),
            dim: Some([rows, cols]),
        }
    }

    pub fn character(values: &[&str]) -> Self {
        Fixture::Character {
            values: values.iter().map(|s| s.to_string()).collect(),
            na: Vec::new(),
            dim: None,
        }
    }

    pub fn list(items: Vec<Fixture>) -> Self {
        Fixture::List { items }
    }

    /// Allocate the value in `runtime`.
    pub fn build(&self, runtime: &MemoryRuntime) -> Result<RawHandle> {
        let (handle, dim) = match self {
            Fixture::Null => return Ok(RawHandle::NULL),
            Fixture::Nil => return Ok(runtime.nil()),
            Fixture::Symbol { name } => return Ok(runtime.symbol(name.as_str())),
            Fixture::Closure => return Ok(runtime.closure()),
            Fixture::Logical { values, na, dim } => {
                check_na(na, values.len())?;
                let cells = values.iter().enumerate().map(|(i, &v)| {
                    if na.contains(&i) {
                        Logical::Na
                    } else {
                        Logical::from(v)
                    }
                });
                (runtime.logical(cells), dim)
            }
            Fixture::Integer { values, na, dim } => {
                check_na(na, values.len())?;
                let cells = values.iter().enumerate().map(|(i, &v)| {
                    if na.contains(&i) {
                        sexp_core::types::NA_INTEGER
                    } else {
                        v
                    }
                });
                (runtime.integer(cells), dim)
            }
            Fixture::Numeric { values, na, dim } => {
                check_na(na, values.len())?;
                let cells = values.iter().enumerate().map(|(i, &v)| {
                    if na.contains(&i) {
                        sexp_core::types::na_real()
                    } else {
                        v
                    }
                });
                (runtime.numeric(cells), dim)
            }
            Fixture::Complex { values, na, dim } => {
                check_na(na, values.len())?;
                let na_value = sexp_core::types::na_real();
                let cells = values.iter().enumerate().map(|(i, &[re, im])| {
                    if na.contains(&i) {
                        Complex64::new(na_value, na_value)
                    } else {
                        Complex64::new(re, im)
                    }
                });
                (runtime.complex(cells), dim)
            }
            Fixture::Character { values, na, dim } => {
                check_na(na, values.len())?;
                let cells = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (!na.contains(&i)).then(|| v.clone()));
                (runtime.character(cells), dim)
            }
            Fixture::Raw { values, dim } => (runtime.raw(values.iter().copied()), dim),
            Fixture::List { items } => {
                let children = items
                    .iter()
                    .map(|item| item.build(runtime))
                    .collect::<Result<Vec<_>>>()?;
                let handle = runtime
                    .list(children)
                    .context("failed to build list fixture")?;
                return Ok(handle);
            }
        };

        if let Some([rows, cols]) = *dim {
            runtime
                .set_dim(handle, rows, cols)
                .with_context(|| format!("invalid dim {}x{} for fixture", rows, cols))?;
        }
        Ok(handle)
    }
}

fn check_na(na: &[usize], len: usize) -> Result<()> {
    if let Some(&bad) = na.iter().find(|&&i| i >= len) {
        bail!("na position {} out of range for {} values", bad, len);
    }
    Ok(())
}
