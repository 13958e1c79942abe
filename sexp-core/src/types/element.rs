//! Element types and the tag <-> Rust type mapping.
//!
//! Each coercion target tag has exactly one Rust element type. The mapping is
//! carried by the [`Element`] trait so a single generic reifier serves every
//! tag.

use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::runtime::{Scalar, SexpType};

/// Integer NA, the smallest `i32`.
pub const NA_INTEGER: i32 = i32::MIN;

/// Low word of the NaN payload that marks a numeric NA.
const NA_REAL_PAYLOAD: u64 = 1954;

/// The numeric NA value: a NaN whose low word is 1954.
#[inline]
pub fn na_real() -> f64 {
    f64::from_bits(0x7FF0_0000_0000_0000 | NA_REAL_PAYLOAD)
}

/// True for the numeric NA (and not for an ordinary NaN).
#[inline]
pub fn is_na_real(x: f64) -> bool {
    x.is_nan() && (x.to_bits() & 0xFFFF_FFFF) == NA_REAL_PAYLOAD
}

/// Three-valued logical element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logical {
    #[default]
    False,
    True,
    Na,
}

impl Logical {
    /// `Some(bool)` unless NA.
    pub fn to_option(self) -> Option<bool> {
        match self {
            Logical::False => Some(false),
            Logical::True => Some(true),
            Logical::Na => None,
        }
    }

    pub fn is_na(self) -> bool {
        self == Logical::Na
    }
}

impl From<bool> for Logical {
    fn from(value: bool) -> Self {
        if value {
            Logical::True
        } else {
            Logical::False
        }
    }
}

impl From<Option<bool>> for Logical {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Logical::Na, Logical::from)
    }
}

impl fmt::Display for Logical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logical::False => write!(f, "FALSE"),
            Logical::True => write!(f, "TRUE"),
            Logical::Na => write!(f, "NA"),
        }
    }
}

/// The closed set of coercion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Logical,
    Integer,
    Numeric,
    Character,
    Complex,
    Raw,
}

impl ElementType {
    pub const ALL: [ElementType; 6] = [
        ElementType::Logical,
        ElementType::Integer,
        ElementType::Numeric,
        ElementType::Character,
        ElementType::Complex,
        ElementType::Raw,
    ];

    /// The native tag a vector of this element type carries.
    pub const fn sexp_type(self) -> SexpType {
        match self {
            ElementType::Logical => SexpType::Logical,
            ElementType::Integer => SexpType::Integer,
            ElementType::Numeric => SexpType::Numeric,
            ElementType::Character => SexpType::Character,
            ElementType::Complex => SexpType::Complex,
            ElementType::Raw => SexpType::Raw,
        }
    }

    /// The element type for an atomic native tag, `None` for everything else.
    pub const fn from_sexp_type(tag: SexpType) -> Option<ElementType> {
        match tag {
            SexpType::Logical => Some(ElementType::Logical),
            SexpType::Integer => Some(ElementType::Integer),
            SexpType::Numeric => Some(ElementType::Numeric),
            SexpType::Character => Some(ElementType::Character),
            SexpType::Complex => Some(ElementType::Complex),
            SexpType::Raw => Some(ElementType::Raw),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sexp_type())
    }
}

/// A Rust type that can live in a typed view.
///
/// `Default` is the value freshly allocated matrix cells hold before (or
/// instead of) being filled.
pub trait Element: Clone + Default + fmt::Debug + 'static {
    const TYPE: ElementType;

    /// Extract from a native scalar of the matching tag.
    fn from_scalar(value: Scalar) -> Option<Self>;

    fn into_scalar(self) -> Scalar;

    fn is_na(&self) -> bool;
}

impl Element for Logical {
    const TYPE: ElementType = ElementType::Logical;

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Logical(v) => Some(v),
            _ => None,
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Logical(self)
    }

    fn is_na(&self) -> bool {
        Logical::is_na(*self)
    }
}

impl Element for i32 {
    const TYPE: ElementType = ElementType::Integer;

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Integer(v) => Some(v),
            _ => None,
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Integer(self)
    }

    fn is_na(&self) -> bool {
        *self == NA_INTEGER
    }
}

impl Element for f64 {
    const TYPE: ElementType = ElementType::Numeric;

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Numeric(v) => Some(v),
            _ => None,
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Numeric(self)
    }

    fn is_na(&self) -> bool {
        is_na_real(*self)
    }
}

impl Element for Option<String> {
    const TYPE: ElementType = ElementType::Character;

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Character(v) => Some(v),
            _ => None,
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Character(self)
    }

    fn is_na(&self) -> bool {
        self.is_none()
    }
}

impl Element for Complex64 {
    const TYPE: ElementType = ElementType::Complex;

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Complex(v) => Some(v),
            _ => None,
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Complex(self)
    }

    fn is_na(&self) -> bool {
        is_na_real(self.re) || is_na_real(self.im)
    }
}

impl Element for u8 {
    const TYPE: ElementType = ElementType::Raw;

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Raw(v) => Some(v),
            _ => None,
        }
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Raw(self)
    }

    // Raw has no NA.
    fn is_na(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_na_real_is_distinguished_from_plain_nan() {
        assert!(is_na_real(na_real()));
        assert!(!is_na_real(f64::NAN));
        assert!(!is_na_real(1.0));
        assert!(na_real().is_nan());
    }

    #[test]
    fn test_element_types_map_to_atomic_tags() {
        for ty in ElementType::ALL {
            assert_eq!(ElementType::from_sexp_type(ty.sexp_type()), Some(ty));
            assert!(ty.sexp_type().is_vector_like());
        }
        assert_eq!(ElementType::from_sexp_type(SexpType::List), None);
    }

    #[test]
    fn test_defaults_are_the_unset_cell_values() {
        assert_eq!(Logical::default(), Logical::False);
        assert_eq!(i32::default(), 0);
        assert_eq!(<Option<String>>::default(), None);
        assert_eq!(Complex64::default(), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_from_scalar_rejects_other_tags() {
        assert_eq!(i32::from_scalar(Scalar::Integer(4)), Some(4));
        assert_eq!(i32::from_scalar(Scalar::Numeric(4.0)), None);
        assert_eq!(Logical::from_scalar(Scalar::Raw(1)), None);
    }

    #[test]
    fn test_logical_display_and_option() {
        assert_eq!(Logical::True.to_string(), "TRUE");
        assert_eq!(Logical::Na.to_option(), None);
        assert_eq!(Logical::from(Some(false)), Logical::False);
        assert_eq!(Logical::from(None), Logical::Na);
    }
}
