//! End-to-end behavior of the predicates and reifiers against the
//! in-process runtime.

use num_complex::Complex64;
use sexp_core::{
    fill, Config, FillStride, Logical, MemoryRuntime, NativeRuntime, Scalar,
    Session, SexpExt, SexpType, Shape,
};

fn session() -> Session<MemoryRuntime> {
    Session::with_defaults(MemoryRuntime::new()).unwrap()
}

#[test]
fn non_vectors_are_never_convertible() {
    let session = session();
    let rt = session.runtime();
    for raw in [rt.nil(), rt.symbol("x"), rt.closure()] {
        let h = session.handle(raw);
        assert!(!h.is_vector().unwrap());
        assert!(h.as_list().unwrap().is_none());
        assert!(h.as_logical().unwrap().is_none());
        assert!(h.as_integer().unwrap().is_none());
        assert!(h.as_numeric().unwrap().is_none());
        assert!(h.as_character().unwrap().is_none());
        assert!(h.as_complex().unwrap().is_none());
        assert!(h.as_raw().unwrap().is_none());
        assert!(h.as_logical_matrix().unwrap().is_none());
        assert!(h.as_integer_matrix().unwrap().is_none());
        assert!(h.as_numeric_matrix().unwrap().is_none());
        assert!(h.as_character_matrix().unwrap().is_none());
        assert!(h.as_complex_matrix().unwrap().is_none());
        assert!(h.as_raw_matrix().unwrap().is_none());
    }
    assert_eq!(rt.coercion_count(), 0);
}

#[test]
fn null_handle_is_a_precondition_violation() {
    let session = session();
    let null = session.null();
    assert!(null.is_vector().unwrap_err().is_null_handle());
    assert!(null.is_matrix().unwrap_err().is_null_handle());
    assert!(null.is_list().unwrap_err().is_null_handle());
    assert!(null.as_numeric().unwrap_err().is_null_handle());
    assert!(null.as_list().unwrap_err().is_null_handle());
    assert_eq!(
        null.as_integer_matrix().unwrap_err().error_type(),
        "null_handle"
    );
}

#[test]
fn matching_matrix_is_wrapped_in_place() {
    let session = session();
    let rt = session.runtime();
    let raw = rt.integer([1, 2, 3, 4, 5, 6]);
    rt.set_dim(raw, 2, 3).unwrap();

    let mut m = session.handle(raw).as_integer_matrix().unwrap().unwrap();
    assert_eq!(m.row_count(), 2);
    assert_eq!(m.column_count(), 3);
    assert!(m.fill_report().is_none());

    m.set(1, 2, 60).unwrap();
    assert_eq!(rt.elt(raw, 5).unwrap(), Scalar::Integer(60));
    assert_eq!(rt.coercion_count(), 0);
    assert_eq!(rt.preserved_total(), 0);
}

#[test]
fn plain_vector_becomes_a_column() {
    let session = session();
    let raw = session.runtime().numeric([0.5, 1.5, 2.5, 3.5]);
    let m = session.handle(raw).as_numeric_matrix().unwrap().unwrap();

    assert_eq!(m.shape(), Shape::new(4, 1));
    assert_eq!(m.column(0).unwrap(), vec![0.5, 1.5, 2.5, 3.5]);
    assert!(!m.was_truncated());
}

#[test]
fn type_change_keeps_declared_dimensions() {
    let session = session();
    let rt = session.runtime();
    let raw = rt.logical((0..12).map(|i| Logical::from(i % 2 == 0)));
    rt.set_dim(raw, 3, 4).unwrap();

    let m = session.handle(raw).as_numeric_matrix().unwrap().unwrap();
    assert_eq!(m.shape(), Shape::new(3, 4));
    assert_eq!(m.get(0, 0).unwrap(), 1.0);
    assert_eq!(m.get(1, 0).unwrap(), 0.0);
}

#[test]
fn square_conversion_is_column_major() {
    let session = session();
    let rt = session.runtime();
    let values: Vec<i32> = (10..19).collect();
    let raw = rt.integer(values.clone());
    rt.set_dim(raw, 3, 3).unwrap();

    let m = session.handle(raw).as_numeric_matrix().unwrap().unwrap();
    for c in 0..3 {
        for r in 0..3 {
            assert_eq!(m.get(r, c).unwrap(), f64::from(values[c * 3 + r]));
        }
    }
    let report = m.fill_report().unwrap();
    assert_eq!(report.written, 9);
    assert!(!report.truncated);
}

#[test]
fn wide_conversion_uses_column_count_stride() {
    let session = session();
    let rt = session.runtime();
    let raw = rt.integer(0..12);
    rt.set_dim(raw, 3, 4).unwrap();

    let m = session.handle(raw).as_numeric_matrix().unwrap().unwrap();
    // Column c reads from c * 4; column 3 would start at 12.
    assert_eq!(m.column(0).unwrap(), vec![0.0, 1.0, 2.0]);
    assert_eq!(m.column(1).unwrap(), vec![4.0, 5.0, 6.0]);
    assert_eq!(m.column(2).unwrap(), vec![8.0, 9.0, 10.0]);
    assert_eq!(m.column(3).unwrap(), vec![0.0, 0.0, 0.0]);
    assert!(m.was_truncated());
    assert_eq!(m.fill_report().unwrap().written, 9);
}

#[test]
fn wide_conversion_with_row_count_stride() {
    let mut config = Config::default();
    config.fill.stride = FillStride::RowCount;
    let session = Session::open(MemoryRuntime::new(), config).unwrap();
    let rt = session.runtime();
    let raw = rt.integer(0..12);
    rt.set_dim(raw, 3, 4).unwrap();

    let m = session.handle(raw).as_numeric_matrix().unwrap().unwrap();
    assert_eq!(m.column(3).unwrap(), vec![9.0, 10.0, 11.0]);
    assert!(!m.was_truncated());
}

#[test]
fn short_source_leaves_defaults() {
    let session = session();
    let rt = session.runtime();
    let raw = rt.integer(vec![0; 12]);
    rt.set_dim(raw, 3, 4).unwrap();
    let mut m = session.handle(raw).as_integer_matrix().unwrap().unwrap();

    let src = [1, 2, 3, 4, 5];
    let report = fill(&mut m, &src[..], FillStride::ColumnCount).unwrap();

    assert_eq!(report.written, 4);
    assert!(report.truncated);
    assert_eq!(
        m.to_rows().unwrap(),
        vec![vec![1, 5, 0, 0], vec![2, 0, 0, 0], vec![3, 0, 0, 0]]
    );
}

#[test]
fn same_type_coercion_is_idempotent() {
    let session = session();
    let rt = session.runtime();
    let raw = rt.numeric([1.0, 2.0]);
    let h = session.handle(raw);

    let first = h.as_numeric().unwrap().unwrap();
    let second = h.as_numeric().unwrap().unwrap();
    assert_eq!(first.to_vec().unwrap(), second.to_vec().unwrap());
    assert_eq!(first.handle().raw(), raw);
    assert_eq!(rt.coercion_count(), 0);
}

#[test]
fn vector_views_share_coerced_storage() {
    let session = session();
    let rt = session.runtime();
    let raw = rt.strings(&["1.5", "x", "3"]);

    let mut v = session.handle(raw).as_numeric().unwrap().unwrap();
    assert_eq!(v.get(0).unwrap(), 1.5);
    assert!(sexp_core::types::is_na_real(v.get(1).unwrap()));
    assert_eq!(v.get(2).unwrap(), 3.0);

    let coerced = v.handle().raw();
    assert_ne!(coerced, raw);
    v.set(0, 7.0).unwrap();
    assert_eq!(rt.elt(coerced, 0).unwrap(), Scalar::Numeric(7.0));
    assert_eq!(rt.elt(raw, 0).unwrap(), Scalar::Character(Some("1.5".into())));
}

#[test]
fn list_with_long_element_cannot_become_numeric() {
    let session = session();
    let rt = session.runtime();
    let pair = rt.numeric([1.0, 2.0]);
    let list = session.handle(rt.list([pair]).unwrap());

    let err = list.as_numeric().unwrap_err();
    assert!(err.is_coercion_failed());
    assert!(err.to_string().contains("(list) object cannot be coerced to type 'double'"));
    assert!(list.as_numeric_matrix().unwrap_err().is_coercion_failed());
    assert_eq!(rt.preserved_total(), 0);
}

#[test]
fn list_of_scalars_flattens() {
    let session = session();
    let rt = session.runtime();
    let items = [rt.integer([1]), rt.numeric([2.5]), rt.logical([Logical::True])];
    let list = session.handle(rt.list(items).unwrap());

    assert!(list.is_list().unwrap());
    let v = list.as_numeric().unwrap().unwrap();
    assert_eq!(v.to_vec().unwrap(), vec![1.0, 2.5, 1.0]);
}

#[test]
fn complex_and_raw_conversions() {
    let session = session();
    let rt = session.runtime();
    let raw = rt.integer([1, 300, -2]);

    let z = session.handle(raw).as_complex().unwrap().unwrap();
    assert_eq!(z.get(1).unwrap(), Complex64::new(300.0, 0.0));

    let bytes = session.handle(raw).as_raw().unwrap().unwrap();
    assert_eq!(bytes.to_vec().unwrap(), vec![1, 0, 0]);
}

#[test]
fn registrations_end_with_their_views() {
    let session = session();
    let rt = session.runtime();
    let raw = rt.integer([1, 2, 3, 4]);
    {
        let h = session.handle(raw);
        let v = h.as_character().unwrap().unwrap();
        let m = h.as_logical_matrix().unwrap().unwrap();
        assert!(rt.preserved_total() >= 2);
        assert_eq!(rt.preserve_count(v.handle().raw()), 1);
        assert_eq!(rt.preserve_count(m.handle().raw()), 1);
        assert_eq!(rt.type_of(m.handle().raw()).unwrap(), SexpType::Logical);
    }
    assert_eq!(rt.preserved_total(), 0);
}

#[test]
fn config_file_drives_the_session() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("sexp.toml"),
        "[fill]\nstride = \"row-count\"\n",
    )
    .unwrap();

    let config = Config::find(dir.path()).unwrap().unwrap();
    assert_eq!(config.fill.stride, FillStride::RowCount);
    assert!(config.access.unmanaged_code);

    let denied: Config = Config::from_toml_str("[access]\nunmanaged_code = false\n").unwrap();
    let err = Session::open(MemoryRuntime::new(), denied).unwrap_err();
    assert_eq!(err.error_type(), "permission_denied");
}

#[test]
fn version_is_reported() {
    assert!(sexp_core::version().starts_with(env!("CARGO_PKG_VERSION")));
}
