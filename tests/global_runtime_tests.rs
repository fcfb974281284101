use frame_dispatch::{
    global, register_base_accessor, register_dataframe_accessor, register_series_accessor, Object, Table, Value,
    COLUMNAR_BACKEND,
};

#[test]
fn test_global_dataframe_accessor() {
    register_dataframe_accessor("global_answer", None)
        .unwrap()
        .method(|_, _| Ok(Object::from(42i64)));

    let df = global().dataframe(Table::from_values(vec![Value::Integer(1)])).unwrap();
    assert_eq!(df.call("global_answer", &[]).unwrap(), Object::from(42i64));
}

#[test]
fn test_global_series_accessor_scoped_to_backend() {
    register_series_accessor("global_columnar_flag", Some(COLUMNAR_BACKEND))
        .unwrap()
        .value(true);

    let series = global().series("s", vec![Value::Integer(1)]).unwrap();
    let moved = series.set_backend(COLUMNAR_BACKEND).unwrap();
    assert_eq!(moved.get("global_columnar_flag").unwrap(), Object::from(true));
    assert!(moved.runtime().extensions().len() >= 1);
}

#[test]
fn test_global_base_accessor_rejects_reserved_name() {
    let error = register_base_accessor("move_to", None).unwrap_err();
    assert!(error.is_value_error());
}

#[test]
fn test_global_runtime_is_shared() {
    let first = global();
    let second = global();
    assert!(std::sync::Arc::ptr_eq(first, second));
}
