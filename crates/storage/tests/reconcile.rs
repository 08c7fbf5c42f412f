//! Integration tests: replaying table changes into an external keyed store.

use std::collections::BTreeMap;

use tabula_core::schema::Column;
use tabula_core::{DataType, Value};
use tabula_storage::{Record, Table, TableBuilder, TableChange};

type External = BTreeMap<i64, Record>;

fn id_of(record: &Record) -> i64 {
    record["id"].as_i64().unwrap()
}

/// Applies a change set the way a persistence layer would: delete, update, insert.
fn apply(external: &mut External, change: &TableChange) {
    for row in &change.deleted {
        external.remove(&id_of(row));
    }
    for row in &change.updated {
        external.remove(&id_of(&row.origin));
        external.insert(id_of(&row.current), row.current.clone());
    }
    for row in &change.inserted {
        external.insert(id_of(row), row.clone());
    }
}

fn ids(table: &Table) -> Vec<i64> {
    table
        .get_column_values(0)
        .unwrap()
        .iter()
        .filter_map(Value::as_i64)
        .collect()
}

fn snapshot(table: &Table) -> External {
    table.rows().map(|r| (id_of(&r), r)).collect()
}

fn users() -> Table {
    TableBuilder::new("users")
        .column(Column::int64("id"))
        .unwrap()
        .column(Column::string("name").max_size(16))
        .unwrap()
        .column(Column::new("tags", DataType::StringArray).nullable(true))
        .unwrap()
        .column(Column::bytes("avatar").nullable(true))
        .unwrap()
        .primary_key(&["id"])
        .unwrap()
        .build()
}

fn user(id: i64, name: &str) -> Vec<Value> {
    vec![Value::Int64(id), Value::from(name), Value::Null, Value::Null]
}

#[test]
fn reconcile_round_trips() {
    let mut table = users();
    let mut external = External::new();

    for id in [3, 1, 2] {
        table.add_row(user(id, "user")).unwrap();
    }
    apply(&mut external, &table.get_change());
    table.accept_change();
    assert_eq!(external, snapshot(&table));

    // Update, re-key, delete and insert in one batch
    let row = table.find(&[Value::Int64(1)]).unwrap();
    table
        .set_values(row, vec![
            Value::Int64(1),
            Value::from("renamed"),
            Value::from(vec!["admin"]),
            Value::Bytes(vec![1, 2, 3]),
        ])
        .unwrap();
    let row = table.find(&[Value::Int64(2)]).unwrap();
    table.set_values(row, user(20, "moved")).unwrap();
    let row = table.find(&[Value::Int64(3)]).unwrap();
    table.delete_row(row).unwrap();
    table.add_row(user(4, "new")).unwrap();

    let change = table.get_change();
    assert_eq!(change.row_count, 4);
    apply(&mut external, &change);
    table.accept_change();
    assert_eq!(external, snapshot(&table));
    assert_eq!(ids(&table), vec![1, 4, 20]);
}

#[test]
fn merged_batches_reconcile() {
    let mut left = users();
    let mut external = External::new();
    left.add_row(user(1, "a")).unwrap();
    left.add_row(user(2, "b")).unwrap();
    apply(&mut external, &left.get_change());
    left.accept_change();

    let mut right = left.clone_schema();
    right.add_row(user(10, "c")).unwrap();
    right.add_row(user(11, "d")).unwrap();
    apply(&mut external, &right.get_change());
    right.accept_change();

    left.set_values(0, user(1, "a2")).unwrap();
    right.delete_row(1).unwrap();

    left.merge(&right).unwrap();
    assert_eq!(left.row_count(), 3);
    assert_eq!(left.get_change().row_count, 2);

    apply(&mut external, &left.get_change());
    left.accept_change();
    assert_eq!(external, snapshot(&left));
}

#[test]
fn text_forms_of_a_row() {
    let mut table = users();
    table
        .add_row(vec![
            Value::Int64(7),
            Value::from("x y"),
            Value::from(vec!["a b", "c"]),
            Value::Bytes(vec![0xff]),
        ])
        .unwrap();

    let texts: Vec<String> = (0..table.column_count())
        .map(|c| table.get_string(0, c).unwrap())
        .collect();
    assert_eq!(texts, vec!["7", "x y", "{\"a b\",c}", "\\xff"]);

    for (c, column) in table.columns().iter().enumerate() {
        assert_eq!(column.text_decode(&texts[c]).ok(), table.get_value(0, c));
    }
}

#[test]
fn size_limit_rejects_long_names() {
    let mut table = users();
    let long = "x".repeat(17);
    assert!(table.add_row(user(1, &long)).is_err());
    assert!(table.is_empty());
    assert!(!table.has_change());
}
