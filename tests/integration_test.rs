use std::cell::RefCell;
use std::rc::Rc;

use tablekit::{
    columns, row, Columns, DdlContext, Format, Gateway, KeyArg, Row, SqlValue, SqliteGateway,
    Table, TableDefinition,
};

const PREFIX: &str = "wp_";

fn model_schema(ddl: &DdlContext, table: &str, primary_key: &str) -> String {
    format!(
        "CREATE TABLE {} (
            user_id BIGINT UNSIGNED NOT NULL,
            post_id BIGINT UNSIGNED NOT NULL,
            type_id INT UNSIGNED    NOT NULL,
            {},
            {},
            PRIMARY KEY  ({})
        ) {};",
        table,
        ddl.timestamp_field("created_at", false),
        ddl.timestamp_field("updated_at", true),
        primary_key,
        ddl.charset_collate()
    )
}

fn model_columns() -> Columns {
    columns! {
        "user_id" => Format::Int,
        "post_id" => Format::Int,
        "type_id" => Format::Int,
        "created_at" => Format::Text,
        "updated_at" => Format::Text,
    }
}

struct TestModel {
    drop_on_deactivation: bool,
    backticks: bool,
}

impl TestModel {
    fn new() -> Self {
        TestModel {
            drop_on_deactivation: true,
            backticks: false,
        }
    }
}

impl TableDefinition for TestModel {
    fn table_name(&self) -> &str {
        "model_table"
    }
    fn schema(&self, ddl: &DdlContext) -> String {
        let table = match self.backticks {
            true => ddl.dialect().quote_identifier(ddl.table_name()),
            false => String::from(ddl.table_name()),
        };
        model_schema(ddl, &table, "user_id")
    }
    fn columns(&self) -> Columns {
        model_columns()
    }
    fn column_defaults(&self) -> Row {
        row! { "type_id" => 1 }
    }
    fn primary_key(&self) -> &[&str] {
        &["user_id"]
    }
    fn allow_drop(&self) -> bool {
        self.drop_on_deactivation
    }
}

struct CompositeKeyModel;

impl TableDefinition for CompositeKeyModel {
    fn table_name(&self) -> &str {
        "model_composite_key_table"
    }
    fn schema(&self, ddl: &DdlContext) -> String {
        model_schema(ddl, ddl.table_name(), "user_id, post_id")
    }
    fn columns(&self) -> Columns {
        model_columns()
    }
    fn column_defaults(&self) -> Row {
        row! { "type_id" => 1 }
    }
    fn primary_key(&self) -> &[&str] {
        &["user_id", "post_id"]
    }
    fn allow_drop(&self) -> bool {
        true
    }
}

/// a table keyed by an integer whose `code` column holds number-like text.
struct Codes;

impl TableDefinition for Codes {
    fn table_name(&self) -> &str {
        "codes"
    }
    fn schema(&self, ddl: &DdlContext) -> String {
        format!(
            "CREATE TABLE {} (id INTEGER NOT NULL, code TEXT NOT NULL, score INTEGER NOT NULL, PRIMARY KEY (id))",
            ddl.table_name()
        )
    }
    fn columns(&self) -> Columns {
        columns! { "id" => Format::Int, "code" => Format::Text, "score" => Format::Int }
    }
    fn column_defaults(&self) -> Row {
        row! {}
    }
    fn primary_key(&self) -> &[&str] {
        &["id"]
    }
}

fn gateway() -> SqliteGateway {
    SqliteGateway::open_in_memory(PREFIX).expect("in-memory database should open")
}

fn model(g: &SqliteGateway) -> Table<'_, TestModel> {
    let t = Table::new(g, g, TestModel::new());
    assert!(t.create_table().unwrap());
    t
}

fn composite_model(g: &SqliteGateway) -> Table<'_, CompositeKeyModel> {
    let t = Table::new(g, g, CompositeKeyModel);
    assert!(t.create_table().unwrap());
    t
}

#[test]
fn test_table_names() {
    let g = gateway();
    let m = model(&g);
    assert_eq!(m.table_name(), "model_table");
    assert_eq!(m.full_table_name(), "wp_model_table");
    g.set_prefix("other_");
    assert_eq!(m.full_table_name(), "other_model_table");
}

#[test]
fn test_table_exists() {
    let g = gateway();
    let m = Table::new(&g, &g, TestModel::new());
    assert!(!m.table_exists().unwrap());
    m.create_table().unwrap();
    assert!(m.table_exists().unwrap());
    assert_eq!(
        g.query_scalar("SELECT name FROM sqlite_master WHERE name = 'wp_model_table'")
            .unwrap(),
        Some(SqlValue::from("wp_model_table"))
    );
}

#[test]
fn test_create_table_is_idempotent() {
    let g = gateway();
    let m = model(&g);
    assert!(!m.create_table().unwrap());
    assert!(m.table_exists().unwrap());
}

#[test]
fn test_table_creation_and_drop() {
    let g = gateway();
    let m = model(&g);
    m.drop_table(false).unwrap();
    assert!(!m.table_exists().unwrap());
}

#[test]
fn test_table_creation_and_drop_when_schema_has_backticks() {
    let g = gateway();
    let m = Table::new(
        &g,
        &g,
        TestModel {
            drop_on_deactivation: true,
            backticks: true,
        },
    );
    assert!(m.schema().starts_with("CREATE TABLE `wp_model_table`"));
    assert!(m.create_table().unwrap());
    m.drop_table(false).unwrap();
    assert!(!m.table_exists().unwrap());
}

#[test]
fn test_drop_on_deactivation_property() {
    let g = gateway();
    let guarded = Table::new(
        &g,
        &g,
        TestModel {
            drop_on_deactivation: false,
            backticks: false,
        },
    )
    .with_reporter(tablekit::report::ignore_error);
    assert!(!guarded.definition().allow_drop());
    assert!(guarded.create_table().unwrap());
    assert!(matches!(
        guarded.drop_table(false),
        Err(tablekit::Error::DropNotAllowed(_))
    ));
    assert!(guarded.table_exists().unwrap());

    let m = Table::new(&g, &g, TestModel::new());
    m.drop_table(false).unwrap();
    assert!(!guarded.table_exists().unwrap());
}

#[test]
fn test_table_drop_can_be_forced() {
    let g = gateway();
    let m = Table::new(
        &g,
        &g,
        TestModel {
            drop_on_deactivation: false,
            backticks: false,
        },
    )
    .with_reporter(tablekit::report::ignore_error);
    assert!(m.create_table().unwrap());
    assert!(m.drop_table(false).is_err());
    m.drop_table(true).unwrap();
    assert!(!m.table_exists().unwrap());
}

#[test]
fn test_insert() -> anyhow::Result<()> {
    let g = gateway();
    let m = model(&g);
    m.insert(&row! { "post_id" => 1, "user_id" => 2, "type_id" => 3 })?;
    assert_eq!(m.count(), 1);
    Ok(())
}

#[test]
fn test_insertion_of_duplicate_data_fails() {
    let g = gateway();
    let m = model(&g).with_reporter(tablekit::report::ignore_error);
    let data = row! { "post_id" => 1, "user_id" => 2, "type_id" => 3 };
    m.insert(&data).unwrap();
    assert_eq!(m.count(), 1);
    assert!(matches!(m.insert(&data), Err(tablekit::Error::Gateway(_))));
    assert_eq!(m.count(), 1);
}

#[test]
fn test_inserted_row_is_found_normalized() -> anyhow::Result<()> {
    let g = gateway();
    let m = model(&g);
    m.insert(&row! { "post_id" => 7, "user_id" => 8, "not_a_column" => "x" })?;
    let found = m.find(8)?.expect("row should be found");
    for (column, value) in m.normalize_row(&row! { "post_id" => 7, "user_id" => 8 }) {
        assert_eq!(found[&column], value);
    }
    assert!(!found.contains_key("not_a_column"));
    assert!(matches!(found["created_at"], SqlValue::Text(_)));
    Ok(())
}

#[test]
fn test_update() {
    let g = gateway();
    let m = model(&g);
    m.insert(&row! { "post_id" => 2, "user_id" => 3, "type_id" => 4 })
        .unwrap();
    assert!(m
        .update(&row! { "type_id" => 9 }, &row! { "post_id" => 2, "user_id" => 3 })
        .unwrap());
    assert_eq!(m.find(3).unwrap().unwrap()["type_id"], SqlValue::Int(9));
}

#[test]
fn test_update_returns_false_when_no_row_exists() {
    let g = gateway();
    let m = model(&g);
    assert!(!m
        .update(&row! { "type_id" => 9 }, &row! { "post_id" => 2, "user_id" => 3 })
        .unwrap());
}

#[test]
fn test_count() {
    let g = gateway();
    let m = model(&g);
    let mut data = row! { "post_id" => 2, "user_id" => 3, "type_id" => 4 };
    assert_eq!(m.count(), 0);
    m.insert(&data).unwrap();
    assert_eq!(m.count(), 1);
    data.insert(String::from("user_id"), SqlValue::from(4));
    m.insert(&data).unwrap();
    assert_eq!(m.count(), 2);
}

#[test]
fn test_count_of_missing_table_is_zero_and_reported() {
    let g = gateway();
    let reported = Rc::new(RefCell::new(vec![]));
    let sink = reported.clone();
    let m = Table::new(&g, &g, TestModel::new())
        .with_reporter(move |table, e| sink.borrow_mut().push(format!("{}: {}", table, e)));
    assert_eq!(m.count(), 0);
    assert_eq!(reported.borrow().len(), 1);
    assert!(reported.borrow()[0].starts_with("wp_model_table: "));
}

#[test]
fn test_insert_or_update() {
    let g = gateway();
    let m = model(&g);
    let mut data = row! { "post_id" => 3, "user_id" => 4, "type_id" => 5 };
    m.insert_or_update(&data).unwrap();
    data.insert(String::from("type_id"), SqlValue::from(6));
    m.insert_or_update(&data).unwrap();
    assert_eq!(m.count(), 1);
    assert_eq!(m.find(4).unwrap().unwrap()["type_id"], SqlValue::Int(6));
}

#[test]
fn test_insert_rows() {
    let g = gateway();
    let m = model(&g).with_reporter(tablekit::report::ignore_error);
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 2, "post_id" => 1 },
    ];
    m.insert_rows(&rows).unwrap();
    assert_eq!(m.count(), 2);

    let c = composite_model(&g);
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 2 },
        row! { "user_id" => 1, "post_id" => 3 },
        row! { "user_id" => 2, "post_id" => 1 },
        row! { "user_id" => 2, "post_id" => 2 },
        row! { "user_id" => 2, "post_id" => 3 },
    ];
    c.insert_rows(&rows).unwrap();
    assert_eq!(c.count(), 6);

    let out_of_order = vec![
        row! { "user_id" => 3, "post_id" => 1 },
        row! { "post_id" => 2, "user_id" => 4 },
    ];
    assert!(matches!(
        m.insert_rows(&out_of_order),
        Err(tablekit::Error::InvalidRows(_))
    ));
    let missing_key = vec![
        row! { "post_id" => 1 },
        row! { "post_id" => 2, "user_id" => 5 },
    ];
    assert!(m.insert_rows(&missing_key).is_err());
    assert!(m.insert_rows(&[]).is_err());
    assert_eq!(m.count(), 2);
}

#[test]
fn test_insert_rows_with_duplicate_composite_keys_stores_nothing() {
    let g = gateway();
    let c = composite_model(&g).with_reporter(tablekit::report::ignore_error);
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 2 },
    ];
    assert!(matches!(
        c.insert_rows(&rows),
        Err(tablekit::Error::InvalidRows(
            tablekit::validate::Error::DuplicatePrimaryKey { .. }
        ))
    ));
    assert_eq!(c.count(), 0);
}

#[test]
fn test_validate_rows() {
    let g = gateway();
    let m = Table::new(&g, &g, TestModel::new()).with_reporter(tablekit::report::ignore_error);
    let c = Table::new(&g, &g, CompositeKeyModel).with_reporter(tablekit::report::ignore_error);

    assert!(m
        .validate_rows(&[
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 2, "post_id" => 1 },
        ])
        .is_ok());
    assert!(c
        .validate_rows(&[
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 1, "post_id" => 2 },
            row! { "user_id" => 2, "post_id" => 1 },
        ])
        .is_ok());

    let invalid_single = vec![
        // by count
        vec![
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 2, "post_id" => 2, "type_id" => 1 },
        ],
        // by order
        vec![
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "post_id" => 1, "user_id" => 2 },
        ],
        // by missing key
        vec![
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "type_id" => 9, "post_id" => 1 },
        ],
        // by duplicated key
        vec![
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 1, "post_id" => 2 },
        ],
    ];
    for rows in invalid_single {
        assert!(m.validate_rows(&rows).is_err(), "{:?} should be invalid", rows);
    }

    let invalid_composite = vec![
        vec![
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 1, "post_id" => 2, "type_id" => 1 },
            row! { "user_id" => 2, "post_id" => 1 },
        ],
        vec![
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "post_id" => 2, "user_id" => 1 },
            row! { "user_id" => 2, "post_id" => 1 },
        ],
        vec![
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 1, "post_id" => 2 },
            row! { "type_id" => 2, "post_id" => 1 },
        ],
        vec![
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 1, "post_id" => 2 },
        ],
    ];
    for rows in invalid_composite {
        assert!(c.validate_rows(&rows).is_err(), "{:?} should be invalid", rows);
    }
}

#[test]
fn test_insert_or_update_rows_overwrites_existing_records() {
    let g = gateway();
    let m = model(&g);
    m.insert_rows(&[
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 2, "post_id" => 1 },
    ])
    .unwrap();
    assert_eq!(m.count(), 2);

    m.insert_or_update_rows(&[
        row! { "user_id" => 2, "post_id" => 2 },
        row! { "user_id" => 3, "post_id" => 1 },
    ])
    .unwrap();
    assert_eq!(m.count(), 3);
    let saved = m.find(2).unwrap().unwrap();
    assert_eq!(saved["post_id"].to_i64(), 2);
}

#[test]
fn test_row_helpers() {
    let g = gateway();
    let m = Table::new(&g, &g, TestModel::new());

    let normalised = row! { "type_id" => 1, "user_id" => 1, "post_id" => 1 };
    assert_eq!(m.normalize_row(&normalised), normalised);
    assert_eq!(
        m.normalize_row(&row! { "post_id" => 1, "user_id" => 1 }),
        row! { "type_id" => 1, "post_id" => 1, "user_id" => 1 }
    );
    let once = m.normalize_row(&row! { "user_id" => 1, "junk" => 2 });
    assert_eq!(m.normalize_row(&once), once);

    let rows = m.normalize_rows(&[
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 2, "type_id" => 7 },
    ]);
    assert_eq!(rows[0]["type_id"], SqlValue::Int(1));
    assert_eq!(rows[1]["type_id"], SqlValue::Int(7));

    assert!(m
        .set_missing_defaults(&row! { "post_id" => 1, "user_id" => 2 })
        .contains_key("type_id"));
    let trimmed =
        m.remove_extraneous_fields(&row! { "post_id" => 1, "user_id" => 2, "some_extraneous_field" => "value" });
    assert_eq!(trimmed.len(), 2);
    assert!(!trimmed.contains_key("some_extraneous_field"));

    assert_eq!(m.column_format("user_id"), Some(Format::Int));
    assert_eq!(m.column_format("not_a_model_column"), None);
    assert_eq!(
        m.ordered_formats(&row! { "user_id" => 1, "created_at" => "now", "x" => 1.5 }),
        vec![Format::Int, Format::Text, Format::Float]
    );
}

#[test]
fn test_build_where_clause() {
    let g = gateway();
    let m = Table::new(&g, &g, TestModel::new()).with_reporter(tablekit::report::ignore_error);
    assert_eq!(
        m.build_where_clause(&row! { "arg1" => 1 }).unwrap(),
        "WHERE `arg1` = 1"
    );
    let expected_float = g.prepare("%f", &[SqlValue::from(0.1234)]).unwrap();
    assert_eq!(
        m.build_where_clause(&row! { "arg1" => 1, "arg2" => "string", "arg3" => 0.1234 })
            .unwrap(),
        format!("WHERE `arg1` = 1 AND `arg2` = 'string' AND `arg3` = {}", expected_float)
    );
    assert_eq!(
        m.build_where_clause(&row! { "user_id" => "5" }).unwrap(),
        "WHERE `user_id` = 5"
    );
    assert!(m.build_where_clause(&row! {}).is_err());
}

#[test]
fn test_validate_inbound_primary_key() {
    let g = gateway();
    let m = Table::new(&g, &g, TestModel::new());
    assert!(m.validate_inbound_primary_key(&KeyArg::from(9)));
    assert!(m.validate_inbound_primary_key(&KeyArg::from("string")));

    let c = Table::new(&g, &g, CompositeKeyModel);
    assert!(c.validate_inbound_primary_key(&KeyArg::from([1, 2])));
    assert!(c.validate_inbound_primary_key(&KeyArg::from(row! { "user_id" => 1, "post_id" => 2 })));
    assert!(!c.validate_inbound_primary_key(&KeyArg::from(1)));
    assert!(!c.validate_inbound_primary_key(&KeyArg::from([1])));
    assert!(!c.validate_inbound_primary_key(&KeyArg::from(
        row! { "wrong_key" => 1, "post_id" => 2 }
    )));
}

#[test]
fn test_find_works_with_single_key() {
    let g = gateway();
    let m = model(&g);
    m.insert(&row! { "user_id" => 4, "post_id" => 3, "type_id" => 5 })
        .unwrap();
    assert!(m.find(4).unwrap().is_some());
    assert!(m.find(5).unwrap().is_none());
}

#[test]
fn test_find_works_with_composite_key() {
    let g = gateway();
    let reported = Rc::new(RefCell::new(0));
    let sink = reported.clone();
    let c = composite_model(&g).with_reporter(move |_, _| *sink.borrow_mut() += 1);
    c.insert(&row! { "user_id" => 4, "post_id" => 3, "type_id" => 5 })
        .unwrap();
    assert!(matches!(
        c.find(4),
        Err(tablekit::Error::InvalidKey { .. })
    ));
    assert_eq!(*reported.borrow(), 1);
    assert!(c.find([4, 3]).unwrap().is_some());
    assert!(c.find(row! { "user_id" => 4, "post_id" => 3 }).unwrap().is_some());
    assert!(c.find(row! { "post_id" => 3, "user_id" => 4 }).unwrap().is_some());
    assert!(c.find([3, 4]).unwrap().is_none());
}

#[test]
fn test_find_where() {
    let g = gateway();
    let c = composite_model(&g);
    for (user_id, post_id) in [(4, 3), (4, 4), (5, 4)] {
        c.insert(&row! { "user_id" => user_id, "post_id" => post_id, "type_id" => 5 })
            .unwrap();
    }
    assert_eq!(c.find_where(&row! { "user_id" => 4 }, 0, 0).unwrap().len(), 2);
    assert_eq!(c.find_where(&row! { "post_id" => 4 }, 0, 0).unwrap().len(), 2);
    assert_eq!(c.find_where(&row! { "post_id" => 4 }, 1, 0).unwrap().len(), 1);
    assert_eq!(c.find_where(&row! { "post_id" => 40 }, 0, 0).unwrap().len(), 0);
}

#[test]
fn test_find_where_limit_and_offset_are_working() {
    let g = gateway();
    let m = model(&g);
    let rows: Vec<Row> = (1..=10)
        .map(|user_id| row! { "user_id" => user_id, "post_id" => 1 })
        .collect();
    m.insert_rows(&rows).unwrap();
    assert_eq!(m.count(), 10);
    assert_eq!(m.find_where(&row! { "post_id" => 1 }, 5, 0).unwrap().len(), 5);

    let page = m.find_where(&row! { "post_id" => 1 }, 5, 5).unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(page[0]["user_id"].to_i64(), 6);

    let tail = m.find_where(&row! { "post_id" => 1 }, 0, 8).unwrap();
    assert_eq!(tail.len(), 2);
}

#[test]
fn test_find_where_with_empty_predicate_runs_nothing() {
    let g = gateway();
    let m = model(&g).with_reporter(tablekit::report::ignore_error);
    m.insert(&row! { "user_id" => 1, "post_id" => 1 }).unwrap();
    assert!(matches!(
        m.find_where(&row! {}, 0, 0),
        Err(tablekit::Error::InvalidPredicate(_))
    ));
    assert!(m.delete_where(&row! {}).is_err());
    assert_eq!(m.count(), 1);
}

#[test]
fn test_delete_where() {
    let g = gateway();
    let c = composite_model(&g);
    c.insert(&row! { "user_id" => 4, "post_id" => 3, "type_id" => 5 })
        .unwrap();
    c.insert(&row! { "user_id" => 4, "post_id" => 4, "type_id" => 5 })
        .unwrap();
    assert!(!c.delete_where(&row! { "user_id" => 100 }).unwrap());
    assert!(c.delete_where(&row! { "user_id" => 4 }).unwrap());
    assert_eq!(c.count(), 0);
}

#[test]
fn test_values_with_quotes_are_stored_verbatim() {
    let g = gateway();
    let m = model(&g);
    m.insert(&row! { "user_id" => 1, "post_id" => 1, "created_at" => "it's'); DROP TABLE wp_model_table; --" })
        .unwrap();
    let found = m.find(1).unwrap().unwrap();
    assert_eq!(
        found["created_at"],
        SqlValue::from("it's'); DROP TABLE wp_model_table; --")
    );
    assert!(m.table_exists().unwrap());
}

#[test]
fn test_insert_id() {
    let g = gateway();
    let m = model(&g);
    m.insert(&row! { "user_id" => 42, "post_id" => 1 }).unwrap();
    assert_eq!(m.insert_id(), 1);
    m.insert(&row! { "user_id" => 43, "post_id" => 1 }).unwrap();
    assert_eq!(m.insert_id(), 2);
}

#[test]
fn test_update_binds_predicate_with_declared_formats() {
    let g = gateway();
    let t = Table::new(&g, &g, Codes);
    assert!(t.create_table().unwrap());
    t.insert(&row! { "id" => 1, "code" => "007", "score" => 0 }).unwrap();
    t.insert(&row! { "id" => 2, "code" => "1.50", "score" => 0 }).unwrap();

    assert_eq!(t.find_where(&row! { "code" => "007" }, 0, 0).unwrap().len(), 1);
    assert!(t
        .update(&row! { "score" => 5 }, &row! { "code" => "007" })
        .unwrap());
    assert!(t
        .update(&row! { "score" => 6 }, &row! { "code" => "1.50" })
        .unwrap());
    assert_eq!(t.find(1).unwrap().unwrap()["score"], SqlValue::Int(5));
    assert_eq!(t.find(2).unwrap().unwrap()["score"], SqlValue::Int(6));
    assert!(t.delete_where(&row! { "code" => "007" }).unwrap());
    assert_eq!(t.count(), 1);
}

#[test]
fn test_row_without_columns_is_rejected_before_writing() {
    let g = gateway();
    let t = Table::new(&g, &g, Codes).with_reporter(tablekit::report::ignore_error);
    assert!(t.create_table().unwrap());
    t.insert(&row! { "id" => 1, "code" => "a", "score" => 0 }).unwrap();

    let empty = row! { "not_a_column" => 1 };
    assert!(matches!(t.insert(&empty), Err(tablekit::Error::EmptyRow(_))));
    assert!(matches!(
        t.insert_or_update(&empty),
        Err(tablekit::Error::EmptyRow(_))
    ));
    assert!(matches!(
        t.update(&empty, &row! { "id" => 1 }),
        Err(tablekit::Error::EmptyRow(_))
    ));
    assert_eq!(t.count(), 1);
}
