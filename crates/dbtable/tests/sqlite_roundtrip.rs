//! Runs table operations against an in-memory SQLite database through a
//! function executor.
//!
//! Bundled SQLite is built without `LIMIT` on `UPDATE`/`DELETE`, so the
//! mutating tests here use the `*_all` forms with `limit: None`.

use dbtable::{
    Executor, Placeholder, Row, Statement, Table, TableError, TableOptions, TableResult, Value,
    executor_fn, row, sql,
};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct User {
    id: i64,
    name: String,
    age: Option<i64>,
}

fn to_sqlite(value: Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Text(s) => rusqlite::types::Value::Text(s),
        Value::Number(n) => match n.as_i64() {
            Some(i) => rusqlite::types::Value::Integer(i),
            None => rusqlite::types::Value::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
    }
}

fn from_sqlite(column: &str, value: ValueRef<'_>) -> TableResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => {
            return Err(TableError::decode(column, "blob columns are not supported"));
        }
    })
}

fn run(conn: &Mutex<Connection>, stmt: Statement) -> TableResult<Vec<Row>> {
    let (sql, params) = stmt.into_parts(Placeholder::Question);
    let params = params.into_iter().map(to_sqlite);
    let conn = conn.lock().unwrap();
    let mut prepared = conn.prepare(&sql).map_err(TableError::executor)?;

    let names: Vec<String> = prepared.column_names().into_iter().map(String::from).collect();
    if names.is_empty() {
        prepared
            .execute(params_from_iter(params))
            .map_err(TableError::executor)?;
        return Ok(Vec::new());
    }

    let mut rows = prepared
        .query(params_from_iter(params))
        .map_err(TableError::executor)?;
    let mut out = Vec::new();
    while let Some(r) = rows.next().map_err(TableError::executor)? {
        let mut row = Row::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            let value = r.get_ref(idx).map_err(TableError::executor)?;
            row.set(name.clone(), from_sqlite(name, value)?);
        }
        out.push(row);
    }
    Ok(out)
}

fn sqlite_executor(conn: Arc<Mutex<Connection>>) -> impl Executor<Output = Vec<Row>> {
    executor_fn(move |stmt: Statement| std::future::ready(run(&conn, stmt)))
}

fn setup(ddl: &str) -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(ddl).unwrap();
    Arc::new(Mutex::new(conn))
}

const USERS_DDL: &str =
    "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER);";

#[tokio::test]
async fn insert_then_get_round_trips() {
    let users: Table<User, _> = Table::new("users", "id", sqlite_executor(setup(USERS_DDL)));

    users
        .insert(row! { "id" => 1, "name" => "mia", "age" => 5 }, None)
        .await
        .unwrap();

    let mia = users.get_as("*", 1).await.unwrap();
    assert_eq!(
        mia,
        Some(User {
            id: 1,
            name: "mia".into(),
            age: Some(5),
        })
    );

    let partial = users.get(["name"], 1).await.unwrap().unwrap();
    assert_eq!(partial.columns().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(partial.try_get::<String>("name").unwrap(), "mia");

    assert!(users.get("*", 2).await.unwrap().is_none());
}

#[tokio::test]
async fn select_with_and_without_predicate() {
    let users: Table<User, _> = Table::new("users", "id", sqlite_executor(setup(USERS_DDL)));
    for (id, name, age) in [(1, "mia", 5), (2, "ari", 31), (3, "tom", 42)] {
        users
            .insert(row! { "id" => id, "name" => name, "age" => age }, None)
            .await
            .unwrap();
    }

    let mut older = sql("age > ");
    older.push_bind(30);
    let names: Vec<String> = users
        .select_all_as("*", Some(older))
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["ari", "tom"]);

    assert_eq!(users.select_all("*", None).await.unwrap().len(), 3);

    // No predicate: still exactly one row.
    let first = users.select_one(["id"], None).await.unwrap();
    assert!(first.is_some());

    let mut nobody = sql("name = ");
    nobody.push_bind("nobody");
    assert!(users.select_one_as("*", Some(nobody)).await.unwrap().is_none());
}

#[tokio::test]
async fn update_and_delete_by_predicate() {
    let users: Table<User, _> = Table::new("users", "id", sqlite_executor(setup(USERS_DDL)));
    users
        .insert(row! { "id" => 1, "name" => "mia", "age" => 5 }, None)
        .await
        .unwrap();
    users
        .insert(row! { "id" => 2, "name" => "ari", "age" => 31 }, None)
        .await
        .unwrap();

    users
        .update_all(row! { "age" => 6, "name" => "mia b" }, Some(users.key_clause(1)), None)
        .await
        .unwrap();
    let mia = users.get_as("*", 1).await.unwrap().unwrap();
    assert_eq!((mia.name.as_str(), mia.age), ("mia b", Some(6)));

    users
        .update_all(row! { "age" => Value::Null }, Some(users.key_clause(2)), None)
        .await
        .unwrap();
    assert_eq!(users.get_as("*", 2).await.unwrap().unwrap().age, None);

    users.delete_all(Some(users.key_clause(1)), None).await.unwrap();
    assert!(users.get("*", 1).await.unwrap().is_none());

    users.delete_all(None, None).await.unwrap();
    assert!(users.select_all("*", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn replace_overwrites_existing_row() {
    let users: Table<User, _> = Table::new("users", "id", sqlite_executor(setup(USERS_DDL)));
    users
        .insert(row! { "id" => 1, "name" => "mia", "age" => 5 }, None)
        .await
        .unwrap();

    users
        .replace(row! { "id" => 1, "name" => "mia", "age" => 7 }, None)
        .await
        .unwrap();

    let rows = users.select_all_as("*", None).await.unwrap();
    assert_eq!(
        rows,
        vec![User {
            id: 1,
            name: "mia".into(),
            age: Some(7),
        }]
    );
}

#[tokio::test]
async fn insert_extra_clause_binds_after_values() {
    let users: Table<User, _> = Table::new("users", "id", sqlite_executor(setup(USERS_DDL)));
    users
        .insert(row! { "id" => 1, "name" => "mia", "age" => 5 }, None)
        .await
        .unwrap();

    let mut upsert = sql("ON CONFLICT(id) DO UPDATE SET age = ");
    upsert.push_bind(9);
    users
        .insert(row! { "id" => 1, "name" => "ignored", "age" => 0 }, Some(upsert))
        .await
        .unwrap();

    let mia = users.get_as("*", 1).await.unwrap().unwrap();
    assert_eq!((mia.name.as_str(), mia.age), ("mia", Some(9)));
}

#[tokio::test]
async fn duplicate_key_error_reaches_the_caller() {
    let users: Table<User, _> = Table::new("users", "id", sqlite_executor(setup(USERS_DDL)));
    users
        .insert(row! { "id" => 1, "name" => "mia" }, None)
        .await
        .unwrap();

    let err = users
        .insert(row! { "id" => 1, "name" => "again" }, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::Executor(_)));
    assert!(err.to_string().contains("UNIQUE"));
}

#[tokio::test]
async fn models_insert_and_patch() {
    #[derive(Serialize)]
    struct Patch<'a> {
        name: &'a str,
    }

    let users: Table<User, _> = Table::new("users", "id", sqlite_executor(setup(USERS_DDL)));
    let mia = User {
        id: 1,
        name: "mia".into(),
        age: None,
    };
    users.insert_model(&mia, None).await.unwrap();
    assert_eq!(users.get_as("*", 1).await.unwrap(), Some(mia));

    // `update_model` goes through `update`, which carries `LIMIT 1`; run the
    // equivalent unlimited statement instead.
    let patch = Row::from_serialize(&Patch { name: "mia b" }).unwrap();
    users
        .update_all(patch, Some(users.key_clause(1)), None)
        .await
        .unwrap();
    assert_eq!(users.get_as("*", 1).await.unwrap().unwrap().name, "mia b");
}

#[tokio::test]
async fn backtick_quoting_reaches_reserved_words() {
    let conn = setup("CREATE TABLE `order` (`key` INTEGER PRIMARY KEY, `group` TEXT);");
    let orders: Table<Row, _> =
        Table::with_options("order", "key", sqlite_executor(conn), TableOptions::mysql());

    orders
        .insert(row! { "key" => 1, "group" => "a" }, None)
        .await
        .unwrap();
    orders
        .update_all(row! { "group" => "b" }, Some(orders.key_clause(1)), None)
        .await
        .unwrap();

    let row = orders.get(["group"], 1).await.unwrap().unwrap();
    assert_eq!(row.get("group"), Some(&Value::from("b")));

    orders.delete_all(Some(orders.key_clause(1)), None).await.unwrap();
    assert!(orders.select_all("*", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn raw_execute_goes_through_the_same_executor() {
    let users: Table<User, _> = Table::new("users", "id", sqlite_executor(setup(USERS_DDL)));

    let mut stmt = sql("INSERT INTO users (id, name) VALUES(");
    stmt.push_bind(5).push(", ").push_bind("raw").push(")");
    users.execute(stmt).await.unwrap();

    let rows = users.fetch(sql("SELECT count(*) AS n FROM users")).await.unwrap();
    assert_eq!(rows[0].try_get::<i64>("n").unwrap(), 1);
}
