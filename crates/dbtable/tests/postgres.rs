//! Runs against a live Postgres when `DATABASE_URL` is set; skipped otherwise.

use dbtable::{PgExecutor, Table, TableError, TableResult, row, sql};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::NoTls;

#[derive(Debug, PartialEq, Deserialize)]
struct User {
    id: i64,
    name: String,
    age: Option<i32>,
}

async fn try_connect() -> TableResult<Option<tokio_postgres::Client>> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping");
            return Ok(None);
        }
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(|e| TableError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

fn unique_table(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("{prefix}_{}_{}", std::process::id(), nanos)
}

#[tokio::test]
async fn crud_round_trip() -> TableResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };

    let name = unique_table("dbtable_users");
    client
        .batch_execute(&format!(
            "CREATE TEMP TABLE {name} (id BIGINT PRIMARY KEY, name TEXT NOT NULL UNIQUE, age INT)"
        ))
        .await?;

    let users: Table<User, _> = Table::new(name, "id", PgExecutor::new(client));

    let inserted = users
        .insert(row! { "id" => 1, "name" => "mia", "age" => 5 }, None)
        .await?;
    assert_eq!(inserted, 1);
    users
        .insert(row! { "id" => 2, "name" => "ari", "age" => 31 }, None)
        .await?;

    assert_eq!(
        users.get_as("*", 1).await?,
        Some(User {
            id: 1,
            name: "mia".into(),
            age: Some(5),
        })
    );

    let mut older = sql("age > ");
    older.push_bind(30);
    let found = users.select_all_as("*", Some(older)).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "ari");

    // Postgres has no LIMIT on UPDATE/DELETE.
    let updated = users
        .update_all(row! { "age" => 6 }, Some(users.key_clause(1)), None)
        .await?;
    assert_eq!(updated, 1);
    assert_eq!(users.get_as("*", 1).await?.map(|u| u.age), Some(Some(6)));

    let mut upsert = sql("ON CONFLICT (id) DO UPDATE SET age = ");
    upsert.push_bind(40);
    users
        .insert(row! { "id" => 2, "name" => "ari", "age" => 0 }, Some(upsert))
        .await?;
    assert_eq!(users.get_as("*", 2).await?.and_then(|u| u.age), Some(40));

    let deleted = users.delete_all(Some(users.key_clause(1)), None).await?;
    assert_eq!(deleted, 1);
    assert!(users.get("*", 1).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn constraint_errors_are_mapped() -> TableResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };

    let name = unique_table("dbtable_dupes");
    client
        .batch_execute(&format!("CREATE TEMP TABLE {name} (id BIGINT PRIMARY KEY)"))
        .await?;

    let table: Table<(), _> = Table::new(name, "id", PgExecutor::new(client));
    table.insert(row! { "id" => 1 }, None).await?;

    let err = table.insert(row! { "id" => 1 }, None).await.unwrap_err();
    assert!(err.is_unique_violation(), "unexpected error: {err}");
    Ok(())
}

#[cfg(feature = "pool")]
#[tokio::test]
async fn pooled_table_runs_on_a_checked_out_client() -> TableResult<()> {
    use dbtable::{PoolOptions, TableOptions, pooled_table};

    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping");
        return Ok(());
    };

    let pool = PoolOptions::new(database_url).max_size(2).build()?;
    let table: Table<(), _> =
        pooled_table(&pool, "pg_catalog.pg_type", "oid", TableOptions::default()).await?;

    let rows = table
        .fetch(sql("SELECT 1::int4 AS one, 'x'::text AS label"))
        .await?;
    assert_eq!(rows[0].try_get::<i64>("one")?, 1);
    assert_eq!(rows[0].try_get::<String>("label")?, "x");
    assert_eq!(pool.status().size, 1);

    drop(table);
    assert_eq!(pool.status().available, 1);
    Ok(())
}
