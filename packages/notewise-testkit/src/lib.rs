//! Disposable Postgres databases for integration tests gated on `NOTEWISE_PG_DSN`.

mod error;

pub use error::{Error, Result};

use std::{env, future::Future, str::FromStr};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

const PG_DSN_ENV: &str = "NOTEWISE_PG_DSN";

/// A freshly created database, dropped again by [`with_test_db`].
pub struct TestDatabase {
	name: String,
	dsn: String,
}
impl TestDatabase {
	pub fn dsn(&self) -> &str {
		&self.dsn
	}
}

/// Base DSN for Postgres-backed tests, if configured.
pub fn env_dsn() -> Option<String> {
	env::var(PG_DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

/// Runs `f` against a new database on the server behind `base_dsn`, then drops the database.
///
/// A cleanup failure is reported only when `f` itself succeeded.
pub async fn with_test_db<F, Fut, T>(base_dsn: &str, f: F) -> Result<T>
where
	F: FnOnce(&TestDatabase) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let base = PgConnectOptions::from_str(base_dsn)
		.map_err(|err| Error::Message(format!("Invalid {PG_DSN_ENV}: {err}.")))?;
	let name = format!("notewise_test_{}", Uuid::new_v4().simple());

	run_admin(&base, &format!(r#"CREATE DATABASE "{name}""#)).await?;

	let db = TestDatabase { dsn: base.clone().database(&name).to_url_lossy().to_string(), name };
	let result = f(&db).await;
	let drop_sql = format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, db.name);
	let dropped = run_admin(&base, &drop_sql).await;

	match (result, dropped) {
		(Ok(_), Err(err)) => Err(err),
		(result, _) => result,
	}
}

/// Executes one statement on the server's `postgres` maintenance database.
async fn run_admin(base: &PgConnectOptions, sql: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(&base.clone().database("postgres")).await?;

	sqlx::query(sql).execute(&mut conn).await?;

	Ok(())
}
