//! Remote SQL-execution backend over HTTP
//!
//! For targets that do not accept direct connections, payload text is
//! submitted to a SQL-execution endpoint authorized by an API key. The
//! endpoint executes one request at a time and replies with JSON:
//! `{"columns": [...], "rows": [[...]], "rows_affected": n}`, all fields
//! optional. Non-2xx responses surface as execution errors with the
//! response body as cause.
//!
//! DDL cannot be coupled to ledger writes transactionally over this
//! backend, so `supports_transactional_ddl` is false and callers fall back
//! to probe-based re-verification.

use crate::error::{DbError, DbResult};
use crate::traits::{Database, TableRows};
use async_trait::async_trait;
use dock_core::sql_utils::{json_literal, quote_ident, quote_qualified, string_literal};
use serde::Deserialize;
use std::time::Duration;

/// Rows per INSERT statement during bulk loads
const INSERT_BATCH_SIZE: usize = 500;

/// Remote HTTP SQL-execution backend
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecResponse {
    #[serde(default)]
    columns: Vec<String>,

    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,

    #[serde(default)]
    rows_affected: Option<usize>,
}

impl HttpBackend {
    /// Create a new backend for the given endpoint.
    ///
    /// `timeout` bounds every request, including the initial connection.
    pub fn new(url: &str, api_key: Option<String>, timeout: Duration) -> DbResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            api_key,
        })
    }

    async fn submit(&self, sql: &str) -> DbResult<ExecResponse> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "query": sql }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DbError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ExecResponse>()
            .await
            .map_err(|e| DbError::RemoteResponse(e.to_string()))
    }

    async fn submit_count(&self, sql: &str) -> DbResult<usize> {
        let response = self.submit(sql).await?;
        let cell = response
            .rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| DbError::RemoteResponse("count query returned no rows".to_string()))?;
        cell_to_count(cell)
    }
}

/// Interpret a result cell as a row count. Endpoints differ on whether
/// counts come back as JSON numbers or strings.
fn cell_to_count(cell: &serde_json::Value) -> DbResult<usize> {
    match cell {
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| DbError::RemoteResponse(format!("negative count: {}", n))),
        serde_json::Value::String(s) => s
            .parse::<usize>()
            .map_err(|_| DbError::RemoteResponse(format!("unparseable count: '{}'", s))),
        other => Err(DbError::RemoteResponse(format!(
            "unexpected count cell: {}",
            other
        ))),
    }
}

#[async_trait]
impl Database for HttpBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        let response = self.submit(sql).await?;
        Ok(response.rows_affected.unwrap_or(0))
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.submit(sql).await.map(|_| ())
    }

    async fn execute_transaction(&self, statements: &[String]) -> DbResult<()> {
        // Best effort: one request wrapping the statements. The endpoint
        // decides how far transactional semantics reach; callers must not
        // rely on them here (supports_transactional_ddl is false).
        let script = format!("BEGIN TRANSACTION;\n{};\nCOMMIT;", statements.join(";\n"));
        self.submit(&script).await.map(|_| ())
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.submit_count(&format!("SELECT COUNT(*) FROM ({}) AS q", sql))
            .await
    }

    async fn table_exists(&self, name: &str) -> DbResult<bool> {
        let count = self
            .submit_count(&format!(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = {}",
                string_literal(name)
            ))
            .await?;
        Ok(count > 0)
    }

    async fn function_exists(&self, name: &str) -> DbResult<bool> {
        let count = self
            .submit_count(&format!(
                "SELECT COUNT(*) FROM information_schema.routines WHERE routine_name = {}",
                string_literal(name)
            ))
            .await?;
        Ok(count > 0)
    }

    async fn count_rows(&self, table: &str) -> DbResult<usize> {
        self.submit_count(&format!(
            "SELECT COUNT(*) FROM {}",
            quote_qualified(table)
        ))
        .await
    }

    async fn delete_all(&self, table: &str) -> DbResult<usize> {
        self.execute(&format!("DELETE FROM {}", quote_qualified(table)))
            .await
    }

    async fn insert_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<serde_json::Value>],
    ) -> DbResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DbError::RowShape {
                    table: table.to_string(),
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }

        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_BATCH_SIZE) {
            let values = chunk
                .iter()
                .map(|row| {
                    let literals = row.iter().map(json_literal).collect::<Vec<_>>().join(", ");
                    format!("({})", literals)
                })
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                quote_qualified(table),
                column_list,
                values
            );
            let response = self.submit(&sql).await?;
            inserted += response.rows_affected.unwrap_or(chunk.len());
        }

        Ok(inserted)
    }

    async fn fetch_table(&self, table: &str) -> DbResult<TableRows> {
        let response = self
            .submit(&format!("SELECT * FROM {}", quote_qualified(table)))
            .await?;
        Ok((response.columns, response.rows))
    }

    fn supports_transactional_ddl(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_backend() {
        let db = HttpBackend::new(
            "https://db.example.com/sql",
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(db.backend_name(), "http");
        assert!(!db.supports_transactional_ddl());
    }

    #[test]
    fn test_cell_to_count_accepts_numbers_and_strings() {
        assert_eq!(cell_to_count(&json!(7)).unwrap(), 7);
        assert_eq!(cell_to_count(&json!("12")).unwrap(), 12);
        assert!(cell_to_count(&json!(-1)).is_err());
        assert!(cell_to_count(&json!(null)).is_err());
        assert!(cell_to_count(&json!("many")).is_err());
    }

    #[test]
    fn test_exec_response_defaults() {
        let response: ExecResponse = serde_json::from_str("{}").unwrap();
        assert!(response.columns.is_empty());
        assert!(response.rows.is_empty());
        assert!(response.rows_affected.is_none());
    }
}
