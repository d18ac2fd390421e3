use crate::domain::error::{AppError, Result};

use super::CrmRepository;

/// Row filter for a dashboard count. Table and column names are fixed strings
/// chosen by the caller, never user input.
#[derive(Debug, Clone, Copy)]
pub enum CountFilter<'a> {
    All,
    Equals { column: &'static str, value: &'a str },
}

impl CrmRepository {
    pub async fn count_rows(&self, table: &'static str, filter: CountFilter<'_>) -> Result<i64> {
        let count = match filter {
            CountFilter::All => {
                sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
                    .fetch_one(&self.pool)
                    .await
            }
            CountFilter::Equals { column, value } => {
                sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM {table} WHERE {column} = ?"
                ))
                .bind(value)
                .fetch_one(&self.pool)
                .await
            }
        };

        count.map_err(|e| AppError::DatabaseError(format!("Failed to count {table}: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calling::CallOutcome;

    #[tokio::test]
    async fn filtered_count_only_sees_matching_rows() {
        let repo = CrmRepository::in_memory().await.unwrap();
        repo.create_call_log("l1", "caller-a", CallOutcome::NoAnswer).await.unwrap();
        repo.create_call_log("l2", "caller-a", CallOutcome::Booked).await.unwrap();
        repo.create_call_log("l3", "caller-b", CallOutcome::DidntBook).await.unwrap();

        let mine = repo
            .count_rows(
                "call_logs",
                CountFilter::Equals {
                    column: "cold_caller_id",
                    value: "caller-a",
                },
            )
            .await
            .unwrap();
        assert_eq!(mine, 2);
        assert_eq!(repo.count_rows("call_logs", CountFilter::All).await.unwrap(), 3);
    }
}
