use crate::domain::error::{AppError, Result};
use crate::domain::records::{Client, ClientInput};
use crate::domain::{new_id, now_timestamp};

use super::entities::ClientEntity;
use super::CrmRepository;

impl CrmRepository {
    pub async fn create_client(&self, input: &ClientInput, created_by: &str) -> Result<Client> {
        let client = sqlx::query_as::<_, ClientEntity>(
            "INSERT INTO clients (id, name, email, phone, company, notes, created_by, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(new_id())
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.company)
        .bind(&input.notes)
        .bind(created_by)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create client: {}", e)))?;

        Ok(client.into())
    }

    pub async fn get_client(&self, id: &str) -> Result<Client> {
        let client = sqlx::query_as::<_, ClientEntity>("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch client: {}", e)))?;

        match client {
            Some(client) => Ok(client.into()),
            None => Err(AppError::NotFound(format!("Client not found: {}", id))),
        }
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, ClientEntity>(
            "SELECT * FROM clients ORDER BY name COLLATE NOCASE ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list clients: {}", e)))?;

        Ok(clients.into_iter().map(Into::into).collect())
    }

    pub async fn update_client(&self, id: &str, input: &ClientInput) -> Result<Client> {
        let client = sqlx::query_as::<_, ClientEntity>(
            "UPDATE clients SET name = ?, email = ?, phone = ?, company = ?, notes = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.company)
        .bind(&input.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update client: {}", e)))?;

        match client {
            Some(client) => Ok(client.into()),
            None => Err(AppError::NotFound(format!("Client not found: {}", id))),
        }
    }

    pub async fn delete_client(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete client: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Client not found: {}", id)));
        }
        Ok(())
    }
}
