// src/db/client_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::client::{Client, ClientContact, CreateClientPayload, CreateContactPayload},
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_client<'e, E>(&self, executor: E, payload: &CreateClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, document_number, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, document_number, email, phone, address, created_at
            "#,
        )
        .bind(payload.name.trim())
        .bind(&payload.document_number)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .fetch_one(executor)
        .await?;
        Ok(client)
    }

    // Leitura simples: vai direto na pool principal.
    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, document_number, email, phone, address, created_at
            FROM clients
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    pub async fn find_client<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, document_number, email, phone, address, created_at FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    pub async fn delete_client<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  CONTATOS
    // =========================================================================

    pub async fn add_contact<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateContactPayload,
    ) -> Result<ClientContact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = sqlx::query_as::<_, ClientContact>(
            r#"
            INSERT INTO client_contacts (client_id, name, email, phone, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, client_id, name, email, phone, role, created_at
            "#,
        )
        .bind(client_id)
        .bind(payload.name.trim())
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.role)
        .fetch_one(executor)
        .await?;
        Ok(contact)
    }

    pub async fn list_contacts<'e, E>(&self, executor: E, client_id: Uuid) -> Result<Vec<ClientContact>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contacts = sqlx::query_as::<_, ClientContact>(
            r#"
            SELECT id, client_id, name, email, phone, role, created_at
            FROM client_contacts
            WHERE client_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(executor)
        .await?;
        Ok(contacts)
    }

    /// Contatos por id (destinatários escolhidos no envio). A ordem segue a do pedido.
    pub async fn find_contacts<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<ClientContact>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contacts = sqlx::query_as::<_, ClientContact>(
            r#"
            SELECT c.id, c.client_id, c.name, c.email, c.phone, c.role, c.created_at
            FROM client_contacts c
            JOIN UNNEST($1::uuid[]) WITH ORDINALITY AS wanted(id, ord) ON wanted.id = c.id
            ORDER BY wanted.ord
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(contacts)
    }

    pub async fn remove_contact<'e, E>(&self, executor: E, client_id: Uuid, contact_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM client_contacts WHERE id = $1 AND client_id = $2")
            .bind(contact_id)
            .bind(client_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
