// src/services/client_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ClientRepository,
    models::{
        approval::Recipient,
        client::{Client, ClientContact, ClientDetail, CreateClientPayload, CreateContactPayload},
    },
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
}

impl ClientService {
    pub fn new(repo: ClientRepository) -> Self {
        Self { repo }
    }

    pub async fn create_client<'e, E>(&self, executor: E, payload: &CreateClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = self.repo.create_client(executor, payload).await?;
        tracing::info!("👤 Cliente '{}' cadastrado", client.name);
        Ok(client)
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        self.repo.list_clients().await
    }

    pub async fn get_client<'e, E>(&self, executor: E, id: Uuid) -> Result<ClientDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let client = self
            .repo
            .find_client(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("cliente {}", id)))?;
        let contacts = self.repo.list_contacts(&mut *conn, id).await?;
        Ok(ClientDetail { client, contacts })
    }

    pub async fn delete_client<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_client(executor, id).await? {
            return Err(AppError::ResourceNotFound(format!("cliente {}", id)));
        }
        Ok(())
    }

    pub async fn add_contact<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateContactPayload,
    ) -> Result<ClientContact, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        if self.repo.find_client(&mut *conn, client_id).await?.is_none() {
            return Err(AppError::ResourceNotFound(format!("cliente {}", client_id)));
        }
        self.repo.add_contact(&mut *conn, client_id, payload).await
    }

    pub async fn remove_contact<'e, E>(&self, executor: E, client_id: Uuid, contact_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.remove_contact(executor, client_id, contact_id).await? {
            return Err(AppError::ResourceNotFound(format!("contato {}", contact_id)));
        }
        Ok(())
    }

    /// Destinatários a partir de contatos cadastrados. Id desconhecido é erro.
    pub async fn recipients_from_contacts<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<Recipient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let contacts = self.repo.find_contacts(executor, ids).await?;
        if let Some(missing) = ids.iter().find(|id| !contacts.iter().any(|c| c.id == **id)) {
            return Err(AppError::ResourceNotFound(format!("contato {}", missing)));
        }
        Ok(contacts.iter().map(Recipient::from).collect())
    }
}
