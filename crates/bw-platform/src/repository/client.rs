//! Client Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore, Filter};

use super::{from_doc, to_doc};
use crate::domain::Client;
use crate::error::Result;

pub struct ClientRepository {
    store: Arc<dyn DocumentStore>,
}

impl ClientRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, client: &Client) -> Result<()> {
        self.store
            .create(
                &paths::client(&client.organization_id, &client.id),
                to_doc(client)?,
            )
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, org_id: &str, id: &str) -> Result<Option<Client>> {
        match self.store.get(&paths::client(org_id, id)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn update(&self, client: &Client) -> Result<()> {
        self.store
            .set(
                &paths::client(&client.organization_id, &client.id),
                to_doc(client)?,
            )
            .await?;
        Ok(())
    }

    pub async fn list_active(&self, org_id: &str) -> Result<Vec<Client>> {
        let docs = self
            .store
            .query(&paths::clients(org_id), &[Filter::eq("status", "ACTIVE")], None)
            .await?;
        docs.into_iter().map(|(_, doc)| from_doc(doc)).collect()
    }
}
