//! Matter Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore, Filter};

use super::{from_doc, to_doc};
use crate::domain::Matter;
use crate::error::Result;

pub struct MatterRepository {
    store: Arc<dyn DocumentStore>,
}

impl MatterRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, matter: &Matter) -> Result<()> {
        self.store
            .create(
                &paths::matter(&matter.organization_id, &matter.id),
                to_doc(matter)?,
            )
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, org_id: &str, id: &str) -> Result<Option<Matter>> {
        match self.store.get(&paths::matter(org_id, id)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn update(&self, matter: &Matter) -> Result<()> {
        self.store
            .set(
                &paths::matter(&matter.organization_id, &matter.id),
                to_doc(matter)?,
            )
            .await?;
        Ok(())
    }

    pub async fn list(&self, org_id: &str) -> Result<Vec<Matter>> {
        let docs = self.store.query(&paths::matters(org_id), &[], None).await?;
        docs.into_iter().map(|(_, doc)| from_doc(doc)).collect()
    }

    /// Open matters for a client; a non-empty result blocks client deletion.
    pub async fn find_open_by_client(&self, org_id: &str, client_id: &str) -> Result<Vec<Matter>> {
        let docs = self
            .store
            .query(
                &paths::matters(org_id),
                &[Filter::eq("clientId", client_id), Filter::eq("status", "OPEN")],
                None,
            )
            .await?;
        docs.into_iter().map(|(_, doc)| from_doc(doc)).collect()
    }
}
