//! Organization Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore};

use super::{from_doc, to_doc};
use crate::domain::Organization;
use crate::error::Result;

pub struct OrganizationRepository {
    store: Arc<dyn DocumentStore>,
}

impl OrganizationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Organization>> {
        match self.store.get(&paths::organization(id)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn update(&self, org: &Organization) -> Result<()> {
        self.store
            .set(&paths::organization(&org.id), to_doc(org)?)
            .await?;
        Ok(())
    }
}
