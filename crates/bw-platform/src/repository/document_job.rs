//! Document Job Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore};

use super::{from_doc, to_doc};
use crate::domain::DocumentJob;
use crate::error::Result;

pub struct DocumentJobRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentJobRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, job: &DocumentJob) -> Result<()> {
        self.store
            .create(
                &paths::document_job(&job.organization_id, &job.id),
                to_doc(job)?,
            )
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, org_id: &str, id: &str) -> Result<Option<DocumentJob>> {
        match self.store.get(&paths::document_job(org_id, id)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }
}
