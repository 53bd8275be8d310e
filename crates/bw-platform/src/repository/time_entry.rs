//! Time Entry Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore, Filter};

use super::{from_doc, to_doc};
use crate::domain::TimeEntry;
use crate::error::Result;

pub struct TimeEntryRepository {
    store: Arc<dyn DocumentStore>,
}

impl TimeEntryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, entry: &TimeEntry) -> Result<()> {
        self.store
            .create(
                &paths::time_entry(&entry.organization_id, &entry.id),
                to_doc(entry)?,
            )
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, org_id: &str, id: &str) -> Result<Option<TimeEntry>> {
        match self.store.get(&paths::time_entry(org_id, id)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list_unbilled_by_matter(
        &self,
        org_id: &str,
        matter_id: &str,
    ) -> Result<Vec<TimeEntry>> {
        let docs = self
            .store
            .query(
                &paths::time_entries(org_id),
                &[Filter::eq("matterId", matter_id), Filter::eq("billed", false)],
                None,
            )
            .await?;
        docs.into_iter().map(|(_, doc)| from_doc(doc)).collect()
    }
}
