//! Task Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore};

use super::{from_doc, to_doc};
use crate::domain::Task;
use crate::error::Result;

pub struct TaskRepository {
    store: Arc<dyn DocumentStore>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, task: &Task) -> Result<()> {
        self.store
            .create(&paths::task(&task.organization_id, &task.id), to_doc(task)?)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, org_id: &str, id: &str) -> Result<Option<Task>> {
        match self.store.get(&paths::task(org_id, id)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn update(&self, task: &Task) -> Result<()> {
        self.store
            .set(&paths::task(&task.organization_id, &task.id), to_doc(task)?)
            .await?;
        Ok(())
    }
}
