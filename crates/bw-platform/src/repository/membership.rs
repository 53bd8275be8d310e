//! Membership Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore};

use super::{from_doc, to_doc};
use crate::domain::Membership;
use crate::error::Result;

pub struct MembershipRepository {
    store: Arc<dyn DocumentStore>,
}

impl MembershipRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find(&self, org_id: &str, user_id: &str) -> Result<Option<Membership>> {
        match self.store.get(&paths::member(org_id, user_id)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn upsert(&self, membership: &Membership) -> Result<()> {
        self.store
            .set(
                &paths::member(&membership.organization_id, &membership.user_id),
                to_doc(membership)?,
            )
            .await?;
        Ok(())
    }

    pub async fn list_by_org(&self, org_id: &str) -> Result<Vec<Membership>> {
        let docs = self.store.query(&paths::members(org_id), &[], None).await?;
        docs.into_iter().map(|(_, doc)| from_doc(doc)).collect()
    }
}
