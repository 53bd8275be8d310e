//! Invitation Repository
//!
//! Invitations are keyed by code in a flat collection so accept can resolve
//! a code without knowing the organization.

use std::sync::Arc;

use bw_store::{paths, DocumentStore, Filter};

use super::{from_doc, to_doc};
use crate::domain::Invitation;
use crate::error::Result;

pub struct InvitationRepository {
    store: Arc<dyn DocumentStore>,
}

impl InvitationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, invitation: &Invitation) -> Result<()> {
        self.store
            .create(&paths::invitation(&invitation.code), to_doc(invitation)?)
            .await?;
        Ok(())
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Invitation>> {
        match self.store.get(&paths::invitation(code)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_org(&self, org_id: &str) -> Result<Vec<Invitation>> {
        let docs = self
            .store
            .query(
                paths::INVITATIONS,
                &[Filter::eq("organizationId", org_id)],
                None,
            )
            .await?;
        docs.into_iter().map(|(_, doc)| from_doc(doc)).collect()
    }
}
