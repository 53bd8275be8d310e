//! Invoice Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore};

use super::{from_doc, to_doc};
use crate::domain::Invoice;
use crate::error::Result;

pub struct InvoiceRepository {
    store: Arc<dyn DocumentStore>,
}

impl InvoiceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, org_id: &str, id: &str) -> Result<Option<Invoice>> {
        match self.store.get(&paths::invoice(org_id, id)).await? {
            Some(doc) => Ok(Some(from_doc(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn update(&self, invoice: &Invoice) -> Result<()> {
        self.store
            .set(
                &paths::invoice(&invoice.organization_id, &invoice.id),
                to_doc(invoice)?,
            )
            .await?;
        Ok(())
    }
}
