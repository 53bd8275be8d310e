//! Comment Repository

use std::sync::Arc;

use bw_store::{paths, DocumentStore, Filter};

use super::{from_doc, to_doc};
use crate::domain::Comment;
use crate::error::Result;

pub struct CommentRepository {
    store: Arc<dyn DocumentStore>,
}

impl CommentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, comment: &Comment) -> Result<()> {
        self.store
            .create(
                &paths::comment(&comment.organization_id, &comment.id),
                to_doc(comment)?,
            )
            .await?;
        Ok(())
    }

    pub async fn list_by_matter(&self, org_id: &str, matter_id: &str) -> Result<Vec<Comment>> {
        let docs = self
            .store
            .query(
                &paths::comments(org_id),
                &[Filter::eq("matterId", matter_id)],
                None,
            )
            .await?;
        let mut comments: Vec<Comment> = docs
            .into_iter()
            .map(|(_, doc)| from_doc(doc))
            .collect::<Result<_>>()?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }
}
