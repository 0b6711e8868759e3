use serde::Serialize;

use crate::domain::Tag;
use crate::{ApiError, Scope, ThoughtsClient};

#[derive(Debug, Serialize)]
pub struct NewTag {
    pub title: String,
    pub color: String,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutTag<'a> {
    title: &'a str,
    color: &'a str,
    comment: Option<&'a str>,
}

impl ThoughtsClient {
    pub async fn fetch_tags(&self, scope: Scope) -> Result<Vec<Tag>, ApiError> {
        let url = self.url().append_scoped(scope, "tags");
        self.get_json(url).await
    }

    pub async fn create_tag(&self, tag: &NewTag) -> Result<Tag, ApiError> {
        let url = self.url().append_path("tags");
        self.post_json(url, tag).await
    }

    pub async fn update_tag(&self, tag: &Tag) -> Result<Tag, ApiError> {
        let url = self.url().append_path(&format!("tags/{}", tag.id));
        self.put_json(
            url,
            &PutTag {
                title: &tag.title,
                color: &tag.color,
                comment: tag.comment.as_deref(),
            },
        )
        .await
    }

    pub async fn delete_tag(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url().append_path(&format!("tags/{}", id));
        self.delete(url).await
    }
}
