use serde::Serialize;

use crate::domain::{CustomField, FieldConfig};
use crate::{ApiError, Scope, ThoughtsClient};

/// Write payload for creating a field; the server assigns id and owner.
#[derive(Debug, Serialize)]
pub struct NewCustomField {
    pub name: String,
    pub config: FieldConfig,
    pub comment: Option<String>,
    pub order: i32,
}

#[derive(Debug, Serialize)]
struct PutCustomField<'a> {
    name: &'a str,
    config: &'a FieldConfig,
    comment: Option<&'a str>,
    order: i32,
}

impl ThoughtsClient {
    pub async fn fetch_custom_fields(&self, scope: Scope) -> Result<Vec<CustomField>, ApiError> {
        let url = self.url().append_scoped(scope, "custom_fields");
        self.get_json(url).await
    }

    pub async fn fetch_custom_field(&self, id: i64) -> Result<CustomField, ApiError> {
        let url = self.url().append_path(&format!("custom_fields/{}", id));
        self.get_json(url).await
    }

    pub async fn create_custom_field(
        &self,
        field: &NewCustomField,
    ) -> Result<CustomField, ApiError> {
        let url = self.url().append_path("custom_fields");
        self.post_json(url, field).await
    }

    pub async fn update_custom_field(&self, field: &CustomField) -> Result<CustomField, ApiError> {
        let url = self
            .url()
            .append_path(&format!("custom_fields/{}", field.id));
        self.put_json(
            url,
            &PutCustomField {
                name: &field.name,
                config: &field.config,
                comment: field.comment.as_deref(),
                order: field.order,
            },
        )
        .await
    }

    pub async fn delete_custom_field(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url().append_path(&format!("custom_fields/{}", id));
        self.delete(url).await
    }
}
