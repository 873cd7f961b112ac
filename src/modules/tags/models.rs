use kniga_http::response::FieldError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::{Tag, TagId};
use crate::utils::char_len;

const NAME_MAX: usize = 30;

/// Tag as shown on pages and in the public tag list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TagDisplay {
    #[schema(value_type = String)]
    pub id: TagId,
    pub name: String,
}

impl From<Tag> for TagDisplay {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TagCreateForm {
    #[schema(max_length = 30)]
    pub name: String,
}

impl TagCreateForm {
    /// The trimmed name, or the reasons it cannot be used
    pub fn validate(&self) -> Result<String, Vec<FieldError>> {
        let name = self.name.trim();
        if name.is_empty() {
            Err(vec![FieldError::new("name", "required")])
        } else if char_len(name) > NAME_MAX {
            Err(vec![FieldError::new(
                "name",
                format!("at most {NAME_MAX} characters"),
            )])
        } else {
            Ok(name.to_owned())
        }
    }
}
