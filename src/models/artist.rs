use super::Tagged;
use crate::fixtures::{generate_description, generate_name};
use serde::{Deserialize, Serialize};

/// Body of `POST /artists/` and `PUT /artists/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtistPayload {
    pub name: String,
    pub description: Option<String>,
}

impl ArtistPayload {
    /// Tagged name and description.
    pub fn generated() -> Self {
        Self {
            name: generate_name(),
            description: Some(generate_description()),
        }
    }

    /// Rejected by the server: the name is empty.
    pub fn invalid() -> Self {
        Self {
            name: String::new(),
            description: Some(generate_description()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Tagged for Artist {
    fn id(&self) -> i64 {
        self.id
    }

    fn tag_field(&self) -> Option<&str> {
        Some(&self.name)
    }
}
