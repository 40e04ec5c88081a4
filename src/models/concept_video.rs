use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConceptVideo {
    pub id: i64,
    pub concept_tag: String,
    pub youtube_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConceptVideo {
    pub concept_tag: String,
    pub youtube_url: String,
}
