//! Book category model

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Category used to filter the catalog
///
/// Two categories are the same filter key when their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    #[serde(rename = "categoryTitle")]
    pub title: String,
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
