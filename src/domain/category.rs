//! Subscription categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of subscription categories. Unrecognised values decode to
/// [`Category::Other`] instead of failing the load.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    Streaming,
    Software,
    Utilities,
    Gaming,
    News,
    Education,
    Creator,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Streaming,
        Category::Software,
        Category::Utilities,
        Category::Gaming,
        Category::News,
        Category::Education,
        Category::Creator,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Streaming => "streaming",
            Category::Software => "software",
            Category::Utilities => "utilities",
            Category::Gaming => "gaming",
            Category::News => "news",
            Category::Education => "education",
            Category::Creator => "creator",
            Category::Other => "other",
        }
    }

    /// Folding lookup: anything unknown maps to `Other`.
    pub fn parse_lossy(value: &str) -> Category {
        let needle = value.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .unwrap_or(Category::Other)
    }

    /// Strict lookup used for user input.
    pub fn parse_strict(value: &str) -> Option<Category> {
        let needle = value.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse_lossy(&value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
