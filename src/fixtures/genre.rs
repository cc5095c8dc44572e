use serde::{Deserialize, Serialize};

/// Album genres accepted by the records store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genre {
    Rock,
    Pop,
    Jazz,
    HipHop,
    Classical,
    Electronic,
    Country,
    Reggae,
    Metal,
    Blues,
}

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::Rock,
        Genre::Pop,
        Genre::Jazz,
        Genre::HipHop,
        Genre::Classical,
        Genre::Electronic,
        Genre::Country,
        Genre::Reggae,
        Genre::Metal,
        Genre::Blues,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Rock => "ROCK",
            Genre::Pop => "POP",
            Genre::Jazz => "JAZZ",
            Genre::HipHop => "HIP_HOP",
            Genre::Classical => "CLASSICAL",
            Genre::Electronic => "ELECTRONIC",
            Genre::Country => "COUNTRY",
            Genre::Reggae => "REGGAE",
            Genre::Metal => "METAL",
            Genre::Blues => "BLUES",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|genre| genre.as_str() == s)
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
