use super::{Artist, Tagged};
use crate::fixtures::{generate_name, generate_positive_int, generate_year, Genre};
use serde::{Deserialize, Serialize};

/// Body of `POST /albums/` and `PUT /albums/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlbumPayload {
    pub title: String,
    pub release_year: i32,
    pub genre: String,
    pub price: f64,
    pub stock: i32,
    pub artist_id: i64,
}

impl AlbumPayload {
    /// A tagged ROCK album by `artist_id` with random year, price and stock.
    pub fn generated(artist_id: i64) -> Self {
        Self {
            title: generate_name(),
            release_year: generate_year(),
            genre: Genre::Rock.as_str().to_string(),
            price: f64::from(generate_positive_int()),
            stock: generate_positive_int(),
            artist_id,
        }
    }

    /// Rejected by the server: empty title and year zero.
    pub fn invalid(artist_id: i64) -> Self {
        Self {
            title: String::new(),
            release_year: 0,
            ..Self::generated(artist_id)
        }
    }
}

/// Album as returned by the server, with the artist expanded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub release_year: i32,
    pub genre: String,
    pub price: f64,
    pub stock: i32,
    pub artist: Artist,
}

impl Tagged for Album {
    fn id(&self) -> i64 {
        self.id
    }

    fn tag_field(&self) -> Option<&str> {
        Some(&self.title)
    }
}
