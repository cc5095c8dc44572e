//! Request and response shapes of the records-store API.

mod album;
mod artist;
mod token;
mod user;

pub use album::{Album, AlbumPayload};
pub use artist::{Artist, ArtistPayload};
pub use token::Token;
pub use user::{Identity, RegisterRequest, RightsPatch, User, GENERATED_PASSWORD};

/// Records whose display field may carry the generated-value marker.
pub trait Tagged {
    fn id(&self) -> i64;

    /// The field generated names end up in (artist name, album title, username).
    fn tag_field(&self) -> Option<&str>;

    fn has_marker(&self, marker: &str) -> bool {
        self.tag_field()
            .is_some_and(|value| value.starts_with(marker))
    }
}

/// First record carrying `marker`, in server order.
pub fn find_tagged<'a, T: Tagged>(records: &'a [T], marker: &str) -> Option<&'a T> {
    records.iter().find(|record| record.has_marker(marker))
}
