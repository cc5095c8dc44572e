use super::crud::{expect_field, CrudResource};
use super::{Resource, Validity};
use crate::client::{AlbumQuery, ParamMap, SortOrder};
use crate::config::ScenarioSettings;
use crate::endpoints::Endpoint;
use crate::error::AssertionFailure;
use crate::fixtures::{Genre, MARKER, POSITIVE_INT_BOUND};
use crate::models::{Album, AlbumPayload};

pub struct Albums;

impl Albums {
    /// Filtered listing that every generated album satisfies.
    pub fn fixture_query() -> AlbumQuery {
        AlbumQuery::new()
            .skip(0)
            .limit(20)
            .search(MARKER)
            .genre(Genre::Rock)
            .price_range(0.0, f64::from(POSITIVE_INT_BOUND))
            .sort_by(SortOrder::PriceAsc)
    }
}

impl CrudResource for Albums {
    type Payload = AlbumPayload;
    type Record = Album;

    const RESOURCE: Resource = Resource::Albums;
    const COLLECTION: Endpoint = Endpoint::Albums;
    const ITEM: Endpoint = Endpoint::Album;

    fn payload(settings: &ScenarioSettings, data: Validity) -> AlbumPayload {
        match data {
            Validity::Valid => AlbumPayload::generated(settings.album_artist_id),
            Validity::Invalid => AlbumPayload::invalid(settings.album_artist_id),
        }
    }

    fn check_echo(record: &Album, payload: &AlbumPayload) -> Result<(), AssertionFailure> {
        expect_field("title", &payload.title, &record.title)?;
        expect_field("release_year", &payload.release_year, &record.release_year)?;
        expect_field("genre", &payload.genre, &record.genre)?;
        expect_field("price", &payload.price, &record.price)?;
        expect_field("stock", &payload.stock, &record.stock)?;
        expect_field("artist.id", &payload.artist_id, &record.artist.id)
    }

    fn list_params() -> ParamMap {
        Self::fixture_query().params()
    }

    fn check_list(records: &[Album]) -> Result<(), AssertionFailure> {
        if let Some(album) = records.iter().find(|album| album.genre != Genre::Rock.as_str()) {
            return Err(AssertionFailure::Check(format!(
                "genre filter ignored: album {} has genre {:?}",
                album.id, album.genre
            )));
        }
        if let Some(pair) = records.windows(2).find(|pair| pair[0].price > pair[1].price) {
            return Err(AssertionFailure::Check(format!(
                "price_asc ordering broken: album {} ({}) before album {} ({})",
                pair[0].id, pair[0].price, pair[1].id, pair[1].price
            )));
        }
        Ok(())
    }
}
