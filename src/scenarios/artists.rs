use super::crud::{expect_field, CrudResource};
use super::{Resource, Validity};
use crate::config::ScenarioSettings;
use crate::endpoints::Endpoint;
use crate::error::AssertionFailure;
use crate::models::{Artist, ArtistPayload};

pub struct Artists;

impl CrudResource for Artists {
    type Payload = ArtistPayload;
    type Record = Artist;

    const RESOURCE: Resource = Resource::Artists;
    const COLLECTION: Endpoint = Endpoint::Artists;
    const ITEM: Endpoint = Endpoint::Artist;

    fn payload(_settings: &ScenarioSettings, data: Validity) -> ArtistPayload {
        match data {
            Validity::Valid => ArtistPayload::generated(),
            Validity::Invalid => ArtistPayload::invalid(),
        }
    }

    fn check_echo(record: &Artist, payload: &ArtistPayload) -> Result<(), AssertionFailure> {
        expect_field("name", &payload.name, &record.name)?;
        expect_field("description", &payload.description, &record.description)
    }
}
