//! Test data generation for harness-created fixtures.

mod generator;
mod genre;

pub use generator::{
    generate_description, generate_email, generate_name, generate_positive_int, generate_year,
    DESCRIPTION_PREFIX, MARKER, MIN_YEAR, NAME_PREFIX, POSITIVE_INT_BOUND, TAG_SUFFIX_LEN,
};
pub use genre::Genre;
