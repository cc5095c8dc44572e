//! Randomized fixture values.
//!
//! Every function draws from the thread-local RNG and shares no state with
//! previous calls. Names and descriptions carry [`MARKER`] so records created by
//! the harness can be told apart from server-side seed data.

use chrono::Datelike;
use rand::distr::{Alphabetic, Alphanumeric, Distribution};
use rand::Rng;

/// Prefix shared by every generated name and description.
pub const MARKER: &str = "AT_";

/// Prefix of generated names.
pub const NAME_PREFIX: &str = "AT_Name_";

/// Prefix of generated descriptions.
pub const DESCRIPTION_PREFIX: &str = "AT_Description_";

/// Length of the random part appended to names and descriptions.
pub const TAG_SUFFIX_LEN: usize = 10;

/// Earliest year produced by [`generate_year`].
pub const MIN_YEAR: i32 = 1900;

/// Exclusive upper bound of [`generate_positive_int`].
pub const POSITIVE_INT_BOUND: i32 = 1000;

fn sample_string<D: Distribution<u8>>(dist: D, len: usize) -> String {
    rand::rng()
        .sample_iter(dist)
        .take(len)
        .map(char::from)
        .collect()
}

/// Length drawn uniformly from `min..max_exclusive`.
fn sample_len(min: usize, max_exclusive: usize) -> usize {
    rand::rng().random_range(min..max_exclusive)
}

/// A tagged alphabetic name, e.g. `AT_Name_qWeRtYuIoP`.
pub fn generate_name() -> String {
    format!("{}{}", NAME_PREFIX, sample_string(Alphabetic, TAG_SUFFIX_LEN))
}

/// A tagged alphabetic description, e.g. `AT_Description_AsDfGhJkLz`.
pub fn generate_description() -> String {
    format!(
        "{}{}",
        DESCRIPTION_PREFIX,
        sample_string(Alphabetic, TAG_SUFFIX_LEN)
    )
}

/// A syntactically valid address: 10-14 alphanumerics, a 4-7 letter domain
/// and a 2 letter TLD. Not unique across runs.
pub fn generate_email() -> String {
    let local = sample_string(Alphanumeric, sample_len(10, 15));
    let domain = sample_string(Alphabetic, sample_len(4, 8));
    let tld = sample_string(Alphabetic, sample_len(2, 3));
    format!("{}@{}.{}", local, domain, tld)
}

/// A year in `[1900, current year]`.
pub fn generate_year() -> i32 {
    let current = chrono::Utc::now().year();
    rand::rng().random_range(MIN_YEAR..=current)
}

/// An integer in `[0, 1000)`.
pub fn generate_positive_int() -> i32 {
    rand::rng().random_range(0..POSITIVE_INT_BOUND)
}
