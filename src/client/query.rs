//! Query parameters of `GET /albums/`.
//!
//! Absent values are left out of the map entirely; blank strings count as
//! absent. Numeric values are kept whenever present, zero included.

use crate::fixtures::Genre;
use std::collections::BTreeMap;

pub type ParamMap = BTreeMap<&'static str, String>;

/// Orderings accepted by `sort_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    Title,
    Year,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::Title => "title",
            SortOrder::Year => "year",
        }
    }
}

fn put_str(params: &mut ParamMap, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        params.insert(key, value.to_string());
    }
}

fn put_num<T: ToString>(params: &mut ParamMap, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        params.insert(key, value.to_string());
    }
}

pub fn build_params(
    skip: Option<u32>,
    limit: Option<u32>,
    search: Option<&str>,
    genre: Option<&str>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sort_by: Option<&str>,
) -> ParamMap {
    let mut params = ParamMap::new();
    put_num(&mut params, "skip", skip);
    put_num(&mut params, "limit", limit);
    put_str(&mut params, "search", search);
    put_str(&mut params, "genre", genre);
    put_num(&mut params, "min_price", min_price);
    put_num(&mut params, "max_price", max_price);
    put_str(&mut params, "sort_by", sort_by);
    params
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub genre: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<String>,
}

impl AlbumQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn genre(mut self, genre: Genre) -> Self {
        self.genre = Some(genre.as_str().to_string());
        self
    }

    pub fn price_range(mut self, min: f64, max: f64) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    pub fn sort_by(mut self, order: SortOrder) -> Self {
        self.sort_by = Some(order.as_str().to_string());
        self
    }

    pub fn params(&self) -> ParamMap {
        build_params(
            self.skip,
            self.limit,
            self.search.as_deref(),
            self.genre.as_deref(),
            self.min_price,
            self.max_price,
            self.sort_by.as_deref(),
        )
    }
}
