//! Embedded country dataset backing the demo collaborators
//!
//! Compiled into the binary; the demos run against it instead of a live API.
//! `DatasetFetch` answers the same URL shapes the original page hit
//! (country by name, country by alpha code, reverse geocode).

use eyre::{Context, eyre};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bridge::{FetchProvider, Position, PositionProvider};

const COUNTRIES_JSON: &str = include_str!("countries.json");

/// A country record, the payload shape the demos fetch and render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
    pub region: String,
    pub capital: String,
    pub languages: Vec<String>,
    pub currency: String,
    pub population: u64,
    #[serde(default)]
    pub borders: Vec<String>,
    pub latlng: [f64; 2],
    pub flag: String,
}

/// Reverse-geocode response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeRecord {
    pub country: String,
}

/// Fetch provider over the embedded dataset
pub struct DatasetFetch {
    countries: Vec<Country>,
}

impl DatasetFetch {
    pub fn new() -> eyre::Result<Self> {
        let countries: Vec<Country> =
            serde_json::from_str(COUNTRIES_JSON).context("Failed to parse embedded country dataset")?;
        debug!(count = countries.len(), "Loaded embedded country dataset");
        Ok(Self { countries })
    }

    fn by_name(&self, name: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn by_code(&self, code: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.code.eq_ignore_ascii_case(code))
    }

    fn nearest(&self, lat: f64, lng: f64) -> Option<&Country> {
        self.countries.iter().min_by(|a, b| {
            let da = (a.latlng[0] - lat).powi(2) + (a.latlng[1] - lng).powi(2);
            let db = (b.latlng[0] - lat).powi(2) + (b.latlng[1] - lng).powi(2);
            da.total_cmp(&db)
        })
    }
}

impl FetchProvider for DatasetFetch {
    fn fetch(&self, url: &str) -> eyre::Result<String> {
        debug!(%url, "DatasetFetch::fetch");

        if let Some(name) = url.strip_prefix("restcountries/name/") {
            let country = self
                .by_name(name)
                .ok_or_else(|| eyre!("404: country not found: {}", name))?;
            Ok(serde_json::to_string(country)?)
        } else if let Some(code) = url.strip_prefix("restcountries/alpha/") {
            let country = self
                .by_code(code)
                .ok_or_else(|| eyre!("404: no country with code: {}", code))?;
            Ok(serde_json::to_string(country)?)
        } else if let Some(coords) = url.strip_prefix("geocode/") {
            let (lat, lng) = coords
                .split_once(',')
                .ok_or_else(|| eyre!("Bad coordinates: {}", coords))?;
            let lat: f64 = lat.trim().parse().context("Bad latitude")?;
            let lng: f64 = lng.trim().parse().context("Bad longitude")?;
            let country = self
                .nearest(lat, lng)
                .ok_or_else(|| eyre!("No country near {},{}", lat, lng))?;
            Ok(serde_json::to_string(&GeocodeRecord {
                country: country.name.clone(),
            })?)
        } else {
            Err(eyre!("Unknown URL: {}", url))
        }
    }
}

/// Position provider that always reports the same coordinates
pub struct FixedPosition(Position);

impl FixedPosition {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self(Position::new(lat, lng))
    }
}

impl PositionProvider for FixedPosition {
    fn position(&self) -> eyre::Result<Position> {
        Ok(self.0)
    }
}
