//! Journal event parsing.
//!
//! The game writes a line-delimited JSON journal; every line is one event
//! object carrying an `event` discriminator. This module parses the lines
//! the orrery cares about (`Scan` plus the system-identity events) into
//! typed records and converts journal units (degrees) to internal units
//! (radians).

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::Deserialize;
use thiserror::Error;

use super::body::{BodyKind, CelestialBody, OrbitalElements};

/// Errors that can occur while parsing a journal line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON syntax error
    #[error("Invalid JSON syntax: {0}")]
    JsonSyntax(#[from] serde_json::Error),

    /// The line is valid JSON but carries no `event` discriminator
    #[error("Missing `event` discriminator field")]
    MissingEvent,
}

/// A journal event relevant to the orrery.
#[derive(Debug, Clone)]
pub enum JournalEvent {
    /// A celestial body was scanned
    Scan(ScanEvent),
    /// The player arrived in (or loaded into) a star system
    SystemChange(SystemEvent),
}

/// A `Scan` event: one discovered celestial body.
///
/// Numeric fields the journal omits default to zero, string fields to
/// empty; a scan is never rejected for missing data.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanEvent {
    #[serde(rename = "BodyID", default)]
    pub body_id: u64,
    #[serde(rename = "BodyName", default)]
    pub body_name: String,
    /// Present only for stars; its presence is what classifies the body
    #[serde(rename = "StarType", default)]
    pub star_type: Option<String>,
    /// Ancestry descriptors, nearest first (e.g. `[{"Planet":2},{"Star":0}]`)
    #[serde(rename = "Parents", default)]
    pub parents: Vec<HashMap<String, u64>>,
    #[serde(rename = "SemiMajorAxis", default)]
    pub semi_major_axis: f64,
    #[serde(rename = "Eccentricity", default)]
    pub eccentricity: f64,
    /// Degrees in the journal
    #[serde(rename = "OrbitalInclination", default)]
    pub orbital_inclination: f64,
    #[serde(rename = "OrbitalPeriod", default)]
    pub orbital_period: f64,
    /// Degrees in the journal
    #[serde(rename = "AscendingNode", default)]
    pub ascending_node: f64,
    /// Degrees in the journal
    #[serde(rename = "MeanAnomaly", default)]
    pub mean_anomaly: f64,
    #[serde(rename = "Radius", default)]
    pub radius: f64,
    #[serde(rename = "StellarMass", default)]
    pub stellar_mass: f64,
    #[serde(rename = "MassEM", default)]
    pub mass_em: f64,
    #[serde(rename = "DistanceFromArrivalLS", default)]
    pub distance_from_arrival: f64,
    #[serde(rename = "PlanetClass", default)]
    pub planet_class: String,
    #[serde(rename = "SurfaceTemperature", default)]
    pub surface_temperature: f64,
    #[serde(rename = "SurfaceGravity", default)]
    pub surface_gravity: f64,
    #[serde(rename = "AtmosphereType", default)]
    pub atmosphere_type: String,
    #[serde(rename = "TerraformState", default)]
    pub terraform_state: String,
    #[serde(rename = "Landable", default)]
    pub landable: bool,
}

/// A system-identity event (`FSDJump` or `Location`).
#[derive(Debug, Clone, Deserialize)]
pub struct SystemEvent {
    #[serde(rename = "StarSystem", default)]
    pub star_system: String,
    #[serde(rename = "SystemAddress", default)]
    pub system_address: u64,
}

impl ScanEvent {
    /// Resolve the immediate parent from the ancestry descriptors.
    ///
    /// Descriptors are listed nearest-first. `Null` entries are
    /// barycentres the journal never scans, so the nearest scannable
    /// ancestor is preferred; if every ancestor is a barycentre the
    /// nearest one's id is kept and position resolution falls back to
    /// the system origin for it.
    pub fn parent_id(&self) -> Option<u64> {
        self.parents
            .iter()
            .find_map(|descriptor| {
                descriptor
                    .iter()
                    .find(|(kind, _)| kind.as_str() != "Null")
                    .map(|(_, id)| *id)
            })
            .or_else(|| self.parents.first().and_then(|d| d.values().next().copied()))
    }

    /// Classify the body: a stellar type means a star, a planet ancestor
    /// means a moon, anything else is a planet.
    pub fn kind(&self) -> BodyKind {
        if self.star_type.is_some() {
            return BodyKind::Star;
        }
        let nearest_is_planet = self
            .parents
            .first()
            .is_some_and(|d| d.contains_key("Planet"));
        if nearest_is_planet {
            BodyKind::Moon
        } else {
            BodyKind::Planet
        }
    }

    /// Convert this scan into a [`CelestialBody`] record.
    pub fn into_body(self) -> CelestialBody {
        let kind = self.kind();
        let parent = self.parent_id();
        let mass = if kind == BodyKind::Star {
            self.stellar_mass
        } else {
            self.mass_em
        };
        CelestialBody {
            id: self.body_id,
            name: self.body_name,
            kind,
            parent,
            elements: OrbitalElements {
                semi_major_axis: self.semi_major_axis,
                eccentricity: self.eccentricity,
                inclination: deg_to_rad(self.orbital_inclination),
                ascending_node: deg_to_rad(self.ascending_node),
                mean_anomaly: deg_to_rad(self.mean_anomaly),
                period: self.orbital_period,
            },
            radius: self.radius,
            mass,
            distance_ls: self.distance_from_arrival,
            class: self.planet_class,
            surface_temp: self.surface_temperature,
            surface_gravity: self.surface_gravity,
            atmosphere: self.atmosphere_type,
            terraform_state: self.terraform_state,
            landable: self.landable,
        }
    }
}

/// Convert journal degrees to internal radians.
fn deg_to_rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Parse one journal line.
///
/// Returns `Ok(None)` for blank lines and for event types the orrery
/// does not track. Malformed JSON and lines without an `event` field
/// are errors; the watcher logs and skips them.
pub fn parse_line(line: &str) -> Result<Option<JournalEvent>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(line)?;
    let event = value
        .get("event")
        .and_then(|e| e.as_str())
        .ok_or(ParseError::MissingEvent)?
        .to_owned();

    match event.as_str() {
        "Scan" => Ok(Some(JournalEvent::Scan(serde_json::from_value(value)?))),
        "FSDJump" | "Location" => Ok(Some(JournalEvent::SystemChange(serde_json::from_value(
            value,
        )?))),
        _ => Ok(None),
    }
}
