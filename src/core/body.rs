//! Celestial body data structures.
//!
//! This module defines the in-memory representation of scanned bodies:
//! their classification, orbital elements, and the descriptive fields
//! shown in the selection tree.

use serde::{Deserialize, Serialize};

/// Classification of a celestial body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// A star (the scan carried a stellar type)
    Star,
    /// A planet orbiting a star or barycentre
    Planet,
    /// A moon (nearest ancestor is itself a planet)
    Moon,
}

impl BodyKind {
    /// Display label for the selection tree.
    pub fn label(&self) -> &'static str {
        match self {
            BodyKind::Star => "Star",
            BodyKind::Planet => "Planet",
            BodyKind::Moon => "Moon",
        }
    }
}

/// Keplerian orbital elements describing a body's orbit around its parent.
///
/// Angles are stored in radians; the journal supplies them in degrees and
/// the parser converts on ingest. A period of zero marks a body without a
/// defined orbit (it renders at a fixed position on its orbit circle).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis (metres)
    pub semi_major_axis: f64,
    /// Eccentricity (dimensionless, expected 0 <= e < 1)
    pub eccentricity: f64,
    /// Orbital inclination (radians)
    pub inclination: f64,
    /// Longitude of the ascending node (radians)
    pub ascending_node: f64,
    /// Mean anomaly at scan time (radians)
    pub mean_anomaly: f64,
    /// Orbital period (seconds, may be zero)
    pub period: f64,
}

/// A scanned celestial body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    /// Body identifier, unique within a star system
    pub id: u64,
    /// Display name
    pub name: String,
    /// Star, planet, or moon
    pub kind: BodyKind,
    /// Identifier of the immediate parent body (None or 0 means root)
    pub parent: Option<u64>,
    /// Orbital elements relative to the parent
    pub elements: OrbitalElements,
    /// Body radius (metres), display only
    pub radius: f64,
    /// Mass (stellar masses for stars, Earth masses otherwise), display only
    pub mass: f64,
    /// Distance from the system arrival point (light seconds)
    pub distance_ls: f64,
    /// Planet class description (empty for stars)
    pub class: String,
    /// Surface temperature (K)
    pub surface_temp: f64,
    /// Surface gravity (m/s^2)
    pub surface_gravity: f64,
    /// Atmosphere description
    pub atmosphere: String,
    /// Terraforming state description
    pub terraform_state: String,
    /// Whether the body can be landed on
    pub landable: bool,
}

impl CelestialBody {
    /// Returns true if this body is a root of the system hierarchy.
    ///
    /// The journal encodes "no parent" either as an absent `Parents` list
    /// or as a parent id of 0 (the system barycentre).
    pub fn is_root(&self) -> bool {
        matches!(self.parent, None | Some(0))
    }

    /// Multi-line detail text shown when hovering a body in the tree.
    pub fn detail_text(&self) -> String {
        format!(
            "Class: {}\nRadius: {:.0} km\nMass: {:.2}\nTemperature: {:.1}K\nGravity: {:.1}g\nAtmosphere: {}\nTerraform State: {}\nLandable: {}",
            self.class,
            self.radius / 1000.0,
            self.mass,
            self.surface_temp,
            self.surface_gravity,
            self.atmosphere,
            self.terraform_state,
            if self.landable { "Yes" } else { "No" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body(parent: Option<u64>) -> CelestialBody {
        CelestialBody {
            id: 7,
            name: "Test VII".to_string(),
            kind: BodyKind::Planet,
            parent,
            elements: OrbitalElements::default(),
            radius: 6.3e6,
            mass: 1.0,
            distance_ls: 42.0,
            class: "Rocky body".to_string(),
            surface_temp: 288.0,
            surface_gravity: 9.8,
            atmosphere: "None".to_string(),
            terraform_state: String::new(),
            landable: true,
        }
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(BodyKind::Star.label(), "Star");
        assert_eq!(BodyKind::Planet.label(), "Planet");
        assert_eq!(BodyKind::Moon.label(), "Moon");
    }

    #[test]
    fn test_is_root() {
        assert!(sample_body(None).is_root());
        assert!(sample_body(Some(0)).is_root());
        assert!(!sample_body(Some(1)).is_root());
    }

    #[test]
    fn test_default_elements_are_zero() {
        let elements = OrbitalElements::default();
        assert_eq!(elements.semi_major_axis, 0.0);
        assert_eq!(elements.period, 0.0);
    }

    #[test]
    fn test_detail_text_contains_fields() {
        let body = sample_body(Some(1));
        let text = body.detail_text();
        assert!(text.contains("Rocky body"));
        assert!(text.contains("288.0K"));
        assert!(text.contains("Landable: Yes"));
    }
}
