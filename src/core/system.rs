//! In-memory star system model.
//!
//! `SystemMap` accumulates scanned bodies for the current system, tracks
//! the root stars, and resolves absolute body positions by composing each
//! body's orbital offset with its parent chain. All queries are computed
//! fresh from the mapping, so a body whose parent arrives later slots
//! into the hierarchy as soon as the parent is scanned.

use std::collections::HashMap;

use tracing::{debug, info};

use super::body::{BodyKind, CelestialBody};
use super::journal::JournalEvent;
use super::kepler;

/// Parent-chain depth cap. Real systems nest a handful of levels; this
/// only guards against a cyclic parent reference in corrupt data.
const MAX_PARENT_DEPTH: usize = 32;

/// The body mapping and system identity for the current session.
#[derive(Debug, Default)]
pub struct SystemMap {
    bodies: HashMap<u64, CelestialBody>,
    stars: Vec<u64>,
    system_name: Option<String>,
    system_address: u64,
}

impl SystemMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one journal event to the model.
    ///
    /// Scans create or replace bodies; a system-identity event with a new
    /// address clears the mapping so bodies from the previous system do
    /// not linger in the view.
    pub fn apply(&mut self, event: JournalEvent) {
        match event {
            JournalEvent::Scan(scan) => {
                let body = scan.into_body();
                debug!(id = body.id, name = %body.name, kind = body.kind.label(), "scan applied");
                if body.kind == BodyKind::Star && !self.stars.contains(&body.id) {
                    self.stars.push(body.id);
                }
                self.bodies.insert(body.id, body);
            }
            JournalEvent::SystemChange(system) => {
                if system.system_address != self.system_address {
                    info!(system = %system.star_system, "entered new system, clearing bodies");
                    self.bodies.clear();
                    self.stars.clear();
                    self.system_address = system.system_address;
                }
                self.system_name = Some(system.star_system);
            }
        }
    }

    /// Look up a body by id.
    pub fn body(&self, id: u64) -> Option<&CelestialBody> {
        self.bodies.get(&id)
    }

    /// Number of known bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Name of the current system, if a system-identity event was seen.
    pub fn system_name(&self) -> Option<&str> {
        self.system_name.as_deref()
    }

    /// Iterate over all known bodies in unspecified order.
    pub fn bodies(&self) -> impl Iterator<Item = &CelestialBody> {
        self.bodies.values()
    }

    /// Bodies shown at the top level of the selection tree: root stars
    /// first (by id), then non-star roots and bodies whose parent has
    /// not been scanned yet. The latter re-home automatically once
    /// their parent appears.
    pub fn top_level(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .stars
            .iter()
            .copied()
            .filter(|id| {
                self.bodies
                    .get(id)
                    .is_some_and(|b| b.is_root() || !self.parent_known(b))
            })
            .collect();
        ids.sort_unstable();

        let mut rest: Vec<&CelestialBody> = self
            .bodies
            .values()
            .filter(|b| {
                b.kind != BodyKind::Star && (b.is_root() || !self.parent_known(b))
            })
            .collect();
        rest.sort_by_key(|b| b.id);

        ids.extend(rest.iter().map(|b| b.id));
        ids
    }

    /// Children of a body, ordered by orbital distance.
    ///
    /// Id 0 marks a root parent, not a body, so it has no children.
    pub fn children_of(&self, id: u64) -> Vec<&CelestialBody> {
        if id == 0 {
            return Vec::new();
        }
        let mut children: Vec<&CelestialBody> = self
            .bodies
            .values()
            .filter(|b| b.parent == Some(id))
            .collect();
        children.sort_by(|a, b| {
            a.elements
                .semi_major_axis
                .total_cmp(&b.elements.semi_major_axis)
                .then(a.id.cmp(&b.id))
        });
        children
    }

    fn parent_known(&self, body: &CelestialBody) -> bool {
        body.parent
            .is_some_and(|parent| self.bodies.contains_key(&parent))
    }

    /// Resolve a body's absolute position.
    ///
    /// `origin` is the pan-adjusted canvas centre, `scale` the current
    /// metres-to-pixels factor (base scale times zoom). Roots anchor at
    /// the origin; a missing body or unresolved parent falls back to the
    /// origin instead of failing. Side-effect free: repeated calls with
    /// unchanged inputs yield identical coordinates.
    pub fn resolve_position(
        &self,
        id: u64,
        origin: (f64, f64),
        elapsed_secs: f64,
        scale: f64,
    ) -> (f64, f64) {
        self.resolve_depth(id, origin, elapsed_secs, scale, 0)
    }

    fn resolve_depth(
        &self,
        id: u64,
        origin: (f64, f64),
        elapsed_secs: f64,
        scale: f64,
        depth: usize,
    ) -> (f64, f64) {
        if depth >= MAX_PARENT_DEPTH {
            return origin;
        }
        let Some(body) = self.bodies.get(&id) else {
            return origin;
        };

        let anchor = match body.parent {
            None | Some(0) => return origin,
            Some(parent) if self.bodies.contains_key(&parent) => {
                self.resolve_depth(parent, origin, elapsed_secs, scale, depth + 1)
            }
            Some(_) => origin,
        };

        let (dx, dy) = kepler::orbital_offset(&body.elements, elapsed_secs);
        (anchor.0 + dx * scale, anchor.1 + dy * scale)
    }
}
