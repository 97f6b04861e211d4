//! Listener, source, receiver and emitter geometry.

use std::fmt;

use glam::DVec3;
use serde::Serialize;

use super::field::{bind_all, take_required, FieldDescriptor, Slot};
use crate::container::{Array, Container};
use crate::util::Result;

/// The four audio objects of a SOFA file. The role name is the prefix of
/// every variable describing it (`ListenerPosition`, `SourceUp`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Listener,
    Source,
    Receiver,
    Emitter,
}

impl Role {
    /// All roles in read order.
    pub const ALL: [Role; 4] = [Role::Listener, Role::Source, Role::Receiver, Role::Emitter];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Listener => "Listener",
            Self::Source => "Source",
            Self::Receiver => "Receiver",
            Self::Emitter => "Emitter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coordinate system named by the `Type` attribute of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateSystem {
    Cartesian,
    /// Azimuth and elevation in degrees, radius in the position units.
    Spherical,
    Other,
}

impl CoordinateSystem {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "cartesian" => Self::Cartesian,
            "spherical" => Self::Spherical,
            _ => Self::Other,
        }
    }
}

#[derive(Default)]
struct GeometryDraft {
    position: Option<Array>,
    position_type: Option<String>,
    position_units: Option<String>,
    description: Option<String>,
    view: Option<Array>,
    up: Option<Array>,
}

static GEOMETRY_FIELDS: &[FieldDescriptor<GeometryDraft>] = &[
    FieldDescriptor::dataset("Position", "position", true, |d| Slot::Array(&mut d.position)),
    FieldDescriptor::attribute("Position", "Type", "position_type", true, |d| {
        Slot::Text(&mut d.position_type)
    }),
    FieldDescriptor::attribute("Position", "Units", "position_units", true, |d| {
        Slot::Text(&mut d.position_units)
    }),
    FieldDescriptor::dataset("Description", "description", false, |d| {
        Slot::Text(&mut d.description)
    }),
    FieldDescriptor::dataset("View", "view", false, |d| Slot::Array(&mut d.view)),
    FieldDescriptor::dataset("Up", "up", false, |d| Slot::Array(&mut d.up)),
];

/// Position and orientation of one audio object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Geometry {
    role: Role,
    position: Array,
    position_type: String,
    position_units: String,
    description: Option<String>,
    view: Option<Array>,
    up: Option<Array>,
}

impl Geometry {
    /// Read the geometry of `role` from an open container.
    pub fn read(role: Role, container: &dyn Container) -> Result<Self> {
        let prefix = role.name();
        let mut draft = GeometryDraft::default();
        bind_all(&mut draft, container, prefix, GEOMETRY_FIELDS)?;

        let geometry = Self {
            role,
            position: take_required(draft.position, || GEOMETRY_FIELDS[0].location(prefix))?,
            position_type: take_required(draft.position_type, || GEOMETRY_FIELDS[1].location(prefix))?,
            position_units: take_required(draft.position_units, || GEOMETRY_FIELDS[2].location(prefix))?,
            description: draft.description,
            view: draft.view,
            up: draft.up,
        };
        tracing::debug!(%role, count = geometry.len(), "read geometry");
        Ok(geometry)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Raw position array, usually `[M, 3]` or `[I, 3]`.
    pub fn position(&self) -> &Array {
        &self.position
    }

    /// `Type` attribute of the position, e.g. `cartesian`.
    pub fn position_type(&self) -> &str {
        &self.position_type
    }

    /// `Units` attribute of the position, e.g. `metre`.
    pub fn position_units(&self) -> &str {
        &self.position_units
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn view(&self) -> Option<&Array> {
        self.view.as_ref()
    }

    pub fn up(&self) -> Option<&Array> {
        self.up.as_ref()
    }

    /// Number of positions (outer extent of the position array).
    pub fn len(&self) -> usize {
        self.position.outer_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        CoordinateSystem::parse(&self.position_type)
    }

    /// Positions as stored, one vector per row.
    pub fn positions(&self) -> Vec<DVec3> {
        to_vectors(&self.position)
    }

    /// Positions converted to cartesian coordinates.
    ///
    /// Spherical rows are `(azimuth deg, elevation deg, radius)`; any other
    /// coordinate system is returned unchanged.
    pub fn cartesian_positions(&self) -> Vec<DVec3> {
        let positions = self.positions();
        match self.coordinate_system() {
            CoordinateSystem::Spherical => positions.into_iter().map(spherical_to_cartesian).collect(),
            _ => positions,
        }
    }

    pub fn view_vectors(&self) -> Option<Vec<DVec3>> {
        self.view.as_ref().map(to_vectors)
    }

    pub fn up_vectors(&self) -> Option<Vec<DVec3>> {
        self.up.as_ref().map(to_vectors)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.len(), self.role)
    }
}

fn to_vectors(array: &Array) -> Vec<DVec3> {
    array
        .rows()
        .map(|r| {
            let c = |i: usize| r.get(i).copied().unwrap_or(0.0);
            DVec3::new(c(0), c(1), c(2))
        })
        .collect()
}

/// Convert `(azimuth deg, elevation deg, radius)` to cartesian.
pub fn spherical_to_cartesian(v: DVec3) -> DVec3 {
    let (az, el, r) = (v.x.to_radians(), v.y.to_radians(), v.z);
    DVec3::new(r * el.cos() * az.cos(), r * el.cos() * az.sin(), r * el.sin())
}
