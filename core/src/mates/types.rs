use crate::error::{MateError, MateResult};
use crate::geometry::GeometricEntity;
use crate::ids::{ComponentId, MateId};
use crate::solver::metrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Kind of feature a mate reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Face,
    Edge,
    Vertex,
    Axis,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Edge => "edge",
            Self::Vertex => "vertex",
            Self::Axis => "axis",
        }
    }
}

impl FromStr for ReferenceType {
    type Err = MateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "face" => Ok(Self::Face),
            "edge" => Ok(Self::Edge),
            "vertex" => Ok(Self::Vertex),
            "axis" => Ok(Self::Axis),
            _ => Err(MateError::InvalidReferenceType(s.to_string())),
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbolic pointer to a feature on a component, e.g. face "3" of "bracket".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MateReference {
    pub component_id: ComponentId,
    pub reference_type: ReferenceType,
    pub reference_id: String,
}

impl MateReference {
    pub fn new(component_id: impl Into<ComponentId>, reference_type: ReferenceType, reference_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            reference_type,
            reference_id: reference_id.into(),
        }
    }

    /// Builds a reference from a textual kind, rejecting anything but face/edge/vertex/axis.
    pub fn parse(component_id: impl Into<ComponentId>, reference_type: &str, reference_id: impl Into<String>) -> MateResult<Self> {
        Ok(Self::new(component_id, reference_type.parse()?, reference_id))
    }

    pub fn face(component_id: impl Into<ComponentId>, reference_id: impl Into<String>) -> Self {
        Self::new(component_id, ReferenceType::Face, reference_id)
    }

    pub fn edge(component_id: impl Into<ComponentId>, reference_id: impl Into<String>) -> Self {
        Self::new(component_id, ReferenceType::Edge, reference_id)
    }

    pub fn vertex(component_id: impl Into<ComponentId>, reference_id: impl Into<String>) -> Self {
        Self::new(component_id, ReferenceType::Vertex, reference_id)
    }

    pub fn axis(component_id: impl Into<ComponentId>, reference_id: impl Into<String>) -> Self {
        Self::new(component_id, ReferenceType::Axis, reference_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MateType {
    Coincident,
    Parallel,
    Perpendicular,
    Distance,
    Angle,
    Tangent,
    Align,
}

impl MateType {
    pub const ALL: [MateType; 7] = [
        MateType::Coincident,
        MateType::Parallel,
        MateType::Perpendicular,
        MateType::Distance,
        MateType::Angle,
        MateType::Tangent,
        MateType::Align,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coincident => "COINCIDENT",
            Self::Parallel => "PARALLEL",
            Self::Perpendicular => "PERPENDICULAR",
            Self::Distance => "DISTANCE",
            Self::Angle => "ANGLE",
            Self::Tangent => "TANGENT",
            Self::Align => "ALIGN",
        }
    }

    /// Title-case label used for generated mate names ("Coincident").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Coincident => "Coincident",
            Self::Parallel => "Parallel",
            Self::Perpendicular => "Perpendicular",
            Self::Distance => "Distance",
            Self::Angle => "Angle",
            Self::Tangent => "Tangent",
            Self::Align => "Align",
        }
    }

    /// Whether two mates of these types on the same component pair can never hold together.
    pub fn is_incompatible_with(&self, other: &MateType) -> bool {
        matches!(
            (self, other),
            (Self::Coincident, Self::Distance)
                | (Self::Distance, Self::Coincident)
                | (Self::Parallel, Self::Perpendicular)
                | (Self::Perpendicular, Self::Parallel)
        )
    }
}

impl FromStr for MateType {
    type Err = MateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MateType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MateError::InvalidMateType(s.to_string()))
    }
}

impl fmt::Display for MateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MateStatus {
    #[default]
    Ok,
    Warning,
    Error,
    Conflict,
}

/// Loosely typed mate parameter as it arrives from a document or UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl ParameterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

pub type MateParameters = HashMap<String, ParameterValue>;

/// A mate's semantics with its parameters already validated.
/// Each variant owns the error metric it is solved against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MateKind {
    Coincident,
    Parallel,
    Perpendicular,
    /// Target distance in world units
    Distance { distance: f64 },
    /// Target angle in degrees
    Angle { angle: f64 },
    Tangent,
    Align,
}

impl MateKind {
    pub fn from_parts(mate_type: MateType, parameters: &MateParameters) -> MateResult<Self> {
        fn number(mate_type: MateType, parameters: &MateParameters, key: &'static str) -> MateResult<f64> {
            let value = parameters.get(key).ok_or(MateError::MissingParameter { mate_type, key })?;
            value.as_f64().ok_or_else(|| MateError::NonNumericParameter { key: key.to_string() })
        }

        Ok(match mate_type {
            MateType::Coincident => Self::Coincident,
            MateType::Parallel => Self::Parallel,
            MateType::Perpendicular => Self::Perpendicular,
            MateType::Distance => Self::Distance { distance: number(mate_type, parameters, "distance")? },
            MateType::Angle => Self::Angle { angle: number(mate_type, parameters, "angle")? },
            MateType::Tangent => Self::Tangent,
            MateType::Align => Self::Align,
        })
    }

    pub fn mate_type(&self) -> MateType {
        match self {
            Self::Coincident => MateType::Coincident,
            Self::Parallel => MateType::Parallel,
            Self::Perpendicular => MateType::Perpendicular,
            Self::Distance { .. } => MateType::Distance,
            Self::Angle { .. } => MateType::Angle,
            Self::Tangent => MateType::Tangent,
            Self::Align => MateType::Align,
        }
    }

    /// Scalar violation of this mate for two world-space entities; zero when satisfied.
    pub fn error(&self, a: &GeometricEntity, b: &GeometricEntity) -> f64 {
        match *self {
            Self::Coincident => metrics::coincident_error(&a.point, &b.point),
            Self::Parallel => metrics::parallel_error(&a.direction, &b.direction),
            Self::Perpendicular => metrics::perpendicular_error(&a.direction, &b.direction),
            Self::Distance { distance } => metrics::distance_error(&a.point, &b.point, distance),
            Self::Angle { angle } => metrics::angle_error(&a.direction, &b.direction, angle),
            Self::Tangent => metrics::tangent_error(a, b),
            Self::Align => metrics::align_error(a, b),
        }
    }
}

/// Declared geometric relationship between features on two different components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MateRecord")]
pub struct Mate {
    pub mate_id: MateId,
    pub mate_type: MateType,
    pub reference1: MateReference,
    pub reference2: MateReference,
    pub parameters: MateParameters,
    pub status: MateStatus,
    pub name: String,
}

/// Unvalidated wire form of a [`Mate`].
#[derive(Deserialize)]
struct MateRecord {
    #[serde(default)]
    mate_id: Option<MateId>,
    mate_type: MateType,
    reference1: MateReference,
    reference2: MateReference,
    #[serde(default)]
    parameters: MateParameters,
    #[serde(default)]
    status: MateStatus,
    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<MateRecord> for Mate {
    type Error = MateError;

    fn try_from(record: MateRecord) -> Result<Self, Self::Error> {
        let mut mate = Mate::new(record.mate_type, record.reference1, record.reference2, record.parameters)?;
        if let Some(id) = record.mate_id {
            mate = mate.with_id(id);
        }
        if let Some(name) = record.name.filter(|n| !n.is_empty()) {
            mate.name = name;
        }
        mate.status = record.status;
        Ok(mate)
    }
}

impl Mate {
    /// Creates a mate with a fresh id and a derived name, validating its structure.
    pub fn new(
        mate_type: MateType,
        reference1: MateReference,
        reference2: MateReference,
        parameters: MateParameters,
    ) -> MateResult<Self> {
        let mate_id = MateId::new();
        let mate = Self {
            name: Self::default_name(mate_type, &mate_id),
            mate_id,
            mate_type,
            reference1,
            reference2,
            parameters,
            status: MateStatus::Ok,
        };
        mate.check()?;
        Ok(mate)
    }

    /// Replaces the id; a name still derived from the old id follows it.
    pub fn with_id(mut self, mate_id: impl Into<MateId>) -> Self {
        let mate_id = mate_id.into();
        if self.name == Self::default_name(self.mate_type, &self.mate_id) {
            self.name = Self::default_name(self.mate_type, &mate_id);
        }
        self.mate_id = mate_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn default_name(mate_type: MateType, mate_id: &MateId) -> String {
        format!("{}_{}", mate_type.label(), mate_id.short())
    }

    /// Structural validation: both references filled in, distinct components,
    /// finite numeric parameters and well-formed type parameters. Geometry is
    /// not consulted.
    pub fn check(&self) -> MateResult<()> {
        for reference in [&self.reference1, &self.reference2] {
            if reference.component_id.as_str().is_empty() {
                return Err(MateError::EmptyReference("component id"));
            }
            if reference.reference_id.is_empty() {
                return Err(MateError::EmptyReference("reference id"));
            }
        }
        if self.reference1.component_id == self.reference2.component_id {
            return Err(MateError::SameComponent(self.reference1.component_id.clone()));
        }
        // JSON has no NaN or infinity, so such values could never be reloaded.
        if let Some(key) = self
            .parameters
            .iter()
            .find(|(_, value)| matches!(value, ParameterValue::Number(v) if !v.is_finite()))
            .map(|(key, _)| key)
        {
            return Err(MateError::NonNumericParameter { key: key.clone() });
        }
        self.kind().map(|_| ())
    }

    pub fn kind(&self) -> MateResult<MateKind> {
        MateKind::from_parts(self.mate_type, &self.parameters)
    }

    pub fn component_ids(&self) -> [&ComponentId; 2] {
        [&self.reference1.component_id, &self.reference2.component_id]
    }

    pub fn involves(&self, component_id: &ComponentId) -> bool {
        self.reference1.component_id == *component_id || self.reference2.component_id == *component_id
    }

    /// Unordered component pair, for comparing mates regardless of reference order.
    pub fn component_pair(&self) -> (&ComponentId, &ComponentId) {
        let (a, b) = (&self.reference1.component_id, &self.reference2.component_id);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn to_value(&self) -> MateResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: serde_json::Value) -> MateResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> MateResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> MateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
