use crate::geometry::ComponentTransform;
use crate::ids::{ComponentId, MateId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Every mate satisfied
    Success,
    /// Some mates satisfied, some not
    Partial,
    /// No mate satisfied, or the input could not be solved at all
    Failed,
    /// A mate carries parameters that do not describe a valid relationship
    Conflict,
    /// Reserved. Over-constraint is reported as a logged advisory and never
    /// changes the status of a solve.
    Overconstrained,
}

/// Outcome of a solve. Never an error: failures are described here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub success: bool,
    pub status: SolveStatus,
    /// Resulting pose of every input component, movable or fixed
    pub component_transforms: HashMap<ComponentId, ComponentTransform>,
    pub solved_mates: Vec<MateId>,
    pub unsolved_mates: Vec<MateId>,
    /// `(mate id, reason)` for every mate left unsatisfied or rejected
    pub conflicts: Vec<(MateId, String)>,
    pub iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub final_error: f64,
}

impl SolveResult {
    pub(crate) fn failed(
        message: impl Into<String>,
        component_transforms: HashMap<ComponentId, ComponentTransform>,
    ) -> Self {
        Self {
            success: false,
            status: SolveStatus::Failed,
            component_transforms,
            solved_mates: Vec::new(),
            unsolved_mates: Vec::new(),
            conflicts: Vec::new(),
            iterations: 0,
            error: Some(message.into()),
            final_error: 0.0,
        }
    }

    pub fn transform(&self, id: &ComponentId) -> Option<&ComponentTransform> {
        self.component_transforms.get(id)
    }

    pub fn is_fully_solved(&self) -> bool {
        self.success && self.unsolved_mates.is_empty()
    }
}
