//! Mate data model and registry.

pub mod manager;
pub mod types;

#[cfg(test)]
mod tests_manager;

pub use manager::{ConflictKind, MateConflict, MateManager};
pub use types::{Mate, MateKind, MateParameters, MateReference, MateStatus, MateType, ParameterValue, ReferenceType};

use crate::ids::{ComponentId, MateId};
use std::collections::{HashMap, HashSet};

/// Degrees of freedom of a free rigid body.
pub const RIGID_BODY_DOF: usize = 6;

/// Components referenced by more distinct mates than a rigid body has DOF,
/// with their mate counts, sorted by component id. Advisory only.
pub fn overconstrained_components<'a, I>(mates: I) -> Vec<(ComponentId, usize)>
where
    I: IntoIterator<Item = &'a Mate>,
{
    let mut per_component: HashMap<&ComponentId, HashSet<&MateId>> = HashMap::new();
    for mate in mates {
        for component_id in mate.component_ids() {
            per_component.entry(component_id).or_default().insert(&mate.mate_id);
        }
    }

    let mut over: Vec<(ComponentId, usize)> = per_component
        .into_iter()
        .filter(|(_, ids)| ids.len() > RIGID_BODY_DOF)
        .map(|(id, ids)| (id.clone(), ids.len()))
        .collect();
    over.sort();
    over
}
