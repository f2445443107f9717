use super::types::{Mate, MateParameters, MateReference, MateStatus, MateType};
use super::{overconstrained_components, RIGID_BODY_DOF};
use crate::error::{MateError, MateResult};
use crate::ids::{ComponentId, MateId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// Two mates on the same component pair that can never hold together
    Incompatible,
    /// A component referenced by more mates than it has degrees of freedom
    Overconstrained,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MateConflict {
    pub mate_ids: Vec<MateId>,
    pub conflict_type: ConflictKind,
    pub description: String,
}

/// Registry of all mates in an assembly, indexed by the components they touch.
///
/// Mates iterate in insertion order. The component index is derived state and
/// is rebuilt rather than stored when serialized.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(try_from = "ManagerSnapshot", into = "ManagerSnapshot")]
pub struct MateManager {
    mates: HashMap<MateId, Mate>,
    order: Vec<MateId>,
    component_index: HashMap<ComponentId, Vec<MateId>>,
}

#[derive(Serialize, Deserialize)]
struct ManagerSnapshot {
    mates: Vec<Mate>,
}

impl TryFrom<ManagerSnapshot> for MateManager {
    type Error = MateError;

    fn try_from(snapshot: ManagerSnapshot) -> Result<Self, Self::Error> {
        let mut manager = MateManager::new();
        for mate in snapshot.mates {
            manager.insert_mate(mate)?;
        }
        Ok(manager)
    }
}

impl From<MateManager> for ManagerSnapshot {
    fn from(mut manager: MateManager) -> Self {
        let mates = manager
            .order
            .iter()
            .filter_map(|id| manager.mates.remove(id))
            .collect();
        Self { mates }
    }
}

impl MateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates, validates and registers a new mate.
    pub fn create_mate(
        &mut self,
        mate_type: MateType,
        reference1: MateReference,
        reference2: MateReference,
        parameters: MateParameters,
    ) -> MateResult<Mate> {
        let mate = Mate::new(mate_type, reference1, reference2, parameters)?;
        self.insert_mate(mate.clone())?;
        Ok(mate)
    }

    /// Registers an already-built mate, e.g. one restored from a document.
    pub fn insert_mate(&mut self, mate: Mate) -> MateResult<()> {
        mate.check()?;
        if self.mates.contains_key(&mate.mate_id) {
            return Err(MateError::DuplicateMate(mate.mate_id));
        }

        for component_id in mate.component_ids() {
            let entries = self.component_index.entry(component_id.clone()).or_default();
            entries.push(mate.mate_id.clone());
            if entries.len() == RIGID_BODY_DOF + 1 {
                warn!(
                    "Component '{}' now has {} mates; it may be over-constrained",
                    component_id,
                    entries.len()
                );
            }
        }

        debug!("Registered {} mate '{}' ({})", mate.mate_type, mate.name, mate.mate_id);
        self.order.push(mate.mate_id.clone());
        self.mates.insert(mate.mate_id.clone(), mate);
        Ok(())
    }

    /// Removes a mate and its index entries. Returns whether it existed.
    pub fn delete_mate(&mut self, mate_id: &MateId) -> bool {
        let Some(mate) = self.mates.remove(mate_id) else {
            return false;
        };

        for component_id in mate.component_ids() {
            if let Some(entries) = self.component_index.get_mut(component_id) {
                entries.retain(|id| id != mate_id);
                if entries.is_empty() {
                    self.component_index.remove(component_id);
                }
            }
        }
        self.order.retain(|id| id != mate_id);
        debug!("Deleted mate '{}'", mate_id);
        true
    }

    /// Removes every mate touching `component_id`, returning them in insertion order.
    pub fn delete_mates_for_component(&mut self, component_id: &ComponentId) -> Vec<Mate> {
        let ids = self.component_index.get(component_id).cloned().unwrap_or_default();
        let removed: Vec<Mate> = ids.iter().filter_map(|id| self.mates.get(id).cloned()).collect();
        for id in &ids {
            self.delete_mate(id);
        }
        removed
    }

    pub fn get_mate(&self, mate_id: &MateId) -> Option<&Mate> {
        self.mates.get(mate_id)
    }

    /// All mates touching `component_id`, in insertion order.
    pub fn get_mates_for_component(&self, component_id: &ComponentId) -> Vec<&Mate> {
        self.component_index
            .get(component_id)
            .map(|ids| ids.iter().filter_map(|id| self.mates.get(id)).collect())
            .unwrap_or_default()
    }

    /// All mates in insertion order.
    pub fn mates(&self) -> impl Iterator<Item = &Mate> {
        self.order.iter().filter_map(|id| self.mates.get(id))
    }

    /// Owned copy of all mates in insertion order, as the solver takes them.
    pub fn to_vec(&self) -> Vec<Mate> {
        self.mates().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.mates.clear();
        self.order.clear();
        self.component_index.clear();
    }

    /// Replaces a mate's parameters after checking them against its type.
    pub fn update_parameters(&mut self, mate_id: &MateId, parameters: MateParameters) -> MateResult<()> {
        let mate = self
            .mates
            .get_mut(mate_id)
            .ok_or_else(|| MateError::MateNotFound(mate_id.clone()))?;
        let mut updated = mate.clone();
        updated.parameters = parameters;
        updated.check()?;
        *mate = updated;
        Ok(())
    }

    /// Re-checks a mate's structure and records the outcome in its status.
    pub fn validate_mate(mate: &mut Mate) -> bool {
        match mate.check() {
            Ok(()) => {
                mate.status = MateStatus::Ok;
                true
            }
            Err(e) => {
                debug!("Mate '{}' failed validation: {}", mate.mate_id, e);
                mate.status = MateStatus::Error;
                false
            }
        }
    }

    /// Validates a registered mate in place.
    pub fn validate(&mut self, mate_id: &MateId) -> MateResult<bool> {
        let mate = self
            .mates
            .get_mut(mate_id)
            .ok_or_else(|| MateError::MateNotFound(mate_id.clone()))?;
        Ok(Self::validate_mate(mate))
    }

    /// Pairs of mates on the same two components whose types contradict each
    /// other (coincident with distance, parallel with perpendicular). Each pair
    /// appears once, ordered by insertion.
    pub fn get_mate_conflicts(&self) -> Vec<MateConflict> {
        let mut by_pair: HashMap<(&ComponentId, &ComponentId), Vec<&Mate>> = HashMap::new();
        let mut conflicts = Vec::new();

        for mate in self.mates() {
            let earlier = by_pair.entry(mate.component_pair()).or_default();
            for other in earlier.iter() {
                if other.mate_type.is_incompatible_with(&mate.mate_type) {
                    conflicts.push(MateConflict {
                        mate_ids: vec![other.mate_id.clone(), mate.mate_id.clone()],
                        conflict_type: ConflictKind::Incompatible,
                        description: format!(
                            "{} and {} mates between '{}' and '{}' are incompatible",
                            other.mate_type,
                            mate.mate_type,
                            mate.reference1.component_id,
                            mate.reference2.component_id
                        ),
                    });
                }
            }
            earlier.push(mate);
        }

        for (component_id, count) in self.overconstrained_components() {
            warn!(
                "Component '{}' is referenced by {} mates; it may be over-constrained",
                component_id, count
            );
        }

        conflicts
    }

    /// Components touched by more than [`RIGID_BODY_DOF`] distinct mates.
    pub fn overconstrained_components(&self) -> Vec<(ComponentId, usize)> {
        overconstrained_components(self.mates())
    }

    /// Recomputes every mate's status: `ERROR` for structurally invalid mates,
    /// `CONFLICT` for incompatible pairs, `WARNING` for mates on over-constrained
    /// components and `OK` otherwise. Returns the conflicts and advisories found.
    pub fn refresh_statuses(&mut self) -> Vec<MateConflict> {
        let mut conflicts = self.get_mate_conflicts();
        let conflicting: HashSet<MateId> = conflicts.iter().flat_map(|c| c.mate_ids.iter().cloned()).collect();

        let mut warned = HashSet::new();
        for (component_id, count) in self.overconstrained_components() {
            let mate_ids = self.component_index.get(&component_id).cloned().unwrap_or_default();
            warned.extend(mate_ids.iter().cloned());
            conflicts.push(MateConflict {
                mate_ids,
                conflict_type: ConflictKind::Overconstrained,
                description: format!(
                    "Component '{}' has {} mates but only {} degrees of freedom",
                    component_id, count, RIGID_BODY_DOF
                ),
            });
        }

        for id in &self.order {
            let Some(mate) = self.mates.get_mut(id) else { continue };
            if !Self::validate_mate(mate) {
                continue;
            }
            if conflicting.contains(id) {
                mate.status = MateStatus::Conflict;
            } else if warned.contains(id) {
                mate.status = MateStatus::Warning;
            }
        }

        conflicts
    }

    pub fn to_value(&self) -> MateResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: serde_json::Value) -> MateResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> MateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> MateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
