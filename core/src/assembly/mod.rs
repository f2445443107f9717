//! Flat component table for an assembly.
//!
//! Components live in one map keyed by id. Hierarchy is expressed through
//! `parent` ids only, so there are no back-references to keep in sync and the
//! whole table serializes as plain data.

use crate::error::{MateError, MateResult};
use crate::geometry::ComponentTransform;
use crate::ids::ComponentId;
use crate::mates::MateManager;
use crate::solver::{GeometryResolver, MateSolver, SolveResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    #[serde(default)]
    pub transform: ComponentTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ComponentId>,
}

impl Component {
    pub fn new(id: impl Into<ComponentId>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            transform: ComponentTransform::identity(),
            parent: None,
        }
    }

    pub fn with_transform(mut self, transform: ComponentTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn at(self, x: f64, y: f64, z: f64) -> Self {
        self.with_transform(ComponentTransform::from_position(x, y, z))
    }
}

/// Components, the fixed set and the mate registry of one assembly document.
///
/// Loading goes through the same checks as editing: keys must match component
/// ids, parents and fixed ids must exist and the hierarchy must be acyclic.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(try_from = "AssemblySnapshot", into = "AssemblySnapshot")]
pub struct Assembly {
    pub components: HashMap<ComponentId, Component>,
    pub fixed: HashSet<ComponentId>,
    pub mates: MateManager,
}

#[derive(Serialize, Deserialize)]
struct AssemblySnapshot {
    components: HashMap<ComponentId, Component>,
    #[serde(default)]
    fixed: HashSet<ComponentId>,
    #[serde(default)]
    mates: MateManager,
}

impl TryFrom<AssemblySnapshot> for Assembly {
    type Error = MateError;

    fn try_from(snapshot: AssemblySnapshot) -> Result<Self, Self::Error> {
        let mut assembly = Assembly::new();
        let mut entries: Vec<(ComponentId, Component)> = snapshot.components.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        // Parents are linked in a second pass so declaration order does not matter.
        let mut links = Vec::new();
        for (key, mut component) in entries {
            if key != component.id {
                return Err(MateError::ComponentKeyMismatch { key, id: component.id });
            }
            if let Some(parent) = component.parent.take() {
                links.push((component.id.clone(), parent));
            }
            assembly.add_component(component)?;
        }
        for (child, parent) in links {
            assembly.set_parent(&child, Some(parent))?;
        }

        for id in &snapshot.fixed {
            assembly.set_fixed(id, true)?;
        }
        assembly.mates = snapshot.mates;
        Ok(assembly)
    }
}

impl From<Assembly> for AssemblySnapshot {
    fn from(assembly: Assembly) -> Self {
        Self {
            components: assembly.components,
            fixed: assembly.fixed,
            mates: assembly.mates,
        }
    }
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, component: Component) -> MateResult<()> {
        if self.components.contains_key(&component.id) {
            return Err(MateError::DuplicateComponent(component.id));
        }
        if let Some(parent) = &component.parent {
            if !self.components.contains_key(parent) {
                return Err(MateError::UnknownComponent(parent.clone()));
            }
        }
        self.components.insert(component.id.clone(), component);
        Ok(())
    }

    /// Removes a component together with every mate touching it. Its children
    /// become roots.
    pub fn remove_component(&mut self, id: &ComponentId) -> Option<Component> {
        let removed = self.components.remove(id)?;
        self.fixed.remove(id);
        let dropped = self.mates.delete_mates_for_component(id);
        for child in self.components.values_mut() {
            if child.parent.as_ref() == Some(id) {
                child.parent = None;
            }
        }
        debug!("Removed component '{}' and {} mate(s)", id, dropped.len());
        Some(removed)
    }

    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Re-parents `child`. Rejects unknown ids and any change that would make a
    /// component its own ancestor.
    pub fn set_parent(&mut self, child: &ComponentId, parent: Option<ComponentId>) -> MateResult<()> {
        if !self.components.contains_key(child) {
            return Err(MateError::UnknownComponent(child.clone()));
        }
        if let Some(parent_id) = &parent {
            if !self.components.contains_key(parent_id) {
                return Err(MateError::UnknownComponent(parent_id.clone()));
            }
            // A walk longer than the table means the existing hierarchy already loops.
            let mut cursor = Some(parent_id);
            let mut steps = 0;
            while let Some(id) = cursor {
                if id == child || steps > self.components.len() {
                    return Err(MateError::ParentCycle {
                        child: child.clone(),
                        parent: parent_id.clone(),
                    });
                }
                steps += 1;
                cursor = self.components.get(id).and_then(|c| c.parent.as_ref());
            }
        }
        if let Some(component) = self.components.get_mut(child) {
            component.parent = parent;
        }
        Ok(())
    }

    /// Direct children of `id`, sorted by id.
    pub fn children(&self, id: &ComponentId) -> Vec<&ComponentId> {
        let mut children: Vec<&ComponentId> = self
            .components
            .values()
            .filter(|c| c.parent.as_ref() == Some(id))
            .map(|c| &c.id)
            .collect();
        children.sort();
        children
    }

    /// Components without a parent, sorted by id.
    pub fn roots(&self) -> Vec<&ComponentId> {
        let mut roots: Vec<&ComponentId> = self
            .components
            .values()
            .filter(|c| c.parent.is_none())
            .map(|c| &c.id)
            .collect();
        roots.sort();
        roots
    }

    pub fn set_fixed(&mut self, id: &ComponentId, fixed: bool) -> MateResult<()> {
        if !self.components.contains_key(id) {
            return Err(MateError::UnknownComponent(id.clone()));
        }
        if fixed {
            self.fixed.insert(id.clone());
        } else {
            self.fixed.remove(id);
        }
        Ok(())
    }

    pub fn is_fixed(&self, id: &ComponentId) -> bool {
        self.fixed.contains(id)
    }

    /// Runs `solver` over this assembly. Nothing is modified; see [`apply_result`](Self::apply_result).
    pub fn solve<R: GeometryResolver>(&self, solver: &MateSolver<R>) -> SolveResult {
        solver.solve(&self.components, &self.mates.to_vec(), &self.fixed)
    }

    /// Writes solved poses back onto the components. Ids absent from the
    /// assembly are ignored. Returns how many components were updated.
    pub fn apply_result(&mut self, result: &SolveResult) -> usize {
        let mut updated = 0;
        for (id, transform) in &result.component_transforms {
            if let Some(component) = self.components.get_mut(id) {
                component.transform = *transform;
                updated += 1;
            }
        }
        updated
    }
}
