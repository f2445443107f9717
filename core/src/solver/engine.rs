use super::config::SolverConfig;
use super::metrics;
use super::resolve::{GeometryResolver, PlaceholderResolver};
use super::result::{SolveResult, SolveStatus};
use crate::assembly::Component;
use crate::geometry::transform::POSE_DOF;
use crate::geometry::{ComponentTransform, GeometricEntity};
use crate::ids::{ComponentId, MateId};
use crate::mates::types::{Mate, MateKind};
use crate::mates::overconstrained_components;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, trace, warn};

/// Finite-difference step for position DOFs, in world units.
pub const POSITION_DELTA: f64 = 1e-3;
/// Finite-difference step for rotation DOFs, in degrees.
pub const ROTATION_DELTA: f64 = POSITION_DELTA * 10.0;
/// Stagnation only ends the solve once the error is within this multiple of the tolerance.
const STAGNATION_FACTOR: f64 = 100.0;

/// Iterative gradient-descent solver over component poses.
///
/// Reads components and mates, never mutates them, and returns fresh poses in
/// a [`SolveResult`]. Applying them is up to the caller.
#[derive(Debug, Clone)]
pub struct MateSolver<R: GeometryResolver = PlaceholderResolver> {
    config: SolverConfig,
    resolver: R,
}

impl Default for MateSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl MateSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self::with_resolver(config, PlaceholderResolver)
    }
}

impl<R: GeometryResolver> MateSolver<R> {
    pub fn with_resolver(config: SolverConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Solves `mates` over `components`, keeping every component in `fixed` where it is.
    pub fn solve(
        &self,
        components: &HashMap<ComponentId, Component>,
        mates: &[Mate],
        fixed: &HashSet<ComponentId>,
    ) -> SolveResult {
        if components.is_empty() {
            return SolveResult::failed("No components to solve", HashMap::new());
        }

        let current: HashMap<ComponentId, ComponentTransform> = components
            .iter()
            .map(|(id, component)| (id.clone(), component.transform))
            .collect();

        if mates.is_empty() {
            return SolveResult {
                success: true,
                status: SolveStatus::Success,
                component_transforms: current,
                solved_mates: Vec::new(),
                unsolved_mates: Vec::new(),
                conflicts: Vec::new(),
                iterations: 0,
                error: None,
                final_error: 0.0,
            };
        }

        if let Some(message) = missing_component(components, mates) {
            warn!("{}", message);
            return SolveResult::failed(message, current);
        }

        for (component_id, count) in overconstrained_components(mates) {
            warn!(
                "Component '{}' is referenced by {} mates; it may be over-constrained",
                component_id, count
            );
        }

        let problem = match Problem::build(components, mates, fixed, &self.resolver) {
            Ok(problem) => problem,
            Err(conflicts) => {
                let message = format!("{} mate(s) have invalid definitions", conflicts.len());
                warn!("{}", message);
                let mut result = SolveResult::failed(message, current);
                result.status = SolveStatus::Conflict;
                result.unsolved_mates = conflicts.iter().map(|(id, _)| id.clone()).collect();
                result.conflicts = conflicts;
                return result;
            }
        };

        info!(
            components = problem.ids.len(),
            movable = problem.movable.len(),
            mates = problem.mates.len(),
            "Solving assembly mates"
        );

        self.iterate(&problem)
    }

    fn iterate(&self, problem: &Problem) -> SolveResult {
        let config = &self.config;
        let step_scale = config.step_scale();

        let mut current = problem.initial.clone();
        let mut best = current.clone();
        let mut best_error = problem.total_error(&current, None);
        let mut converged = false;
        let mut stagnated = false;
        let mut iterations = 0;

        if problem.movable.is_empty() {
            debug!("No movable components; skipping iteration");
        } else {
            for iteration in 0..config.max_iterations {
                iterations = iteration + 1;

                let gradients = if config.parallel_gradients {
                    problem
                        .movable
                        .par_iter()
                        .map(|&slot| (slot, problem.gradient(&current, slot)))
                        .collect::<Vec<_>>()
                } else {
                    problem
                        .movable
                        .iter()
                        .map(|&slot| (slot, problem.gradient(&current, slot)))
                        .collect::<Vec<_>>()
                };

                let mut candidate = current.clone();
                for (slot, gradient) in &gradients {
                    let pose = &mut candidate[*slot];
                    for axis in 0..3 {
                        pose.position[axis] -= step_scale * gradient[axis];
                        pose.rotation[axis] -= step_scale * gradient[axis + 3];
                    }
                }

                let candidate_error = problem.total_error(&candidate, None);
                trace!(iteration, error = candidate_error, "Mate solver step");

                if !candidate_error.is_finite() {
                    warn!("Solver diverged at iteration {}", iterations);
                    break;
                }

                if candidate_error < config.tolerance {
                    best = candidate;
                    best_error = candidate_error;
                    converged = true;
                    break;
                }

                if candidate_error < best_error {
                    best.clone_from(&candidate);
                    best_error = candidate_error;
                }

                let max_step = problem
                    .movable
                    .iter()
                    .map(|&slot| (candidate[slot].position - current[slot].position).norm())
                    .fold(0.0, f64::max);
                current = candidate;

                if max_step < config.min_step && candidate_error < config.tolerance * STAGNATION_FACTOR {
                    stagnated = true;
                    break;
                }
            }
        }

        // Covers the skipped loop: poses that already satisfy the mates count as converged.
        let converged = converged || best_error < config.tolerance;
        let result = self.classify(problem, best, best_error, iterations);
        info!(
            status = ?result.status,
            iterations = result.iterations,
            final_error = result.final_error,
            converged,
            stagnated,
            "Mate solve finished"
        );
        result
    }

    fn classify(
        &self,
        problem: &Problem,
        poses: Vec<ComponentTransform>,
        final_error: f64,
        iterations: usize,
    ) -> SolveResult {
        let threshold = self.config.mate_tolerance();
        let mut solved_mates = Vec::new();
        let mut unsolved_mates = Vec::new();
        let mut conflicts = Vec::new();

        for mate in &problem.mates {
            let error = problem.mate_error(mate, &poses, None);
            if error < threshold {
                solved_mates.push(mate.mate_id.clone());
            } else {
                unsolved_mates.push(mate.mate_id.clone());
                conflicts.push((mate.mate_id.clone(), format!("Error: {:.6}", error)));
            }
        }

        // Every mate within the relaxed threshold is a success even when the
        // total error never dropped below the strict tolerance.
        let status = if unsolved_mates.is_empty() {
            SolveStatus::Success
        } else if !solved_mates.is_empty() {
            SolveStatus::Partial
        } else {
            SolveStatus::Failed
        };

        let error = match status {
            SolveStatus::Success => None,
            _ => Some(format!(
                "{} of {} mates unsatisfied (total error {:.6})",
                unsolved_mates.len(),
                problem.mates.len(),
                final_error
            )),
        };

        let component_transforms = problem.ids.iter().cloned().zip(poses).collect();

        SolveResult {
            success: status == SolveStatus::Success,
            status,
            component_transforms,
            solved_mates,
            unsolved_mates,
            conflicts,
            iterations,
            error,
            final_error,
        }
    }
}

/// Solves with the default resolver. Single entry point for one-off solves.
pub fn solve_assembly(
    components: &HashMap<ComponentId, Component>,
    mates: &[Mate],
    fixed: &HashSet<ComponentId>,
    config: SolverConfig,
) -> SolveResult {
    MateSolver::new(config).solve(components, mates, fixed)
}

fn missing_component(components: &HashMap<ComponentId, Component>, mates: &[Mate]) -> Option<String> {
    mates.iter().find_map(|mate| {
        mate.component_ids()
            .into_iter()
            .find(|id| !components.contains_key(*id))
            .map(|id| format!("Mate '{}' references missing component '{}'", mate.mate_id, id))
    })
}

/// A mate with its references resolved to local geometry and its components
/// mapped to pose slots.
struct PreparedMate {
    mate_id: MateId,
    kind: MateKind,
    slots: [usize; 2],
    local: [GeometricEntity; 2],
}

/// Solver-private working state: poses live in a flat slot table ordered by
/// component id so iteration order is deterministic.
struct Problem {
    ids: Vec<ComponentId>,
    initial: Vec<ComponentTransform>,
    movable: Vec<usize>,
    /// Number of mates touching each slot
    touching: Vec<usize>,
    mates: Vec<PreparedMate>,
}

impl Problem {
    fn build<R: GeometryResolver>(
        components: &HashMap<ComponentId, Component>,
        mates: &[Mate],
        fixed: &HashSet<ComponentId>,
        resolver: &R,
    ) -> Result<Self, Vec<(MateId, String)>> {
        let mut ids: Vec<ComponentId> = components.keys().cloned().collect();
        ids.sort();
        let slot_of: HashMap<&ComponentId, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

        let initial = ids.iter().map(|id| components[id].transform).collect();
        let movable = ids
            .iter()
            .enumerate()
            .filter(|(_, id)| !fixed.contains(*id))
            .map(|(slot, _)| slot)
            .collect();

        let mut touching = vec![0; ids.len()];
        let mut prepared = Vec::with_capacity(mates.len());
        let mut invalid = Vec::new();

        for mate in mates {
            let kind = match mate.check().and_then(|_| mate.kind()) {
                Ok(kind) => kind,
                Err(e) => {
                    invalid.push((mate.mate_id.clone(), e.to_string()));
                    continue;
                }
            };
            // Presence was verified before building.
            let slots = [
                slot_of[&mate.reference1.component_id],
                slot_of[&mate.reference2.component_id],
            ];
            touching[slots[0]] += 1;
            touching[slots[1]] += 1;
            prepared.push(PreparedMate {
                mate_id: mate.mate_id.clone(),
                kind,
                slots,
                local: [resolver.resolve(&mate.reference1), resolver.resolve(&mate.reference2)],
            });
        }

        if !invalid.is_empty() {
            return Err(invalid);
        }

        Ok(Self {
            ids,
            initial,
            movable,
            touching,
            mates: prepared,
        })
    }

    fn pose<'a>(
        poses: &'a [ComponentTransform],
        slot: usize,
        overridden: Option<(usize, &'a ComponentTransform)>,
    ) -> &'a ComponentTransform {
        match overridden {
            Some((s, pose)) if s == slot => pose,
            _ => &poses[slot],
        }
    }

    fn mate_error(
        &self,
        mate: &PreparedMate,
        poses: &[ComponentTransform],
        overridden: Option<(usize, &ComponentTransform)>,
    ) -> f64 {
        let a = mate.local[0].transformed(Self::pose(poses, mate.slots[0], overridden));
        let b = mate.local[1].transformed(Self::pose(poses, mate.slots[1], overridden));
        mate.kind.error(&a, &b)
    }

    /// Total error with one slot optionally replaced by a trial pose.
    fn total_error(&self, poses: &[ComponentTransform], overridden: Option<(usize, &ComponentTransform)>) -> f64 {
        metrics::total_error(self.mates.iter().map(|m| self.mate_error(m, poses, overridden)))
    }

    /// Central-difference gradient of the total error over the 6 pose DOFs of
    /// `slot`, accumulated once per mate touching the component.
    fn gradient(&self, poses: &[ComponentTransform], slot: usize) -> [f64; POSE_DOF] {
        let mut gradient = [0.0; POSE_DOF];
        let touching = self.touching[slot];
        if touching == 0 {
            return gradient;
        }

        let pose = &poses[slot];
        for (dof, g) in gradient.iter_mut().enumerate() {
            let delta = if dof < 3 { POSITION_DELTA } else { ROTATION_DELTA };
            let plus = pose.nudged(dof, delta);
            let minus = pose.nudged(dof, -delta);
            let slope = (self.total_error(poses, Some((slot, &plus))) - self.total_error(poses, Some((slot, &minus))))
                / (2.0 * delta);
            *g = slope * touching as f64;
        }
        gradient
    }
}
