mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::config::LayoutConfig;
use crate::util::stable_pair;

use forces::{
    ChargeParams, LinkParams, accumulate_gravity, accumulate_links, accumulate_pairwise_repulsion,
    accumulate_repulsion_for_node, jitter_direction,
};
use quadtree::QuadNode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum SimulationState {
    Stopped,
    Running { deadline: Option<f64> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum StopReason {
    Manual,
    Budget,
    Cooled,
}

/// Emitted after every integration step.
#[derive(Debug)]
pub(in crate::app) struct TickEvent<'a> {
    pub sequence: u64,
    pub alpha: f32,
    pub positions: &'a [Vec2],
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
    previous: Vec<Vec2>,
    strengths: Vec<f32>,
}

/// Owns node positions and velocities and advances them under repulsion,
/// link springs and gravity. Nothing else writes positions.
pub(in crate::app) struct Simulation {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    charges: Vec<f32>,
    pinned: Vec<bool>,
    links: Vec<(usize, usize)>,
    degrees: Vec<u32>,
    config: LayoutConfig,
    alpha: f32,
    state: SimulationState,
    last_stop: Option<StopReason>,
    ticks: u64,
    scratch: PhysicsScratch,
}

impl Simulation {
    /// Seeds positions deterministically across `config.extent` from each
    /// node's key.
    pub(in crate::app) fn new(
        keys: &[String],
        charges: Vec<f32>,
        links: Vec<(usize, usize)>,
        config: LayoutConfig,
    ) -> Self {
        let half_extent = config.extent * 0.5;
        let positions = keys
            .iter()
            .map(|key| {
                let (x, y) = stable_pair(key);
                vec2(x * half_extent.x, y * half_extent.y)
            })
            .collect::<Vec<_>>();

        Self::with_positions(positions, charges, links, config)
    }

    pub(in crate::app) fn with_positions(
        positions: Vec<Vec2>,
        mut charges: Vec<f32>,
        links: Vec<(usize, usize)>,
        config: LayoutConfig,
    ) -> Self {
        let node_count = positions.len();
        charges.resize(node_count, 0.0);

        let mut degrees = vec![0u32; node_count];
        for &(source, target) in &links {
            if source < node_count && target < node_count && source != target {
                degrees[source] += 1;
                degrees[target] += 1;
            }
        }

        Self {
            velocities: vec![Vec2::ZERO; node_count],
            pinned: vec![false; node_count],
            positions,
            charges,
            links,
            degrees,
            config,
            alpha: 0.0,
            state: SimulationState::Stopped,
            last_stop: None,
            ticks: 0,
            scratch: PhysicsScratch::default(),
        }
    }

    pub(in crate::app) fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub(in crate::app) fn state(&self) -> SimulationState {
        self.state
    }

    pub(in crate::app) fn is_running(&self) -> bool {
        matches!(self.state, SimulationState::Running { .. })
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(in crate::app) fn last_stop(&self) -> Option<StopReason> {
        self.last_stop
    }

    /// Starts the tick loop, or re-seeds it when already running. Positions
    /// are kept either way; alpha and the auto-stop deadline are reset.
    pub(in crate::app) fn start(&mut self, now: f64) {
        let was_running = self.is_running();
        self.alpha = self.config.alpha_start;
        self.state = SimulationState::Running {
            deadline: self.config.auto_stop_secs.map(|budget| now + budget),
        };
        self.last_stop = None;

        if was_running {
            log::debug!("simulation warm restart at t={now:.2}");
        } else {
            log::debug!("simulation started at t={now:.2}");
        }
    }

    /// Reheats a running engine without moving its deadline; starts a
    /// stopped one.
    pub(in crate::app) fn resume(&mut self, now: f64) {
        if self.is_running() {
            self.alpha = self.alpha.max(self.config.alpha_start);
        } else {
            self.start(now);
        }
    }

    pub(in crate::app) fn stop(&mut self) {
        self.halt(StopReason::Manual);
    }

    fn halt(&mut self, reason: StopReason) {
        if !self.is_running() {
            return;
        }
        self.state = SimulationState::Stopped;
        self.last_stop = Some(reason);
        log::debug!("simulation stopped ({reason:?}) after {} ticks", self.ticks);
    }

    /// Replaces every node's charge. Takes effect on the next tick.
    pub(in crate::app) fn set_charges(&mut self, charges: &[f32]) {
        for (slot, &charge) in self.charges.iter_mut().zip(charges) {
            *slot = charge;
        }
    }

    pub(in crate::app) fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    pub(in crate::app) fn pin(&mut self, index: usize, position: Vec2) -> bool {
        if index >= self.positions.len() || !(position.x.is_finite() && position.y.is_finite()) {
            return false;
        }
        if !self.pinned[index] {
            log::debug!("pinned node {index}");
        }
        self.pinned[index] = true;
        self.positions[index] = position;
        self.velocities[index] = Vec2::ZERO;
        true
    }

    pub(in crate::app) fn release(&mut self, index: usize) {
        if let Some(pinned) = self.pinned.get_mut(index)
            && *pinned
        {
            *pinned = false;
            log::debug!("released node {index}");
        }
    }

    pub(in crate::app) fn is_pinned(&self, index: usize) -> bool {
        self.pinned.get(index).copied().unwrap_or(false)
    }

    /// One integration step. Returns `None` without touching positions when
    /// stopped, when the auto-stop deadline has passed, or once alpha cools
    /// below its floor.
    pub(in crate::app) fn tick(&mut self, now: f64) -> Option<TickEvent<'_>> {
        let SimulationState::Running { deadline } = self.state else {
            return None;
        };

        if deadline.is_some_and(|deadline| now >= deadline) {
            self.halt(StopReason::Budget);
            return None;
        }

        self.alpha *= self.config.alpha_decay;
        if self.alpha < self.config.alpha_min {
            self.halt(StopReason::Cooled);
            return None;
        }

        self.step();
        self.ticks += 1;

        Some(TickEvent {
            sequence: self.ticks,
            alpha: self.alpha,
            positions: &self.positions,
        })
    }

    fn step(&mut self) {
        let node_count = self.positions.len();
        if node_count == 0 {
            return;
        }

        let scratch = &mut self.scratch;
        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.previous.clear();
        scratch.previous.extend_from_slice(&self.positions);
        scratch.strengths.clear();
        scratch.strengths.extend(
            self.charges
                .iter()
                .map(|charge| if charge.is_finite() { -charge.min(0.0) } else { 0.0 }),
        );

        let config = self.config;
        let alpha = self.alpha;
        let forces = &mut scratch.forces;
        let positions = &scratch.previous;
        let strengths = &scratch.strengths;

        accumulate_links(
            &self.links,
            &self.degrees,
            positions,
            LinkParams {
                alpha,
                distance: config.link_distance,
                strength: config.link_strength,
            },
            forces,
        );

        accumulate_gravity(positions, alpha * config.gravity, forces);

        if node_count >= config.spatial_index_threshold {
            if let Some(tree) = QuadNode::build(positions, strengths) {
                let params = ChargeParams {
                    alpha,
                    theta: config.theta,
                };
                for (index, force) in forces.iter_mut().enumerate() {
                    accumulate_repulsion_for_node(
                        &tree, index, positions, strengths, params, force,
                    );
                }
            }
        } else {
            accumulate_pairwise_repulsion(positions, strengths, alpha, forces);
        }

        let max_speed_sq = config.max_speed * config.max_speed;
        let mut repaired = 0usize;
        for index in 0..node_count {
            if self.pinned[index] {
                self.velocities[index] = Vec2::ZERO;
                continue;
            }

            let mut velocity = (self.velocities[index] + forces[index]) * config.friction;
            let speed_sq = velocity.length_sq();
            if speed_sq > max_speed_sq {
                velocity *= config.max_speed / speed_sq.sqrt();
            }

            let position = self.positions[index] + velocity;
            if is_finite(position) && is_finite(velocity) {
                self.velocities[index] = velocity;
                self.positions[index] = position;
            } else {
                self.velocities[index] = Vec2::ZERO;
                repaired += 1;
            }
        }

        for index in 0..node_count {
            if !is_finite(self.positions[index]) {
                self.positions[index] = Self::recovery_position(&self.positions, index);
                self.velocities[index] = Vec2::ZERO;
                repaired += 1;
            }
        }

        if repaired > 0 {
            log::warn!("repaired {repaired} non-finite node states on tick {}", self.ticks + 1);
        }
    }

    fn recovery_position(positions: &[Vec2], index: usize) -> Vec2 {
        let mut centroid = Vec2::ZERO;
        let mut count = 0usize;
        for position in positions.iter().copied().filter(|position| is_finite(*position)) {
            centroid += position;
            count += 1;
        }
        if count > 0 {
            centroid /= count as f32;
        }
        centroid + jitter_direction(index, index.wrapping_add(1))
    }
}

fn is_finite(value: Vec2) -> bool {
    value.x.is_finite() && value.y.is_finite()
}
