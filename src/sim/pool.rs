//! Entity lifecycle manager
//!
//! Owns a bounded, spawn-ordered collection of entities. Entities are never
//! removed mid-pass: consumers clear `alive` and the pool drops them on the
//! next `sweep`, so indices stay stable while a pass is iterating.

use serde::{Deserialize, Serialize};

use super::collision::{self, overlaps};
use super::entity::{Entity, EntityId, Spawn};
use super::motion::{self, Boundary, Bounds, Side};

/// What to do when a spawn would exceed the pool's cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Drop the spawn request
    RefuseNew,
    /// Evict the oldest entity to make room
    #[default]
    DropOldest,
}

impl EvictionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::RefuseNew => "refuse_new",
            EvictionPolicy::DropOldest => "drop_oldest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "refuse_new" | "refuse" => Some(EvictionPolicy::RefuseNew),
            "drop_oldest" | "oldest" => Some(EvictionPolicy::DropOldest),
            _ => None,
        }
    }
}

/// One side of an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Which {
    First,
    Second,
}

/// Outcome chosen for an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOutcome {
    /// Leave both untouched; they stay eligible for other pairs
    Ignore,
    /// Replace both with one area-conserving entity
    Merge,
    DestroyBoth,
    /// Destroy one side; the caller scores the other
    Destroy(Which),
    /// Burst one side into `pieces` children on a ring
    Split { target: Which, pieces: u32, speed: f32 },
}

/// A pair that was resolved this pass
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub first: EntityId,
    pub second: EntityId,
    pub outcome: PairOutcome,
    /// Ids of entities created by the outcome (empty when refused by the cap)
    pub spawned: Vec<EntityId>,
}

/// Bounded entity collection
#[derive(Debug, Clone)]
pub struct EntityPool {
    entities: Vec<Entity>,
    next_id: EntityId,
    pub cap: usize,
    pub policy: EvictionPolicy,
    /// Entities evicted to make room (lifetime total)
    pub evicted: u64,
    /// Spawns refused at the cap (lifetime total)
    pub refused: u64,
    /// Set while the pool sits at its cap; cleared on the first spawn with room
    saturated: bool,
    label: &'static str,
}

impl EntityPool {
    pub fn new(label: &'static str, cap: usize, policy: EvictionPolicy) -> Self {
        debug_assert!(cap > 0, "pool {label} has zero capacity");
        Self {
            entities: Vec::new(),
            next_id: 1,
            cap,
            policy,
            evicted: 0,
            refused: 0,
            saturated: false,
            label,
        }
    }

    /// Add one entity. Returns `None` when the cap refuses the spawn.
    pub fn spawn(&mut self, spawn: Spawn) -> Option<EntityId> {
        if self.entities.len() >= self.cap {
            self.sweep();
        }

        if self.entities.len() >= self.cap {
            match self.policy {
                EvictionPolicy::RefuseNew => {
                    self.refused += 1;
                    self.note_saturation();
                    return None;
                }
                EvictionPolicy::DropOldest => {
                    self.entities.remove(0);
                    self.evicted += 1;
                    self.note_saturation();
                }
            }
        } else {
            self.saturated = false;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity::new(id, spawn));
        Some(id)
    }

    fn note_saturation(&mut self) {
        if !self.saturated {
            log::warn!(
                "{} pool reached its cap of {} ({})",
                self.label,
                self.cap,
                self.policy.as_str()
            );
            self.saturated = true;
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Live entities in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut().filter(|e| e.alive)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Clear an entity's liveness flag. Returns false if it was already gone.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(e) if e.alive => {
                e.kill();
                true
            }
            _ => false,
        }
    }

    /// Drop every dead entity
    pub fn sweep(&mut self) {
        self.entities.retain(|e| e.alive);
    }

    /// Remove everything and restart ids from 1
    pub fn clear(&mut self) {
        self.entities.clear();
        self.next_id = 1;
        self.saturated = false;
    }

    /// Step every live entity; returns the ids that crossed a one-way edge
    pub fn step_all(&mut self, scale: f32, boundary: &Boundary, bounds: &Bounds) -> Vec<(EntityId, Side)> {
        let mut exits = Vec::new();
        for e in self.entities.iter_mut().filter(|e| e.alive) {
            if let Some(side) = motion::step(e, scale, boundary, bounds).exited {
                exits.push((e.id, side));
            }
        }
        exits
    }

    /// Burst an entity into `pieces` children. Returns the child ids.
    pub fn split(&mut self, id: EntityId, pieces: u32, speed: f32) -> Vec<EntityId> {
        let children = match self.get(id) {
            Some(parent) if parent.alive => collision::split(parent, pieces, speed),
            _ => return Vec::new(),
        };
        self.kill(id);
        self.sweep();
        children.into_iter().filter_map(|c| self.spawn(c)).collect()
    }

    /// Test every unordered pair of live entities and apply `decide`'s
    /// outcome to the overlapping ones.
    ///
    /// Pairs are visited in descending index order (i from newest, j below
    /// i). Once an entity takes part in a resolved pair it is skipped for the
    /// rest of the pass. Replacement entities are spawned after the pass, so
    /// they never collide on the frame they appear.
    pub fn resolve_collisions<F>(&mut self, mut decide: F) -> Vec<Resolution>
    where
        F: FnMut(&Entity, &Entity) -> PairOutcome,
    {
        let n = self.entities.len();
        let mut resolved = vec![false; n];
        let mut pending: Vec<(usize, Vec<Spawn>)> = Vec::new();
        let mut resolutions = Vec::new();

        for i in (0..n).rev() {
            if resolved[i] || !self.entities[i].alive {
                continue;
            }
            for j in (0..i).rev() {
                if resolved[j] || !self.entities[j].alive {
                    continue;
                }
                let (a, b) = (&self.entities[i], &self.entities[j]);
                if !overlaps(a, b) {
                    continue;
                }

                let outcome = decide(a, b);
                let spawns = match outcome {
                    PairOutcome::Ignore => continue,
                    PairOutcome::Merge => vec![collision::merge(a, b)],
                    PairOutcome::Split { target, pieces, speed } => {
                        let parent = if target == Which::First { a } else { b };
                        collision::split(parent, pieces, speed)
                    }
                    PairOutcome::DestroyBoth | PairOutcome::Destroy(_) => Vec::new(),
                };

                let (first, second) = (a.id, b.id);
                match outcome {
                    PairOutcome::Destroy(Which::First) => self.entities[i].kill(),
                    PairOutcome::Destroy(Which::Second) => self.entities[j].kill(),
                    PairOutcome::Split { target: Which::First, .. } => self.entities[i].kill(),
                    PairOutcome::Split { target: Which::Second, .. } => self.entities[j].kill(),
                    _ => {
                        self.entities[i].kill();
                        self.entities[j].kill();
                    }
                }
                resolved[i] = true;
                resolved[j] = true;

                pending.push((resolutions.len(), spawns));
                resolutions.push(Resolution {
                    first,
                    second,
                    outcome,
                    spawned: Vec::new(),
                });
                break;
            }
        }

        self.sweep();
        for (index, spawns) in pending {
            let ids = spawns.into_iter().filter_map(|s| self.spawn(s)).collect();
            resolutions[index].spawned = ids;
        }
        resolutions
    }
}
