//! Input sampling with held/just-pressed edges
//!
//! The host hands over a raw `InputState` each frame (pointer position and the
//! set of keys currently down). `InputTracker` compares it against the
//! previous sample to derive the just-pressed and just-released sets.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Buttons the demos care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Enter,
    Escape,
    Z,
    R,
    Q,
    MouseLeft,
}

impl Key {
    pub const ALL: [Key; 11] = [
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Space,
        Key::Enter,
        Key::Escape,
        Key::Z,
        Key::R,
        Key::Q,
        Key::MouseLeft,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Compact set of keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet(u16);

impl KeySet {
    pub const EMPTY: KeySet = KeySet(0);

    pub fn of(keys: &[Key]) -> Self {
        keys.iter().fold(Self::EMPTY, |set, &k| set.with(k))
    }

    pub fn with(self, key: Key) -> Self {
        KeySet(self.0 | key.bit())
    }

    pub fn insert(&mut self, key: Key) {
        self.0 |= key.bit();
    }

    pub fn contains(&self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Keys in `self` that are not in `other`
    pub fn difference(&self, other: KeySet) -> KeySet {
        KeySet(self.0 & !other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

/// Raw device sample for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub pointer: Vec2,
    pub held: KeySet,
}

impl InputState {
    pub fn new(pointer: Vec2, held: &[Key]) -> Self {
        Self {
            pointer,
            held: KeySet::of(held),
        }
    }

    pub fn at(x: f32, y: f32) -> Self {
        Self {
            pointer: Vec2::new(x, y),
            held: KeySet::EMPTY,
        }
    }

    pub fn hold(mut self, key: Key) -> Self {
        self.held.insert(key);
        self
    }
}

/// A frame's input with edges resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub pointer: Vec2,
    pub held: KeySet,
    /// Down now, up on the previous frame
    pub pressed: KeySet,
    /// Up now, down on the previous frame
    pub released: KeySet,
}

impl InputSnapshot {
    pub fn held(&self, key: Key) -> bool {
        self.held.contains(key)
    }

    pub fn just_pressed(&self, key: Key) -> bool {
        self.pressed.contains(key)
    }

    pub fn just_released(&self, key: Key) -> bool {
        self.released.contains(key)
    }

    /// Horizontal direction from the arrow keys (-1, 0 or 1)
    pub fn axis_x(&self) -> f32 {
        let mut x = 0.0;
        if self.held(Key::Left) {
            x -= 1.0;
        }
        if self.held(Key::Right) {
            x += 1.0;
        }
        x
    }
}

/// Edge detector between consecutive samples
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    previous: KeySet,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, state: InputState) -> InputSnapshot {
        let snapshot = InputSnapshot {
            pointer: state.pointer,
            held: state.held,
            pressed: state.held.difference(self.previous),
            released: self.previous.difference(state.held),
        };
        self.previous = state.held;
        snapshot
    }
}
