//! Per-frame movement and screen-edge rules

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::reflect_velocity;
use super::entity::Entity;

/// Axis-aligned play field
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// The screen rectangle [0,w)×[0,h)
    pub fn screen(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Whether `pos` lies inside the bounds grown by `margin` on every side
    pub fn contains_with_margin(&self, pos: Vec2, margin: Vec2) -> bool {
        pos.cmpge(self.min - margin).all() && pos.cmple(self.max + margin).all()
    }
}

/// Screen edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Normal pointing back into the field
    pub fn inward_normal(self) -> Vec2 {
        match self {
            Side::Left => Vec2::X,
            Side::Right => Vec2::NEG_X,
            Side::Top => Vec2::Y,
            Side::Bottom => Vec2::NEG_Y,
        }
    }
}

/// What happens when an entity crosses an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeRule {
    /// Clamp to the edge and reflect the velocity component
    Bounce,
    /// Clamp to the edge and report the crossing (one-way boundary)
    Exit,
    /// Reappear on the opposite edge
    Wrap,
    /// No effect
    Open,
}

/// Which part of the entity has to cross an edge for the rule to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    /// The center point
    Center,
    /// The rim (edges sit one half-extent inside the bounds)
    Rim,
    /// The whole body (edges sit one half-extent outside the bounds)
    Beyond,
}

/// Edge rules for all four sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub left: EdgeRule,
    pub right: EdgeRule,
    pub top: EdgeRule,
    pub bottom: EdgeRule,
    pub contact: Contact,
}

impl Boundary {
    /// Bounce off all four walls at the rim
    pub const BOX: Boundary = Boundary {
        left: EdgeRule::Bounce,
        right: EdgeRule::Bounce,
        top: EdgeRule::Bounce,
        bottom: EdgeRule::Bounce,
        contact: Contact::Rim,
    };

    /// Falling-ball field: side walls bounce, the bottom is one-way
    pub const PADDLE_FIELD: Boundary = Boundary {
        left: EdgeRule::Bounce,
        right: EdgeRule::Bounce,
        top: EdgeRule::Open,
        bottom: EdgeRule::Exit,
        contact: Contact::Center,
    };

    /// Projectiles and debris: leaving the screen in any direction is final
    pub const PROJECTILE: Boundary = Boundary {
        left: EdgeRule::Exit,
        right: EdgeRule::Exit,
        top: EdgeRule::Exit,
        bottom: EdgeRule::Exit,
        contact: Contact::Beyond,
    };

    /// Side walls hold the body on screen; open above and below
    pub const SIDE_WALLS: Boundary = Boundary {
        left: EdgeRule::Exit,
        right: EdgeRule::Exit,
        top: EdgeRule::Open,
        bottom: EdgeRule::Open,
        contact: Contact::Rim,
    };

    /// Horizontal scroll that loops (platforms, clouds)
    pub const SIDE_SCROLL: Boundary = Boundary {
        left: EdgeRule::Wrap,
        right: EdgeRule::Wrap,
        top: EdgeRule::Open,
        bottom: EdgeRule::Open,
        contact: Contact::Center,
    };

    /// Vertical scroll that loops (star fields)
    pub const SCROLL_WRAP: Boundary = Boundary {
        left: EdgeRule::Open,
        right: EdgeRule::Open,
        top: EdgeRule::Wrap,
        bottom: EdgeRule::Wrap,
        contact: Contact::Center,
    };
}

/// Result of one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub bounced: bool,
    pub wrapped: bool,
    /// First one-way edge crossed this step
    pub exited: Option<Side>,
}

/// Advance an entity by `vel * scale` and apply the boundary rules.
///
/// `scale` folds together the frame delta and any global speed multiplier.
pub fn step(e: &mut Entity, scale: f32, boundary: &Boundary, bounds: &Bounds) -> StepOutcome {
    e.pos += e.vel * scale;

    let half = e.half_extents();
    let inset = match boundary.contact {
        Contact::Center => Vec2::ZERO,
        Contact::Rim => half,
        Contact::Beyond => -half,
    };
    let lo = bounds.min + inset;
    let hi = bounds.max - inset;

    let mut outcome = StepOutcome::default();

    if e.pos.x <= lo.x {
        apply_edge(e, Side::Left, boundary.left, lo.x, hi.x - lo.x, &mut outcome);
    } else if e.pos.x >= hi.x {
        apply_edge(e, Side::Right, boundary.right, hi.x, hi.x - lo.x, &mut outcome);
    }

    if e.pos.y <= lo.y {
        apply_edge(e, Side::Top, boundary.top, lo.y, hi.y - lo.y, &mut outcome);
    } else if e.pos.y >= hi.y {
        apply_edge(e, Side::Bottom, boundary.bottom, hi.y, hi.y - lo.y, &mut outcome);
    }

    e.check_invariants();
    outcome
}

/// Add one frame of gravity to the vertical velocity, capped at `terminal`
#[inline]
pub fn fall(e: &mut Entity, gravity: f32, terminal: f32) {
    e.vel.y = (e.vel.y + gravity).min(terminal);
}

fn apply_edge(e: &mut Entity, side: Side, rule: EdgeRule, edge: f32, span: f32, outcome: &mut StepOutcome) {
    let horizontal = matches!(side, Side::Left | Side::Right);
    match rule {
        EdgeRule::Bounce => {
            set_axis(e, horizontal, edge);
            let normal = side.inward_normal();
            // Only reflect when still heading outward, so a clamped entity can't jitter
            if e.vel.dot(normal) < 0.0 {
                e.vel = reflect_velocity(e.vel, normal);
            }
            outcome.bounced = true;
        }
        EdgeRule::Exit => {
            set_axis(e, horizontal, edge);
            outcome.exited.get_or_insert(side);
        }
        EdgeRule::Wrap => {
            if span > 0.0 {
                let shift = match side {
                    Side::Left | Side::Top => span,
                    Side::Right | Side::Bottom => -span,
                };
                if horizontal {
                    e.pos.x += shift;
                } else {
                    e.pos.y += shift;
                }
            }
            outcome.wrapped = true;
        }
        EdgeRule::Open => {}
    }
}

fn set_axis(e: &mut Entity, horizontal: bool, value: f32) {
    if horizontal {
        e.pos.x = value;
    } else {
        e.pos.y = value;
    }
}
