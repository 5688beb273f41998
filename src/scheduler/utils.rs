use std::f32::consts::{PI, TAU};

use crate::constants::APPROACH_OFFSET;
use crate::types::Position;

/// Heading from `from` to `to`, in [0, 2π).
pub(super) fn angle_to(from: &Position, to: &Position) -> f32 {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// True when `angle` lies within the `arc` centred on `orientation`.
pub(super) fn has_in_arc(orientation: f32, angle: f32, arc: f32) -> bool {
    let mut diff = (angle - orientation) % TAU;
    if diff > PI {
        diff -= TAU;
    } else if diff < -PI {
        diff += TAU;
    }
    diff.abs() <= arc / 2.0
}

/// Point next to `target` the player walks to, before ground correction.
pub(super) fn approach_point(target: &Position) -> (f32, f32) {
    (target.x - APPROACH_OFFSET, target.y - APPROACH_OFFSET)
}
