//! Fixed timestep simulation tick
//!
//! Pointer input, column resolution, delayed refills and angle easing.

use glam::Vec3;

use super::columns::find_matches;
use super::ring::{arrange_row, nearest_free_slot, snap_row};
use super::state::{DragState, GameEvent, GameState, PendingRefill};
use crate::camera::Ray;
use crate::consts::*;
use crate::{cylinder_angle, normalize_angle, shortest_angle_delta};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer pressed, as a world-space ray
    pub pointer_down: Option<Ray>,
    /// Latest pointer position while held
    pub pointer_move: Option<Ray>,
    /// Pointer released
    pub pointer_up: bool,
    /// External reset button clicked
    pub reset: bool,
}

impl TickInput {
    /// Drop one-shot commands once a tick has consumed them
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.reset {
        press_reset(state);
    }
    if let Some(ray) = input.pointer_down {
        begin_drag(state, &ray);
    }
    if let Some(ray) = input.pointer_move {
        update_drag(state, &ray);
    }
    if input.pointer_up {
        end_drag(state);
    }

    advance_refills(state);
    ease_angles(state);

    state.time_ticks += 1;
}

/// Pick the nearest block under the ray and start dragging it
///
/// Returns the grabbed block's ID; a miss leaves the state untouched.
pub fn begin_drag(state: &mut GameState, ray: &Ray) -> Option<u32> {
    let config = &state.config;
    let (block_id, hit) = state
        .blocks
        .iter()
        .filter_map(|b| {
            let center = b.world_position(config);
            ray.intersect_vertical_cylinder(center, BLOCK_RADIUS, BLOCK_HEIGHT / 2.0)
                .map(|t| (b.id, t, center))
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, t, center)| (id, ray.at(t) - center))?;

    grab_block(state, block_id, hit);
    Some(block_id)
}

/// Start dragging a specific block, holding it at `grab_offset` from its center
pub fn grab_block(state: &mut GameState, block_id: u32, grab_offset: Vec3) -> bool {
    // A second press without a release drops the previous drag in place
    if state.drag.is_some() {
        end_drag(state);
    }
    // Releasing may have cleared the pressed block's column
    let Some(row) = state.block(block_id).map(|b| b.row) else {
        return false;
    };
    log::debug!("Grabbed block {} in row {}", block_id, row);
    state.drag = Some(DragState {
        block_id,
        row,
        grab_offset,
    });
    state.events.push(GameEvent::DragStarted { block_id, row });
    true
}

/// Slide the dragged block to where the ray meets its row's plane
pub fn update_drag(state: &mut GameState, ray: &Ray) -> bool {
    let Some(drag) = &state.drag else {
        return false;
    };
    let plane_y = state.config.row_height(drag.row);
    let Some(point) = ray.intersect_plane_y(plane_y) else {
        return false;
    };
    let angle = cylinder_angle(point - drag.grab_offset);
    drag_to_angle(state, angle)
}

/// Set the dragged block's target angle and reflow its row
pub fn drag_to_angle(state: &mut GameState, angle: f32) -> bool {
    let Some(drag) = &state.drag else {
        return false;
    };
    let (row, block_id) = (drag.row, drag.block_id);
    arrange_row(&mut state.blocks, row, block_id, angle, state.config.cols)
}

/// Release the pointer: settle the dragged row and resolve columns
///
/// Resolution runs even when nothing was held.
pub fn end_drag(state: &mut GameState) {
    if let Some(drag) = state.drag.take() {
        snap_row(&mut state.blocks, drag.row, drag.block_id, state.config.cols);
        log::debug!("Released block {} in row {}", drag.block_id, drag.row);
        state.events.push(GameEvent::DragReleased {
            block_id: drag.block_id,
            row: drag.row,
        });
    }
    resolve_columns(state);
}

/// Clear every column that converged and schedule its refill
///
/// Returns the number of columns cleared.
pub fn resolve_columns(state: &mut GameState) -> usize {
    let matches = find_matches(&state.blocks, &state.config);

    for m in &matches {
        log::info!("Column {} matched ({:?})", m.column, m.color);
        state.blocks.retain(|b| !m.block_ids.contains(&b.id));
        state.pending_refills.push(PendingRefill {
            column: m.column,
            ticks_remaining: state.config.refill_delay_ticks,
        });
        state.matches += 1;
        state.events.push(GameEvent::ColumnMatched {
            column: m.column,
            color: m.color,
            block_ids: m.block_ids.clone(),
        });
        state.add_score(state.config.score_per_match);
    }

    matches.len()
}

/// Count down pending refills and deal new blocks when they expire
pub fn advance_refills(state: &mut GameState) {
    let mut due = Vec::new();
    state.pending_refills.retain_mut(|r| {
        if r.ticks_remaining == 0 {
            due.push(r.column);
            return false;
        }
        r.ticks_remaining -= 1;
        true
    });

    for column in due {
        refill_column(state, column);
    }
}

/// Deal one new block per row into a cleared column
///
/// If a drag has since moved other blocks into that slot, the row's nearest
/// free slot is used instead; a full row gets nothing.
pub fn refill_column(state: &mut GameState, column: usize) {
    let mut rng = state.rng_state.next_rng();
    let mut block_ids = Vec::with_capacity(state.config.rows);

    for row in 0..state.config.rows {
        let Some(slot) = nearest_free_slot(&state.blocks, row, state.config.cols, column) else {
            log::warn!("Row {} has no free slot for column {} refill", row, column);
            continue;
        };
        let color = state.random_color(&mut rng);
        block_ids.push(state.add_block(slot, row, color));
    }

    log::info!("Refilled column {} with {} blocks", column, block_ids.len());
    state.events.push(GameEvent::ColumnRefilled { column, block_ids });

    if !state.prompt_visible {
        state.prompt_visible = true;
        state.events.push(GameEvent::PromptShown);
    }
}

/// The external button: hide it and deal a fresh game
pub fn press_reset(state: &mut GameState) {
    state.prompt_visible = false;
    state.reset();
}

/// Ease every block's displayed angle toward its target along the short way
pub fn ease_angles(state: &mut GameState) {
    let smoothing = state.config.smoothing.clamp(0.0, 1.0);
    for b in &mut state.blocks {
        let diff = shortest_angle_delta(b.current_angle, b.target_angle);
        if diff.abs() < ANGLE_SETTLE_EPSILON || smoothing >= 1.0 {
            b.current_angle = b.target_angle;
        } else {
            b.current_angle = normalize_angle(b.current_angle + diff * smoothing);
        }
    }
}
