//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (columns resolved in ascending order)
//! - No rendering or platform dependencies

pub mod columns;
pub mod ring;
pub mod state;
pub mod tick;

pub use columns::{ColumnMatch, column_index, find_matches};
pub use ring::{arrange_row, free_slots, nearest_free_slot, snap_row};
pub use state::{Block, BlockColor, DragState, GameEvent, GameState, PendingRefill, RngState};
pub use tick::{
    TickInput, begin_drag, drag_to_angle, end_drag, grab_block, press_reset, resolve_columns,
    tick, update_drag,
};
