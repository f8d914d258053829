//! Row arrangement around the cylinder
//!
//! A row behaves like a chain: moving one block drags every other block of
//! the row along, each one fixed step away from its neighbor in column order.

use super::columns::column_index;
use super::state::Block;
use crate::normalize_angle;

/// Indices into `blocks` of one row, in chain (column) order
fn chain(blocks: &[Block], row: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..blocks.len()).filter(|&i| blocks[i].row == row).collect();
    indices.sort_by_key(|&i| (blocks[i].col, blocks[i].id));
    indices
}

/// Re-derive every target angle of a row from the dragged block's angle
///
/// Returns false if the block is not in the row.
pub fn arrange_row(blocks: &mut [Block], row: usize, dragged_id: u32, angle: f32, cols: usize) -> bool {
    let chain = chain(blocks, row);
    let Some(start) = chain.iter().position(|&i| blocks[i].id == dragged_id) else {
        return false;
    };
    let step = std::f32::consts::TAU / cols as f32;

    blocks[chain[start]].target_angle = normalize_angle(angle);

    // Spread to the left, then to the right
    for i in (0..start).rev() {
        blocks[chain[i]].target_angle = normalize_angle(blocks[chain[i + 1]].target_angle - step);
    }
    for i in start + 1..chain.len() {
        blocks[chain[i]].target_angle = normalize_angle(blocks[chain[i - 1]].target_angle + step);
    }
    true
}

/// Settle a row into whole column slots after a drag
///
/// The dragged block takes the slot nearest its angle; the rest follow in
/// chain order, so every block ends in a distinct slot.
pub fn snap_row(blocks: &mut [Block], row: usize, dragged_id: u32, cols: usize) -> bool {
    let chain = chain(blocks, row);
    let Some(start) = chain.iter().position(|&i| blocks[i].id == dragged_id) else {
        return false;
    };
    let step = std::f32::consts::TAU / cols as f32;
    let anchor = column_index(blocks[chain[start]].target_angle, cols) as i64;

    for (j, &i) in chain.iter().enumerate() {
        let slot = (anchor + j as i64 - start as i64).rem_euclid(cols as i64) as usize;
        blocks[i].col = slot;
        blocks[i].target_angle = slot as f32 * step;
    }
    true
}

/// Column slots of a row with no block resting in them, ascending
pub fn free_slots(blocks: &[Block], row: usize, cols: usize) -> Vec<usize> {
    let mut taken = vec![false; cols];
    for b in blocks.iter().filter(|b| b.row == row) {
        if let Some(t) = taken.get_mut(b.col) {
            *t = true;
        }
    }
    (0..cols).filter(|&c| !taken[c]).collect()
}

/// Free slot closest to `preferred` going around the ring (ties go clockwise)
pub fn nearest_free_slot(blocks: &[Block], row: usize, cols: usize, preferred: usize) -> Option<usize> {
    free_slots(blocks, row, cols).into_iter().min_by_key(|&c| {
        let forward = (c + cols - preferred) % cols;
        let backward = (preferred + cols - c) % cols;
        (forward.min(backward), forward > backward)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GridConfig;
    use crate::sim::state::GameState;
    use proptest::prelude::*;
    use std::f32::consts::TAU;

    fn state() -> GameState {
        GameState::new(GridConfig::default(), 42)
    }

    fn id_at(state: &GameState, row: usize, col: usize) -> u32 {
        state
            .blocks
            .iter()
            .find(|b| b.row == row && b.col == col)
            .map(|b| b.id)
            .unwrap()
    }

    #[test]
    fn test_arrange_keeps_fixed_spacing() {
        let mut s = state();
        let step = s.config.step();
        let id = id_at(&s, 2, 5);
        assert!(arrange_row(&mut s.blocks, 2, id, 5.5 * step, 20));

        let row = s.row_blocks(2);
        for pair in row.windows(2) {
            let gap = normalize_angle(pair[1].target_angle - pair[0].target_angle);
            assert!((gap - step).abs() < 1e-4, "gap {gap}");
        }
        assert!((s.block(id).unwrap().target_angle - 5.5 * step).abs() < 1e-5);

        // Other rows untouched
        for b in s.blocks.iter().filter(|b| b.row != 2) {
            assert!((b.target_angle - b.col as f32 * step).abs() < 1e-6);
        }
    }

    #[test]
    fn test_arrange_wraps_across_seam() {
        let mut s = state();
        let id = id_at(&s, 0, 0);
        // Drag block 0 slightly "behind" zero; its left side is empty, right side wraps
        arrange_row(&mut s.blocks, 0, id, TAU - 0.05, 20);
        for b in s.blocks.iter().filter(|b| b.row == 0) {
            assert!((0.0..TAU).contains(&b.target_angle));
        }
    }

    #[test]
    fn test_snap_assigns_shifted_slots() {
        let mut s = state();
        let step = s.config.step();
        let id = id_at(&s, 1, 4);
        // Move column 4 to just past column 7
        arrange_row(&mut s.blocks, 1, id, 7.3 * step, 20);
        assert!(snap_row(&mut s.blocks, 1, id, 20));

        let moved = s.block(id).unwrap();
        assert_eq!(moved.col, 7);
        assert!((moved.target_angle - 7.0 * step).abs() < 1e-5);

        let mut cols: Vec<usize> = s.row_blocks(1).iter().map(|b| b.col).collect();
        cols.sort();
        assert_eq!(cols, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_unknown_block_is_noop() {
        let mut s = state();
        let before: Vec<f32> = s.blocks.iter().map(|b| b.target_angle).collect();
        assert!(!arrange_row(&mut s.blocks, 0, 9999, 1.0, 20));
        assert!(!snap_row(&mut s.blocks, 0, 9999, 20));
        let after: Vec<f32> = s.blocks.iter().map(|b| b.target_angle).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_free_slots_and_nearest() {
        let mut s = state();
        s.blocks.retain(|b| !(b.row == 0 && (b.col == 3 || b.col == 17)));
        assert_eq!(free_slots(&s.blocks, 0, 20), vec![3, 17]);
        assert_eq!(nearest_free_slot(&s.blocks, 0, 20, 3), Some(3));
        assert_eq!(nearest_free_slot(&s.blocks, 0, 20, 5), Some(3));
        // 19 is two away from 17 and four away from 3 (wrapping)
        assert_eq!(nearest_free_slot(&s.blocks, 0, 20, 19), Some(17));
        assert_eq!(nearest_free_slot(&s.blocks, 1, 20, 0), None);
    }

    proptest! {
        #[test]
        fn snapped_row_occupies_unique_slots(
            row in 0usize..5,
            col in 0usize..20,
            angle in -10.0f32..10.0,
            removed in proptest::collection::vec(0usize..20, 0..4),
        ) {
            let mut s = state();
            s.blocks.retain(|b| b.row != row || !removed.contains(&b.col) || b.col == col);
            let expected = s.row_blocks(row).len();
            let id = id_at(&s, row, col);

            arrange_row(&mut s.blocks, row, id, angle, 20);
            snap_row(&mut s.blocks, row, id, 20);

            let mut slots: Vec<usize> = s
                .row_blocks(row)
                .iter()
                .map(|b| column_index(b.target_angle, 20))
                .collect();
            slots.sort();
            slots.dedup();
            prop_assert_eq!(slots.len(), expected);
            for b in s.blocks.iter().filter(|b| b.row == row) {
                prop_assert_eq!(column_index(b.target_angle, 20), b.col);
            }
        }
    }
}
