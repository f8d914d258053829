//! Column resolution and match detection
//!
//! Blocks are assigned to the column slot nearest their target angle. A
//! column scores when it holds exactly one block from every row and all of
//! them share a color.

use std::collections::BTreeMap;

use super::state::{Block, BlockColor};
use crate::normalize_angle;
use crate::settings::GridConfig;

/// A column that converged to one color
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMatch {
    pub column: usize,
    pub color: BlockColor,
    /// Matched blocks, bottom row first
    pub block_ids: Vec<u32>,
}

/// Column slot nearest to an angle
#[inline]
pub fn column_index(angle: f32, cols: usize) -> usize {
    let step = std::f32::consts::TAU / cols as f32;
    let slot = (normalize_angle(angle) / step).round() as i64;
    slot.rem_euclid(cols as i64) as usize
}

/// Group blocks by the column their target angle resolves to
pub fn group_by_column<'a>(blocks: &'a [Block], cols: usize) -> BTreeMap<usize, Vec<&'a Block>> {
    let mut columns: BTreeMap<usize, Vec<&Block>> = BTreeMap::new();
    for b in blocks {
        columns
            .entry(column_index(b.target_angle, cols))
            .or_default()
            .push(b);
    }
    columns
}

/// Check one column's blocks; returns the shared color on a match
pub fn column_color(column: &[&Block], rows: usize) -> Option<BlockColor> {
    if column.len() != rows {
        return None;
    }
    let mut seen = vec![false; rows];
    for b in column {
        match seen.get_mut(b.row) {
            Some(slot) if !*slot => *slot = true,
            _ => return None,
        }
    }
    let first = column.first()?.color;
    column.iter().all(|b| b.color == first).then_some(first)
}

/// All columns that currently score, in column order
pub fn find_matches(blocks: &[Block], config: &GridConfig) -> Vec<ColumnMatch> {
    group_by_column(blocks, config.cols)
        .into_iter()
        .filter_map(|(column, members)| {
            let color = column_color(&members, config.rows)?;
            let mut members = members;
            members.sort_by_key(|b| b.row);
            Some(ColumnMatch {
                column,
                color,
                block_ids: members.iter().map(|b| b.id).collect(),
            })
        })
        .collect()
}
