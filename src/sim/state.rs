//! Game state and core simulation types
//!
//! Everything needed to replay a run lives here; only the event queue is
//! transient.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::cylinder_to_cartesian;
use crate::settings::GridConfig;

/// Block colors, in the order difficulty presets deal them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockColor {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
}

impl BlockColor {
    pub const ALL: [BlockColor; 5] = [
        BlockColor::Red,
        BlockColor::Green,
        BlockColor::Blue,
        BlockColor::Yellow,
        BlockColor::Magenta,
    ];

    /// 0xRRGGBB display color
    pub fn rgb(&self) -> u32 {
        match self {
            BlockColor::Red => 0xff4444,
            BlockColor::Green => 0x44ff44,
            BlockColor::Blue => 0x4444ff,
            BlockColor::Yellow => 0xffff44,
            BlockColor::Magenta => 0xff44ff,
        }
    }
}

/// A block sitting in one row of the cylinder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    /// Height level (0 = bottom)
    pub row: usize,
    /// Column slot the block occupies at rest; also its order in the row chain
    pub col: usize,
    pub color: BlockColor,
    /// Angle the block is easing toward (radians, [0, 2π))
    pub target_angle: f32,
    /// Angle the block is displayed at (radians, [0, 2π))
    pub current_angle: f32,
}

impl Block {
    /// Displayed center of the block
    pub fn world_position(&self, config: &GridConfig) -> Vec3 {
        cylinder_to_cartesian(config.radius, self.current_angle, config.row_height(self.row))
    }

    /// Rest angle of the block's slot
    pub fn slot_angle(&self, config: &GridConfig) -> f32 {
        self.col as f32 * config.step()
    }
}

/// The block currently held by the pointer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragState {
    pub block_id: u32,
    pub row: usize,
    /// Grab point relative to the block center, kept while dragging
    pub grab_offset: Vec3,
}

/// A cleared column waiting to be refilled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRefill {
    pub column: usize,
    pub ticks_remaining: u32,
}

/// Things the renderer may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GridCreated { blocks: usize },
    DragStarted { block_id: u32, row: usize },
    DragReleased { block_id: u32, row: usize },
    ColumnMatched {
        column: usize,
        color: BlockColor,
        block_ids: Vec<u32>,
    },
    ColumnRefilled { column: usize, block_ids: Vec<u32> },
    ScoreChanged { score: u64 },
    PromptShown,
    GameReset,
}

/// RNG state wrapper for serialization
///
/// Each batch of blocks (initial grid, one refill) draws from its own PCG
/// stream so a run replays identically from the seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Generator for the next batch
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GridConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    /// All blocks on the cylinder (flat list, any order)
    pub blocks: Vec<Block>,
    pub score: u64,
    /// Columns cleared this run
    pub matches: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub drag: Option<DragState>,
    pub pending_refills: Vec<PendingRefill>,
    /// Whether the external prompt button is showing
    pub prompt_visible: bool,
    /// Events since the presenter last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game with a freshly dealt grid
    pub fn new(config: GridConfig, seed: u64) -> Self {
        let mut state = Self {
            config,
            seed,
            rng_state: RngState::new(seed),
            blocks: Vec::new(),
            score: 0,
            matches: 0,
            time_ticks: 0,
            drag: None,
            pending_refills: Vec::new(),
            prompt_visible: false,
            events: Vec::new(),
            next_id: 1,
        };
        state.create_grid();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Deal one block into every (row, col) slot
    pub fn create_grid(&mut self) {
        let mut rng = self.rng_state.next_rng();
        for row in 0..self.config.rows {
            for col in 0..self.config.cols {
                let color = self.random_color(&mut rng);
                self.add_block(col, row, color);
            }
        }
        log::info!(
            "Dealt {}x{} grid with {} colors (seed {}, stream {})",
            self.config.rows,
            self.config.cols,
            self.config.palette.len(),
            self.seed,
            self.rng_state.stream - 1
        );
        self.events.push(GameEvent::GridCreated {
            blocks: self.blocks.len(),
        });
    }

    /// Place a block at rest in the given slot and return its ID
    pub fn add_block(&mut self, col: usize, row: usize, color: BlockColor) -> u32 {
        let id = self.next_entity_id();
        let angle = col as f32 * self.config.step();
        self.blocks.push(Block {
            id,
            row,
            col,
            color,
            target_angle: angle,
            current_angle: angle,
        });
        id
    }

    pub fn random_color(&self, rng: &mut Pcg32) -> BlockColor {
        let palette = &self.config.palette;
        if palette.is_empty() {
            return BlockColor::Red;
        }
        palette[rng.random_range(0..palette.len())]
    }

    pub fn block(&self, id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Blocks of one row, in chain (column) order
    pub fn row_blocks(&self, row: usize) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self.blocks.iter().filter(|b| b.row == row).collect();
        blocks.sort_by_key(|b| (b.col, b.id));
        blocks
    }

    /// Award points and tell the presenter
    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        self.events.push(GameEvent::ScoreChanged { score: self.score });
    }

    /// Start over with a new deal (score, drag and pending refills cleared)
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.drag = None;
        self.pending_refills.clear();
        self.score = 0;
        self.matches = 0;
        self.events.push(GameEvent::GameReset);
        self.events.push(GameEvent::ScoreChanged { score: 0 });
        self.create_grid();
        log::info!("Game reset");
    }

    /// Take the queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
