//! Hand-off from the simulation to whatever draws it
//!
//! The simulation never renders. Once per frame the front end calls
//! [`report`], which drains the event queue into a [`Presenter`] and then
//! hands it a [`Snapshot`] of everything visible.

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, GameState};

/// One block as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockView {
    pub id: u32,
    pub row: usize,
    pub col: usize,
    /// 0xRRGGBB
    pub rgb: u32,
    /// World-space center
    pub position: [f32; 3],
    /// Rotation about Y so the block faces outward (radians)
    pub yaw: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub score: u64,
    pub prompt_visible: bool,
    pub dragging: Option<u32>,
    pub blocks: Vec<BlockView>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let blocks = state
            .blocks
            .iter()
            .map(|b| BlockView {
                id: b.id,
                row: b.row,
                col: b.col,
                rgb: b.color.rgb(),
                position: b.world_position(&state.config).to_array(),
                yaw: b.current_angle,
            })
            .collect();

        Self {
            score: state.score,
            prompt_visible: state.prompt_visible,
            dragging: state.drag.as_ref().map(|d| d.block_id),
            blocks,
        }
    }

    /// JSON form for a JavaScript renderer
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// An external renderer the core reports to
pub trait Presenter {
    /// Draw the current frame
    fn present(&mut self, snapshot: &Snapshot);

    /// React to something that just happened (flashes, score text, buttons)
    fn handle_event(&mut self, _event: &GameEvent) {}
}

/// Drain events into the presenter, then present the frame
pub fn report<P: Presenter + ?Sized>(state: &mut GameState, presenter: &mut P) {
    for event in state.drain_events() {
        presenter.handle_event(&event);
    }
    presenter.present(&Snapshot::capture(state));
}

/// Presenter that only logs (headless runs)
#[derive(Debug, Default)]
pub struct LogPresenter {
    pub frames: u64,
    pub last_score: u64,
}

impl Presenter for LogPresenter {
    fn present(&mut self, snapshot: &Snapshot) {
        self.frames += 1;
        self.last_score = snapshot.score;
    }

    fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ColumnMatched { column, color, .. } => {
                log::info!("Column {} cleared in {:?}", column, color)
            }
            GameEvent::ScoreChanged { score } => log::info!("Score: {}", score),
            GameEvent::PromptShown => log::info!("Prompt button shown"),
            other => log::debug!("{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GridConfig;
    use crate::sim::press_reset;

    #[derive(Default)]
    struct Recorder {
        events: Vec<GameEvent>,
        snapshots: Vec<Snapshot>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, snapshot: &Snapshot) {
            self.snapshots.push(snapshot.clone());
        }

        fn handle_event(&mut self, event: &GameEvent) {
            self.events.push(event.clone());
        }
    }

    #[test]
    fn test_report_drains_events_then_presents() {
        let mut state = GameState::new(GridConfig::default(), 11);
        let mut recorder = Recorder::default();

        report(&mut state, &mut recorder);
        assert_eq!(recorder.events, vec![GameEvent::GridCreated { blocks: 100 }]);
        assert_eq!(recorder.snapshots.len(), 1);
        assert!(state.events.is_empty());

        // Nothing new happened
        report(&mut state, &mut recorder);
        assert_eq!(recorder.events.len(), 1);
        assert_eq!(recorder.snapshots.len(), 2);
    }

    #[test]
    fn test_snapshot_positions_on_cylinder() {
        let state = GameState::new(GridConfig::default(), 11);
        let snapshot = Snapshot::capture(&state);
        assert_eq!(snapshot.blocks.len(), 100);
        for view in &snapshot.blocks {
            let [x, y, z] = view.position;
            assert!(((x * x + z * z).sqrt() - 9.0).abs() < 1e-4);
            assert!((y - view.row as f32 * 2.5).abs() < 1e-5);
        }
        let json = snapshot.to_json().unwrap();
        assert!(json.starts_with("{\"score\":0"));
    }

    #[test]
    fn test_log_presenter_tracks_score() {
        let mut state = GameState::new(GridConfig::default(), 11);
        let mut presenter = LogPresenter::default();
        state.add_score(10);
        report(&mut state, &mut presenter);
        assert_eq!(presenter.last_score, 10);

        press_reset(&mut state);
        report(&mut state, &mut presenter);
        assert_eq!(presenter.last_score, 0);
        assert_eq!(presenter.frames, 2);
    }
}
