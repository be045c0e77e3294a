//! Session layer: game state plus leaderboard persistence
//!
//! `sim::tick` stays pure; everything that touches a store goes through
//! here. The shell owns one `Session` and calls [`Session::advance`] once
//! per fixed timestep.

use crate::leaderboard::{Leaderboard, LeaderboardEntry, ScoreStore};
use crate::sim::{GameEvent, GamePhase, GameState, Playfield, TickInput, tick};

pub struct Session<S: ScoreStore> {
    pub state: GameState,
    pub leaderboard: Leaderboard,
    store: S,
}

impl<S: ScoreStore> Session<S> {
    /// Load the leaderboard once and start at the menu
    pub fn new(seed: u64, store: S) -> Self {
        Self {
            state: GameState::new(seed),
            leaderboard: store.load(),
            store,
        }
    }

    /// One fixed timestep. `now_ms` is the wall-clock timestamp recorded on
    /// leaderboard entries; it never reaches the simulation.
    pub fn advance(&mut self, input: &TickInput, field: &dyn Playfield, now_ms: f64) {
        if self.state.phase == GamePhase::Recording {
            if let Some(name) = &input.submit_name {
                self.submit(name.clone(), now_ms);
                return;
            }
        }

        tick(&mut self.state, input, field);

        // Quit routes end screens through Recording; skip the name prompt
        // when the run wouldn't make the board anyway
        if self.state.phase == GamePhase::Recording && !self.run_qualifies() {
            self.state.phase = GamePhase::Menu;
            self.state.demo.reset();
        }
    }

    /// Would the current run make the leaderboard?
    pub fn run_qualifies(&self) -> bool {
        self.leaderboard
            .qualifies(self.state.session.level, self.state.session.total_probes)
    }

    fn submit(&mut self, name: String, now_ms: f64) {
        let trimmed = name.trim();
        let entry = LeaderboardEntry {
            name: if trimmed.is_empty() {
                "???".to_string()
            } else {
                trimmed.chars().take(12).collect()
            },
            level: self.state.session.level,
            total_probes: self.state.session.total_probes,
            timestamp: now_ms,
        };

        if let Some(rank) = self.leaderboard.record(entry.clone()) {
            self.store.append(&entry);
            self.state.events.push(GameEvent::ScoreRecorded { rank });
            log::info!("score recorded: {} at rank {rank}", entry.name);
        }

        self.state.phase = GamePhase::Menu;
        self.state.demo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardLayout;
    use crate::leaderboard::{MAX_ENTRIES, MemoryStore};

    fn field() -> BoardLayout {
        BoardLayout::new(600.0, 700.0, 5)
    }

    fn quit_input() -> TickInput {
        TickInput { quit: true, ..Default::default() }
    }

    fn lost_session(store: MemoryStore) -> Session<MemoryStore> {
        let mut session = Session::new(7, store);
        session.state.start_level(3);
        session.state.session.total_probes = 14;
        session.state.phase = GamePhase::Lost;
        session.state.take_events();
        session
    }

    #[test]
    fn test_qualifying_quit_prompts_for_name() {
        let f = field();
        let mut session = lost_session(MemoryStore::default());

        session.advance(&quit_input(), &f, 0.0);
        assert_eq!(session.state.phase, GamePhase::Recording);
    }

    #[test]
    fn test_submit_records_appends_and_returns_to_menu() {
        let f = field();
        let mut session = lost_session(MemoryStore::default());
        session.advance(&quit_input(), &f, 0.0);

        let submit = TickInput {
            submit_name: Some("  Ada  ".to_string()),
            ..Default::default()
        };
        session.advance(&submit, &f, 1000.0);

        assert_eq!(session.state.phase, GamePhase::Menu);
        assert_eq!(session.leaderboard.entries.len(), 1);
        let entry = &session.leaderboard.entries[0];
        assert_eq!(entry.name, "Ada");
        assert_eq!(entry.level, 3);
        assert_eq!(entry.total_probes, 14);
        assert_eq!(session.store.sequence.len(), 1);
        assert!(
            session
                .state
                .take_events()
                .contains(&GameEvent::ScoreRecorded { rank: 1 })
        );
    }

    #[test]
    fn test_empty_name_gets_placeholder() {
        let f = field();
        let mut session = lost_session(MemoryStore::default());
        session.advance(&quit_input(), &f, 0.0);

        let submit = TickInput {
            submit_name: Some("   ".to_string()),
            ..Default::default()
        };
        session.advance(&submit, &f, 0.0);
        assert_eq!(session.leaderboard.entries[0].name, "???");
    }

    #[test]
    fn test_unqualified_run_skips_recording() {
        // Fill the board with runs this one can't beat
        let mut store = MemoryStore::default();
        for i in 0..MAX_ENTRIES as u32 {
            store.sequence.push(LeaderboardEntry {
                name: "x".to_string(),
                level: 20,
                total_probes: 5,
                timestamp: i as f64,
            });
        }

        let f = field();
        let mut session = lost_session(store);
        session.advance(&quit_input(), &f, 0.0);

        assert_eq!(session.state.phase, GamePhase::Menu);
        assert_eq!(session.store.sequence.len(), MAX_ENTRIES);
    }
}
