use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::drill::{Drill, Outcome};
use crate::generator::Mode;
use crate::store::{LifetimeStats, Preferences, PrefsStore, StatsStore};

/// Which screen the app is showing; derived from session state, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Active,
    Summary,
}

/// Top-level controller: owns the optional running drill, the persisted
/// lifetime stats and preferences, and routes key intents.
pub struct App {
    pub drill: Option<Drill>,
    pub target: usize,
    pub lifetime: LifetimeStats,
    pub prefs: Preferences,
    /// Reset-progress is irreversible; arm it and require a second key
    pub confirm_reset: bool,
    pub should_quit: bool,
    stats_store: Box<dyn StatsStore>,
    prefs_store: Box<dyn PrefsStore>,
}

impl App {
    pub fn new(
        target: usize,
        stats_store: Box<dyn StatsStore>,
        prefs_store: Box<dyn PrefsStore>,
    ) -> Self {
        // Both records are read once at startup; defaults cover missing or
        // unparseable files
        let lifetime = stats_store.load();
        let prefs = prefs_store.load();
        Self {
            drill: None,
            target,
            lifetime,
            prefs,
            confirm_reset: false,
            should_quit: false,
            stats_store,
            prefs_store,
        }
    }

    pub fn screen(&self) -> Screen {
        match &self.drill {
            None => Screen::Menu,
            Some(drill) if drill.has_finished() => Screen::Summary,
            Some(_) => Screen::Active,
        }
    }

    pub fn start(&mut self, mode: Mode) {
        self.confirm_reset = false;
        self.drill = Some(Drill::new(mode, self.target));
    }

    /// Discard the session and return to the menu, cancelling any pending
    /// delayed mutations first
    pub fn back_to_menu(&mut self) {
        if let Some(drill) = self.drill.as_mut() {
            drill.abandon();
        }
        self.drill = None;
    }

    pub fn on_tick(&mut self) {
        if let Some(drill) = self.drill.as_mut() {
            drill.on_tick();
        }
    }

    /// True while something on screen is animating and ticks should redraw
    pub fn is_animating(&self) -> bool {
        self.drill
            .as_ref()
            .map(|d| d.flash.is_active() || d.shake.is_active())
            .unwrap_or(false)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen() {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Active => self.handle_active_key(key),
            Screen::Summary => self.handle_summary_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        if self.confirm_reset {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.reset_progress(),
                _ => self.confirm_reset = false,
            }
            return;
        }

        match key.code {
            KeyCode::Char('1') | KeyCode::Char('a') => self.start(Mode::Addition),
            KeyCode::Char('2') | KeyCode::Char('s') => self.start(Mode::Subtraction),
            KeyCode::Char('3') | KeyCode::Char('m') => self.start(Mode::Multiplication),
            KeyCode::Char('4') | KeyCode::Char('x') => self.start(Mode::Mixed),
            KeyCode::Char('d') => self.toggle_dark_mode(),
            KeyCode::Char('r') => self.confirm_reset = true,
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_active_key(&mut self, key: KeyEvent) {
        let Some(drill) = self.drill.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let outcome = drill.push_digit(c);
                let combo = drill.combo;
                if let Some(Outcome::Correct) = outcome {
                    self.record_lifetime_correct(combo);
                }
            }
            KeyCode::Backspace => drill.backspace(),
            KeyCode::Delete | KeyCode::Char('c') => drill.clear_input(),
            KeyCode::Esc => self.back_to_menu(),
            _ => {}
        }
    }

    fn handle_summary_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => {
                if let Some(mode) = self.drill.as_ref().map(|d| d.mode()) {
                    self.start(mode);
                }
            }
            KeyCode::Char('m') => self.back_to_menu(),
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    /// Exactly one lifetime transition and one write per correct answer
    fn record_lifetime_correct(&mut self, combo: usize) {
        self.lifetime.record_correct(combo);
        let _ = self.stats_store.save(&self.lifetime);
    }

    pub fn toggle_dark_mode(&mut self) {
        self.prefs.dark_mode = !self.prefs.dark_mode;
        let _ = self.prefs_store.save(&self.prefs);
    }

    fn reset_progress(&mut self) {
        self.lifetime = LifetimeStats::default();
        let _ = self.stats_store.clear();
        self.confirm_reset = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::DEFAULT_TARGET;
    use crate::generator::Problem;
    use crate::store::{FilePrefsStore, FileStatsStore};
    use tempfile::{tempdir, TempDir};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let stats = FileStatsStore::with_path(dir.path().join("stats.json"));
        let prefs = FilePrefsStore::with_path(dir.path().join("settings.json"));
        let app = App::new(DEFAULT_TARGET, Box::new(stats), Box::new(prefs));
        (app, dir)
    }

    fn install_problem(app: &mut App, question: &str, answer: u32) {
        let drill = app.drill.as_mut().unwrap();
        drill.problem = Some(Problem {
            question: question.to_string(),
            answer,
        });
    }

    #[test]
    fn test_screen_derivation() {
        let (mut app, _dir) = test_app();
        assert_eq!(app.screen(), Screen::Menu);

        app.start(Mode::Addition);
        assert_eq!(app.screen(), Screen::Active);

        app.drill.as_mut().unwrap().finished_at = Some(std::time::SystemTime::now());
        assert_eq!(app.screen(), Screen::Summary);

        app.back_to_menu();
        assert_eq!(app.screen(), Screen::Menu);
    }

    #[test]
    fn test_menu_keys_start_each_mode() {
        let cases = [
            (KeyCode::Char('1'), Mode::Addition),
            (KeyCode::Char('2'), Mode::Subtraction),
            (KeyCode::Char('3'), Mode::Multiplication),
            (KeyCode::Char('4'), Mode::Mixed),
            (KeyCode::Char('a'), Mode::Addition),
            (KeyCode::Char('s'), Mode::Subtraction),
            (KeyCode::Char('m'), Mode::Multiplication),
            (KeyCode::Char('x'), Mode::Mixed),
        ];
        for (code, mode) in cases {
            let (mut app, _dir) = test_app();
            app.handle_key(key(code));
            assert_eq!(app.screen(), Screen::Active);
            assert_eq!(app.drill.as_ref().unwrap().mode(), mode);
        }
    }

    #[test]
    fn test_correct_answer_updates_lifetime_once() {
        let (mut app, dir) = test_app();
        app.start(Mode::Addition);
        install_problem(&mut app, "3 + 4", 7);

        app.handle_key(key(KeyCode::Char('7')));

        assert_eq!(app.lifetime.high_score, 1);
        assert_eq!(app.lifetime.total_solved, 1);

        // The write landed on disk in the same transition
        let reloaded = FileStatsStore::with_path(dir.path().join("stats.json")).load();
        assert_eq!(reloaded, app.lifetime);
    }

    #[test]
    fn test_pending_digit_does_not_touch_lifetime() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Addition);
        install_problem(&mut app, "12 × 12", 144);

        app.handle_key(key(KeyCode::Char('1')));

        assert_eq!(app.lifetime.total_solved, 0);
        assert_eq!(app.drill.as_ref().unwrap().input, "1");
    }

    #[test]
    fn test_incorrect_answer_does_not_touch_lifetime() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Addition);
        install_problem(&mut app, "3 + 4", 7);

        app.handle_key(key(KeyCode::Char('9')));

        assert_eq!(app.lifetime.total_solved, 0);
        assert_eq!(app.drill.as_ref().unwrap().combo, 0);
        assert_eq!(app.drill.as_ref().unwrap().total_attempts, 1);
    }

    #[test]
    fn test_high_score_tracks_best_combo_across_runs() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Addition);
        for _ in 0..3 {
            let answer = app
                .drill
                .as_ref()
                .unwrap()
                .problem
                .as_ref()
                .unwrap()
                .answer
                .to_string();
            for c in answer.chars() {
                app.handle_key(key(KeyCode::Char(c)));
            }
        }
        assert_eq!(app.lifetime.high_score, 3);
        assert_eq!(app.lifetime.total_solved, 3);

        // A fresh run with a shorter streak never lowers the best
        app.back_to_menu();
        app.start(Mode::Addition);
        let answer = app
            .drill
            .as_ref()
            .unwrap()
            .problem
            .as_ref()
            .unwrap()
            .answer
            .to_string();
        for c in answer.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.lifetime.high_score, 3);
        assert_eq!(app.lifetime.total_solved, 4);
    }

    #[test]
    fn test_backspace_and_clear_route_to_drill() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Addition);
        install_problem(&mut app, "12 × 12", 144);

        app.handle_key(key(KeyCode::Char('1')));
        app.handle_key(key(KeyCode::Char('4')));
        assert_eq!(app.drill.as_ref().unwrap().input, "14");

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.drill.as_ref().unwrap().input, "1");

        app.handle_key(key(KeyCode::Delete));
        assert!(app.drill.as_ref().unwrap().input.is_empty());
    }

    #[test]
    fn test_esc_from_active_discards_session() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Mixed);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.screen(), Screen::Menu);
        assert!(app.drill.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_summary_replay_keeps_mode() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Multiplication);
        app.drill.as_mut().unwrap().finished_at = Some(std::time::SystemTime::now());

        app.handle_key(key(KeyCode::Char('r')));

        assert_eq!(app.screen(), Screen::Active);
        assert_eq!(app.drill.as_ref().unwrap().mode(), Mode::Multiplication);
        assert_eq!(app.drill.as_ref().unwrap().correct_count, 0);
    }

    #[test]
    fn test_summary_menu_key_returns_to_menu() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Addition);
        app.drill.as_mut().unwrap().finished_at = Some(std::time::SystemTime::now());

        app.handle_key(key(KeyCode::Char('m')));

        assert_eq!(app.screen(), Screen::Menu);
    }

    #[test]
    fn test_submissions_ignored_on_summary() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Addition);
        let drill = app.drill.as_mut().unwrap();
        drill.finished_at = Some(std::time::SystemTime::now());
        drill.correct_count = DEFAULT_TARGET;

        app.handle_key(key(KeyCode::Char('7')));

        assert_eq!(app.drill.as_ref().unwrap().correct_count, DEFAULT_TARGET);
        assert_eq!(app.lifetime.total_solved, 0);
    }

    #[test]
    fn test_reset_progress_requires_confirmation() {
        let (mut app, dir) = test_app();
        app.lifetime = LifetimeStats {
            high_score: 9,
            total_solved: 90,
        };

        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.confirm_reset);
        assert_eq!(app.lifetime.high_score, 9, "nothing erased before confirming");

        app.handle_key(key(KeyCode::Char('y')));
        assert!(!app.confirm_reset);
        assert_eq!(app.lifetime, LifetimeStats::default());

        // Simulated restart reads the default back
        let reloaded = FileStatsStore::with_path(dir.path().join("stats.json")).load();
        assert_eq!(reloaded, LifetimeStats::default());
    }

    #[test]
    fn test_reset_progress_cancelled_by_other_key() {
        let (mut app, _dir) = test_app();
        app.lifetime = LifetimeStats {
            high_score: 9,
            total_solved: 90,
        };

        app.handle_key(key(KeyCode::Char('r')));
        app.handle_key(key(KeyCode::Char('n')));

        assert!(!app.confirm_reset);
        assert_eq!(app.lifetime.high_score, 9);
        assert_eq!(app.screen(), Screen::Menu);
    }

    #[test]
    fn test_dark_mode_toggle_persists() {
        let (mut app, dir) = test_app();
        assert!(!app.prefs.dark_mode);

        app.handle_key(key(KeyCode::Char('d')));
        assert!(app.prefs.dark_mode);

        let reloaded = FilePrefsStore::with_path(dir.path().join("settings.json")).load();
        assert!(reloaded.dark_mode);
    }

    #[test]
    fn test_esc_and_q_quit_from_menu() {
        let (mut app, _dir) = test_app();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);

        let (mut app, _dir) = test_app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_screen() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Addition);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_plain_c_on_active_clears_instead_of_quitting() {
        let (mut app, _dir) = test_app();
        app.start(Mode::Addition);
        install_problem(&mut app, "12 × 12", 144);
        app.handle_key(key(KeyCode::Char('1')));

        app.handle_key(key(KeyCode::Char('c')));

        assert!(app.drill.as_ref().unwrap().input.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_tick_only_reaches_running_drill() {
        let (mut app, _dir) = test_app();
        // No session: tick is a no-op, not a panic
        app.on_tick();

        app.start(Mode::Addition);
        install_problem(&mut app, "3 + 4", 7);
        app.drill.as_mut().unwrap().started_at =
            std::time::SystemTime::now() - std::time::Duration::from_secs(60);
        app.handle_key(key(KeyCode::Char('7')));
        app.on_tick();
        assert_eq!(app.drill.as_ref().unwrap().qpm, 1);
    }

    #[test]
    fn test_lifetime_loaded_at_startup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        FileStatsStore::with_path(&path)
            .save(&LifetimeStats {
                high_score: 12,
                total_solved: 240,
            })
            .unwrap();

        let stats = FileStatsStore::with_path(&path);
        let prefs = FilePrefsStore::with_path(dir.path().join("settings.json"));
        let app = App::new(DEFAULT_TARGET, Box::new(stats), Box::new(prefs));

        assert_eq!(app.lifetime.high_score, 12);
        assert_eq!(app.lifetime.total_solved, 240);
    }
}
