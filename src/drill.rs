use crate::generator::{Mode, Problem, ProblemGenerator};
use crate::pulse::Pulse;
use std::time::{Duration, SystemTime};

/// Correct answers required to finish a run
pub const DEFAULT_TARGET: usize = 20;

const FLASH_DURATION: Duration = Duration::from_millis(300);
const SHAKE_DURATION: Duration = Duration::from_millis(400);

#[derive(Clone, Debug, Copy, PartialEq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// One in-progress drill run: the current problem, the pending typed digits
/// and the streak/accuracy/throughput bookkeeping.
///
/// Constructing a `Drill` starts the run; the not-started state is simply
/// the absence of a drill at the app layer.
#[derive(Debug)]
pub struct Drill {
    pub generator: ProblemGenerator,
    pub target: usize,
    pub problem: Option<Problem>,
    pub input: String,
    pub combo: usize,
    pub correct_count: usize,
    pub total_attempts: usize,
    pub qpm: u64,
    pub started_at: SystemTime,
    pub finished_at: Option<SystemTime>,
    pub flash: Pulse,
    pub shake: Pulse,
}

impl Drill {
    pub fn new(mode: Mode, target: usize) -> Self {
        let generator = ProblemGenerator::new(mode);
        Self {
            problem: Some(generator.generate()),
            generator,
            target,
            input: String::new(),
            combo: 0,
            correct_count: 0,
            total_attempts: 0,
            qpm: 0,
            started_at: SystemTime::now(),
            finished_at: None,
            flash: Pulse::new(),
            shake: Pulse::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.generator.mode()
    }

    pub fn has_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Feed the full typed buffer through the sanitize-and-score path.
    ///
    /// Digits are kept, everything else dropped. An exact match scores a
    /// correct answer; a non-matching entry at least as long as the answer
    /// scores an incorrect one; anything shorter stays pending and editable.
    pub fn submit(&mut self, raw: &str) -> Option<Outcome> {
        if self.has_finished() {
            return None;
        }
        let answer = match &self.problem {
            Some(problem) => problem.answer.to_string(),
            None => return None,
        };

        let clean: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        if clean == answer {
            self.record_correct();
            Some(Outcome::Correct)
        } else if clean.len() >= answer.len() {
            self.record_incorrect();
            Some(Outcome::Incorrect)
        } else {
            self.input = clean;
            None
        }
    }

    /// Keypad path: append one digit and run it through `submit`
    pub fn push_digit(&mut self, digit: char) -> Option<Outcome> {
        if !digit.is_ascii_digit() {
            return None;
        }
        let mut buffer = self.input.clone();
        buffer.push(digit);
        self.submit(&buffer)
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Keypad clear event
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    fn record_correct(&mut self) {
        self.combo += 1;
        self.correct_count += 1;
        self.total_attempts += 1;
        self.input.clear();

        if self.correct_count >= self.target {
            let now = SystemTime::now();
            self.finished_at = Some(now);
            self.problem = None;
            // Final recompute so the summary never shows a tick-stale value
            self.qpm = self.qpm_at(now);
            self.flash.cancel();
            self.shake.cancel();
        } else {
            self.flash.fire(FLASH_DURATION);
            self.problem = Some(self.generator.generate());
        }
    }

    fn record_incorrect(&mut self) {
        self.combo = 0;
        self.total_attempts += 1;
        self.input.clear();
        self.shake.fire(SHAKE_DURATION);
    }

    /// ~1 Hz while running: refresh qpm from wall-clock elapsed time and
    /// expire the transient pulses. Dropped ticks are harmless since nothing
    /// here accumulates per tick.
    pub fn on_tick(&mut self) {
        let now = SystemTime::now();
        self.flash.expire(now);
        self.shake.expire(now);

        if !self.has_finished() {
            self.qpm = self.qpm_at(now);
        }
    }

    fn qpm_at(&self, now: SystemTime) -> u64 {
        if self.correct_count == 0 {
            return 0;
        }
        let elapsed_mins = now
            .duration_since(self.started_at)
            .unwrap_or_default()
            .as_secs_f64()
            / 60.0;
        if elapsed_mins <= f64::EPSILON {
            return 0;
        }
        (self.correct_count as f64 / elapsed_mins).round() as u64
    }

    /// Fraction of the target already solved, in [0, 1]
    pub fn progress(&self) -> f64 {
        self.correct_count as f64 / self.target as f64
    }

    /// Percent of submissions that were correct; 100 before any attempt
    pub fn accuracy(&self) -> u32 {
        if self.total_attempts == 0 {
            return 100;
        }
        ((self.correct_count as f64 / self.total_attempts as f64) * 100.0).round() as u32
    }

    /// Whole seconds from start to completion; only meaningful once finished
    pub fn elapsed_secs(&self) -> u64 {
        match self.finished_at {
            Some(end) => end
                .duration_since(self.started_at)
                .unwrap_or_default()
                .as_secs_f64()
                .round() as u64,
            None => 0,
        }
    }

    /// Cancel any pending delayed mutations; called when the active screen
    /// is torn down so nothing fires against a discarded session
    pub fn abandon(&mut self) {
        self.flash.cancel();
        self.shake.cancel();
    }
}
