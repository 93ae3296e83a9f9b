use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::Rng;

/// Operation drilled during a run. "No active game" is represented by the
/// absence of a session, not by a variant, so every mode here is playable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Mode {
    Addition,
    Subtraction,
    Multiplication,
    Mixed,
}

const CONCRETE_MODES: [Mode; 3] = [Mode::Addition, Mode::Subtraction, Mode::Multiplication];

/// A single arithmetic question presented to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub question: String,
    pub answer: u32,
}

impl Problem {
    /// Digit length of the correct answer, used for the too-long-input check
    pub fn answer_len(&self) -> usize {
        self.answer.to_string().len()
    }
}

/// Produces freshly constructed problems for a fixed mode
#[derive(Debug, Clone, Copy)]
pub struct ProblemGenerator {
    mode: Mode,
}

impl ProblemGenerator {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn generate(&self) -> Problem {
        self.generate_with_rng(&mut rand::thread_rng())
    }

    /// Deterministic entry point; `generate` forwards to this with thread_rng
    pub fn generate_with_rng<R: Rng>(&self, rng: &mut R) -> Problem {
        let mode = match self.mode {
            Mode::Mixed => *CONCRETE_MODES.choose(rng).unwrap_or(&Mode::Addition),
            concrete => concrete,
        };

        match mode {
            Mode::Addition => {
                let a = rng.gen_range(1..=10u32);
                let b = rng.gen_range(1..=10u32);
                Problem {
                    question: format!("{} + {}", a, b),
                    answer: a + b,
                }
            }
            Mode::Subtraction => {
                let mut a = rng.gen_range(1..=20u32);
                let mut b = rng.gen_range(1..=10u32);
                if a < b {
                    std::mem::swap(&mut a, &mut b);
                }
                Problem {
                    question: format!("{} - {}", a, b),
                    answer: a - b,
                }
            }
            Mode::Multiplication => {
                let a = rng.gen_range(1..=12u32);
                let b = rng.gen_range(1..=12u32);
                Problem {
                    question: format!("{} × {}", a, b),
                    answer: a * b,
                }
            }
            Mode::Mixed => unreachable!("mixed resolves to a concrete mode above"),
        }
    }
}
