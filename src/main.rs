use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use mathflow::{
    app::{App, Screen},
    drill::DEFAULT_TARGET,
    generator::Mode,
    runtime::{CrosstermEventSource, DrillEvent, Runner},
    store::{FilePrefsStore, FileStatsStore},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// fast-paced mental arithmetic drill for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A mental arithmetic drill: solve randomly generated problems against the clock, build streaks, and chase your best-ever results across sessions."
)]
pub struct Cli {
    /// start straight into this mode, skipping the menu
    #[clap(short, long, value_enum)]
    mode: Option<Mode>,

    /// correct answers required to finish a run
    #[clap(short, long, default_value_t = DEFAULT_TARGET)]
    target: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        cli.target.max(1),
        Box::new(FileStatsStore::new()),
        Box::new(FilePrefsStore::new()),
    );
    if let Some(mode) = cli.mode {
        app.start(mode);
    }

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            DrillEvent::Tick => {
                app.on_tick();
                // Redraw on ticks only while the game view is live; the qpm
                // readout and the flash/shake pulses are the only things
                // that move without a keystroke
                if app.screen() == Screen::Active || app.is_animating() {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            DrillEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            DrillEvent::Key(key) => {
                app.handle_key(key);
                if app.should_quit {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}
