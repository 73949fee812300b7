mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stderr, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use space_blaster::config::GameConfig;
use space_blaster::error::GameResult;
use space_blaster::input::LogicalKey;
use space_blaster::render::{AudioBackend, AudioContext, SoundEffect};
use space_blaster::scenes::SceneMachine;

use display::TerminalRenderer;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

#[derive(Parser, Debug)]
#[command(name = "space_blaster", about = "Top-down arcade shooter for the terminal")]
struct Args {
    /// TOML file with gameplay tuning; defaults are used if it is missing.
    #[arg(long, default_value = "space_blaster.toml")]
    config: PathBuf,

    /// Where log output goes (the terminal is busy drawing the game).
    #[arg(long, default_value = "space_blaster.log")]
    log_file: PathBuf,

    /// Seed for enemy spawns and pickup drops.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the terminal bell.
    #[arg(long)]
    mute: bool,
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// Rings the terminal bell for the louder effects.
struct BellAudio;

impl AudioBackend for BellAudio {
    fn init(&mut self) -> GameResult<()> {
        Ok(())
    }

    fn play(&mut self, effect: SoundEffect) {
        if matches!(effect, SoundEffect::Explosion | SoundEffect::Powerup) {
            let mut err = stderr();
            let _ = err.write_all(b"\x07");
            let _ = err.flush();
        }
    }

    fn start_music(&mut self) {}
}

// ── Key mapping ───────────────────────────────────────────────────────────────

fn logical_key(code: KeyCode) -> Option<LogicalKey> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(LogicalKey::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(LogicalKey::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(LogicalKey::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(LogicalKey::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Some(LogicalKey::Confirm),
        KeyCode::Esc | KeyCode::Backspace => Some(LogicalKey::Back),
        _ => None,
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Drive the scene machine until the player exits from the main menu.
///
/// Input model: every logical key that goes down is forwarded to the machine
/// immediately.  On keyboard-enhancement capable terminals the matching
/// `Release` event lifts it again.  Classic terminals never send releases, so
/// the last frame each key was seen is recorded and keys silent for longer
/// than `HOLD_WINDOW` frames are lifted synthetically.
fn game_loop<W: Write>(
    out: &mut W,
    machine: &mut SceneMachine<TerminalRenderer>,
    rx: &mpsc::Receiver<Event>,
    keyboard_enhanced: bool,
) -> std::io::Result<()> {
    let mut key_frame: HashMap<LogicalKey, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last_tick = Instant::now();

    while !machine.is_finished() {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            if kind == KeyEventKind::Press
                && code == KeyCode::Char('c')
                && modifiers.contains(KeyModifiers::CONTROL)
            {
                info!("interrupted");
                return Ok(());
            }
            let Some(key) = logical_key(code) else {
                continue;
            };
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    machine.key_down(key);
                    key_frame.insert(key, frame);
                }
                KeyEventKind::Release => {
                    machine.key_up(key);
                    key_frame.remove(&key);
                }
            }
        }

        if !keyboard_enhanced {
            key_frame.retain(|key, last| {
                let live = frame.saturating_sub(*last) <= HOLD_WINDOW;
                if !live {
                    machine.key_up(*key);
                }
                live
            });
        }

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last_tick).as_millis() as u64;
        last_tick = now;
        machine.tick(elapsed_ms);

        let (cols, rows) = terminal::size()?;
        machine.renderer().render(out, cols, rows)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = GameConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let audio = if args.mute {
        AudioContext::silent()
    } else {
        AudioContext::new(Box::new(BellAudio))
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, config = %args.config.display(), "starting");

    let mut machine = SceneMachine::new(TerminalRenderer::new(), audio, config, seed);

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to HOLD_WINDOW.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    if !keyboard_enhanced {
        warn!("terminal does not report key releases; emulating held keys");
    }

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = game_loop(&mut out, &mut machine, &rx, keyboard_enhanced);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!("bye");
    Ok(result?)
}
