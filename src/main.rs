/// Entry point and game loop.

mod ui;

use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rockfall::config::GameConfig;
use rockfall::sim::event::GameEvent;
use rockfall::sim::input::read_direction;
use rockfall::sim::level::{self, Level};
use rockfall::sim::step;
use rockfall::sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::{KeyboardState, KEYS_NEXT, KEYS_PAUSE, KEYS_QUIT, KEYS_RESET};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;
use ui::sprites::GlyphSheet;

const LOG_FILE: &str = "rockfall.log";

fn main() -> Result<()> {
    init_tracing()?;

    let config = GameConfig::load();
    let levels: Vec<Level> = config.levels.iter().map(|spec| spec.build()).collect();
    let mut world = WorldState::new(levels, config.speed.physics_interval);
    let (win_w, win_h) = config.window_size();
    info!(
        title = %config.display.title,
        window = %format!("{win_w}x{win_h}"),
        levels = world.levels.len(),
        physics_interval = world.physics_interval(),
        "session started"
    );

    let (sheet, notice) = match GlyphSheet::load(&config.display.sprite_sheet) {
        Ok(sheet) => (sheet, None),
        Err(e) => {
            warn!("{e:#}");
            (GlyphSheet::builtin(), Some(format!("{e:#}")))
        }
    };

    let mut renderer = Renderer::new(sheet, notice);
    renderer.init(&config.display.title).context("terminal init failed")?;
    let honor_release = enable_key_release();

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config, honor_release);

    if honor_release {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    renderer.cleanup().context("terminal cleanup failed")?;

    result?;
    println!("Thanks for playing {}!", config.display.title);
    Ok(())
}

/// Log to a file so the terminal UI stays clean. RUST_LOG overrides "info".
fn init_tracing() -> Result<()> {
    let file = File::create(LOG_FILE).with_context(|| format!("cannot create {LOG_FILE}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// Ask the terminal for Release events. Returns whether it agreed.
fn enable_key_release() -> bool {
    if !terminal::supports_keyboard_enhancement().unwrap_or(false) {
        return false;
    }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    honor_release: bool,
) -> Result<()> {
    let mut kb = KeyboardState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    info!(connected = gp.connected, "gamepad state");
    let frame_time = Duration::from_millis(config.speed.frame_ms);
    let mut paused = false;

    loop {
        let frame_start = Instant::now();
        kb.drain_events();
        gp.update();

        match handle_meta(world, &kb, &gp, &mut paused) {
            Meta::Quit => break,
            Meta::Handled(events) => process_sound_events(sound, &events),
            Meta::None if !paused => {
                let input = read_direction(&(&kb, &gp));
                let events = step::frame(world, input);
                process_sound_events(sound, &events);
            }
            Meta::None => {}
        }

        renderer.render(world, paused).context("render failed")?;

        if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(())
}

enum Meta {
    None,
    Handled(Vec<GameEvent>),
    Quit,
}

/// Host-level keys: quit, pause, reset, skip. A handled key consumes the
/// frame.
fn handle_meta(world: &mut WorldState, kb: &KeyboardState, gp: &GamepadState, paused: &mut bool) -> Meta {
    if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
        return Meta::Quit;
    }

    if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
        *paused = !*paused;
        info!(paused = *paused, "pause toggled");
        return Meta::Handled(Vec::new());
    }
    if *paused {
        return Meta::None;
    }

    let mut events = Vec::new();
    if kb.any_pressed(KEYS_RESET) || gp.reset_pressed() {
        level::reset_level(world, &mut events);
    } else if kb.any_pressed(KEYS_NEXT) {
        level::advance_level(world, &mut events);
    } else {
        return Meta::None;
    }
    Meta::Handled(events)
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::GemCollected { .. } => sfx.play_gem(),
            GameEvent::ExitOpened { .. } => sfx.play_exit_open(),
            GameEvent::RockPushed { .. } => sfx.play_push(),
            GameEvent::PlayerCrushed { .. } => sfx.play_crush(),
            GameEvent::LevelAdvanced { .. } => sfx.play_level(),
            _ => {}
        }
    }
}
