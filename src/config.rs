/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::domain::grid::{GRID_HEIGHT, GRID_WIDTH};
use crate::sim::level::{default_specs, LevelSpec};
use crate::sim::world::DEFAULT_PHYSICS_INTERVAL;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    pub levels: Vec<LevelSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedConfig {
    pub frame_ms: u64,
    pub physics_interval: u32,   // physics every Nth frame, at least 1
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub tile_draw_size: u32,
    pub sprite_sheet: PathBuf,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadConfig {
    pub reset: Vec<String>,
    pub pause: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    levels: Vec<TomlLevel>,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_physics_interval")]
    physics_interval: u32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_tile_draw_size")]
    tile_draw_size: u32,
    #[serde(default = "default_sprite_sheet")]
    sprite_sheet: String,
    #[serde(default = "default_title")]
    title: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_reset")]
    reset: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLevel {
    name: Option<String>,
    seed: u64,
    rocks: u32,
    gems: u32,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }      // ~60 frames per second
fn default_physics_interval() -> u32 { DEFAULT_PHYSICS_INTERVAL }
fn default_tile_draw_size() -> u32 { 64 }
fn default_sprite_sheet() -> String { "assets/sprites.txt".into() }
fn default_title() -> String { "Rockfall".into() }

fn default_reset() -> Vec<String> { vec!["Select".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Mode".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            frame_ms: default_frame_ms(),
            physics_interval: default_physics_interval(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            tile_draw_size: default_tile_draw_size(),
            sprite_sheet: default_sprite_sheet(),
            title: default_title(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            reset: default_reset(),
            pause: default_pause(),
            quit: default_quit(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config from TOML text. Parse errors yield the defaults.
    pub fn parse(text: &str) -> Self {
        let toml_cfg = match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("config.toml parse error, using default settings: {e}");
                TomlConfig::default()
            }
        };
        GameConfig::from_toml(toml_cfg, &[])
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let physics_interval = if toml_cfg.speed.physics_interval == 0 {
            warn!("speed.physics_interval must be at least 1, using 1");
            1
        } else {
            toml_cfg.speed.physics_interval
        };

        GameConfig {
            speed: SpeedConfig {
                frame_ms: toml_cfg.speed.frame_ms,
                physics_interval,
            },
            display: DisplayConfig {
                tile_draw_size: toml_cfg.display.tile_draw_size,
                sprite_sheet: resolve_path(&toml_cfg.display.sprite_sheet, search_dirs),
                title: toml_cfg.display.title,
            },
            gamepad: GamepadConfig {
                reset: toml_cfg.gamepad.reset,
                pause: toml_cfg.gamepad.pause,
                quit: toml_cfg.gamepad.quit,
            },
            levels: validated_levels(toml_cfg.levels),
        }
    }

    /// Window size in pixels a tile-drawing host would request.
    pub fn window_size(&self) -> (u32, u32) {
        (
            GRID_WIDTH as u32 * self.display.tile_draw_size,
            GRID_HEIGHT as u32 * self.display.tile_draw_size,
        )
    }
}

/// Keep the configured levels that pass validation. No configured levels,
/// or none valid, means the built-in sequence.
fn validated_levels(levels: Vec<TomlLevel>) -> Vec<LevelSpec> {
    if levels.is_empty() {
        return default_specs();
    }

    let specs: Vec<LevelSpec> = levels
        .into_iter()
        .enumerate()
        .map(|(i, l)| {
            let name = l.name.unwrap_or_else(|| format!("Level {}", i + 1));
            LevelSpec::new(&name, l.seed, l.rocks, l.gems)
        })
        .filter(|spec| match spec.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("skipping level: {e}");
                false
            }
        })
        .collect();

    if specs.is_empty() {
        warn!("no valid levels configured, using the built-in levels");
        return default_specs();
    }
    info!(count = specs.len(), "levels configured");
    specs
}

/// Absolute paths are kept; relative ones are looked up in the candidate
/// directories, defaulting to relative-to-CWD.
fn resolve_path(path: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(p))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| p.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        info!(path = %path.display(), "config loaded");
                        return cfg;
                    }
                    Err(e) => {
                        warn!("config.toml parse error, using default settings: {e}");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
