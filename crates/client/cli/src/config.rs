//! Terminal host configuration.
use std::env;
use std::path::PathBuf;

/// Everything the terminal host needs before it can open a floor.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Content directory holding `config.toml` and `floors/`.
    pub data_dir: PathBuf,
    pub floor: String,
    /// Tuning file that replaces `<data_dir>/config.toml`.
    pub config_path: Option<PathBuf>,
    /// Frame length used while waiting for the board to settle.
    pub tick_ms: u64,
    /// When set, logs also go to `<log_dir>/tactics.log`.
    pub log_dir: Option<PathBuf>,
    /// Echo every bus event as a JSON line.
    pub echo_events: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("crates/game/content/data"),
            floor: "training_ground".to_owned(),
            config_path: None,
            tick_ms: 16,
            log_dir: None,
            echo_events: true,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `TACTICS_DATA_DIR`
    /// - `TACTICS_FLOOR`
    /// - `TACTICS_CONFIG`
    /// - `TACTICS_TICK_MS`
    /// - `TACTICS_LOG_DIR`
    /// - `TACTICS_ECHO_EVENTS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("TACTICS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(floor) = env::var("TACTICS_FLOOR")
            && !floor.trim().is_empty()
        {
            config.floor = floor.trim().to_owned();
        }

        config.config_path = env::var_os("TACTICS_CONFIG").map(PathBuf::from);

        if let Some(tick_ms) = read_env::<u64>("TACTICS_TICK_MS") {
            config.tick_ms = tick_ms.max(1);
        }

        config.log_dir = env::var_os("TACTICS_LOG_DIR").map(PathBuf::from);

        if let Some(echo) = read_env::<bool>("TACTICS_ECHO_EVENTS") {
            config.echo_events = echo;
        }

        config
    }

    /// Frame length in seconds, as fed to `Session::tick`.
    pub fn frame_seconds(&self) -> f32 {
        self.tick_ms as f32 / 1000.0
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
