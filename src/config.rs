use serde::{Deserialize, Serialize};
use std::{
    sync::{OnceLock, RwLock},
    time::Duration,
};

const DEFAULT_TIMEOUT: u64 = 5;

/// Options handed to every `ssh` invocation as `-o <option>`.
///
/// Host keys are not checked and password prompts are disabled, so a
/// command either runs non-interactively or fails.
pub const DEFAULT_SSH_OPTIONS: &[&str] = &[
    "StrictHostKeyChecking=no",
    "UserKnownHostsFile=/dev/null",
    "LogLevel=ERROR",
    "PasswordAuthentication=no",
    "BatchMode=yes",
];

/// How commands are executed.
///
/// Installed process-wide with [`set_config`]; every [`Path`](crate::Path)
/// operation reads the current value when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum time a single command may run.
    /// Default: 5 seconds
    #[serde(with = "secs")]
    pub timeout: Duration,
    /// Maximum time for commands that move file contents: `read`, `write`
    /// and every rsync copy or move. `None` waits for as long as it takes.
    /// Default: `None`
    #[serde(with = "opt_secs")]
    pub transfer_timeout: Option<Duration>,
    pub ssh_program: String,
    pub rsync_program: String,
    pub ssh_options: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            transfer_timeout: None,
            ssh_program: "ssh".to_owned(),
            rsync_program: "rsync".to_owned(),
            ssh_options: DEFAULT_SSH_OPTIONS.iter().map(|o| (*o).to_owned()).collect(),
        }
    }
}

impl Config {
    /// Set the maximum command time in seconds.
    pub fn set_timeout(&mut self, secs: u64) {
        self.timeout = Duration::from_secs(secs);
    }

    /// The `ssh` command line prefix shared by remote commands and rsync's `-e`.
    pub(crate) fn ssh_args(&self) -> Vec<String> {
        self.ssh_options
            .iter()
            .flat_map(|option| ["-o".to_owned(), option.to_owned()])
            .collect()
    }
}

fn global() -> &'static RwLock<Config> {
    static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

/// Returns a copy of the process-wide configuration.
pub fn config() -> Config {
    match global().read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replaces the process-wide configuration.
pub fn set_config(config: Config) {
    match global().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod opt_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => serializer.serialize_some(&duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|secs| secs.map(Duration::from_secs))
    }
}
