use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable that pre-fills the directory prompt.
pub const DIR_ENV_VAR: &str = "CACHEWARM_DIR";
/// Older name of [`DIR_ENV_VAR`], honored when the new one is unset or empty.
pub const LEGACY_DIR_ENV_VAR: &str = "CACHE_THIS_DIR";

// Directory reads in flight, by kind of storage.
const ROTATIONAL_IO: usize = 32;
const SOLID_STATE_IO: usize = 128;
const UNKNOWN_IO: usize = 64;
/// Floor for the descriptor-limited concurrency.
const MIN_IO: usize = 16;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Upper bound on concurrent directory reads during a scan.
    pub max_concurrent_io: usize,
    pub follow_symlinks: bool,
    /// Pre-fills the prompt; the root of a headless run.
    pub default_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let wanted = match rotational_storage() {
            Some(true) => ROTATIONAL_IO,
            Some(false) => SOLID_STATE_IO,
            None => UNKNOWN_IO,
        };
        Self {
            max_concurrent_io: cap_concurrency(wanted, fd_soft_limit()),
            follow_symlinks: false,
            default_path: None,
        }
    }
}

impl Settings {
    /// Defaults plus whatever the environment provides.
    pub fn from_env() -> Self {
        Self {
            default_path: default_path_from(
                std::env::var_os(DIR_ENV_VAR),
                std::env::var_os(LEGACY_DIR_ENV_VAR),
            ),
            ..Self::default()
        }
    }

    /// Text shown in the path prompt at startup.
    pub fn initial_input(&self) -> String {
        self.default_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Picks the default directory from the current and the legacy variable.
/// The first non-empty value wins.
pub fn default_path_from(current: Option<OsString>, legacy: Option<OsString>) -> Option<PathBuf> {
    [current, legacy]
        .into_iter()
        .flatten()
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Limits `wanted` so a quarter of the descriptor limit stays free for the
/// read worker, the terminal and the channels.
pub fn cap_concurrency(wanted: usize, fd_limit: Option<u64>) -> usize {
    match fd_limit {
        Some(limit) => wanted.min((limit / 4 * 3) as usize).max(MIN_IO),
        None => wanted,
    }
}

/// Whether the disks behind the system spin. `None` if that can't be told.
fn rotational_storage() -> Option<bool> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_dir("/sys/block")
            .ok()?
            .flatten()
            .filter(|dev| {
                let name = dev.file_name();
                let name = name.to_string_lossy();
                name.starts_with("sd") || name.starts_with("nvme")
            })
            .find_map(|dev| std::fs::read_to_string(dev.path().join("queue/rotational")).ok())
            .and_then(|flag| match flag.trim() {
                "0" => Some(false),
                "1" => Some(true),
                _ => None,
            })
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Soft limit on open file descriptors, when finite.
fn fd_soft_limit() -> Option<u64> {
    #[cfg(unix)]
    {
        let mut rlim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: getrlimit only writes into `rlim`.
        let ret = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut rlim) };
        (ret == 0 && rlim.rlim_cur != libc::RLIM_INFINITY).then_some(rlim.rlim_cur as u64)
    }
    #[cfg(not(unix))]
    {
        None
    }
}
