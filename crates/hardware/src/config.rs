//! Configuration system for the simulator.
//!
//! This module defines the configuration structures used to parameterize a
//! run. It provides:
//! 1. **Defaults:** Baseline process identity, stack sizing and TLB capacity.
//! 2. **Structures:** Hierarchical config for general, process, debug and memory settings.
//!
//! Configuration is supplied as JSON through [`Config::from_json`], or use
//! `Config::default()` for a stock single-process run.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values apply whenever a field is absent from the JSON input.
mod defaults {
    /// Host name reported by `uname` and `gethostname`.
    pub const HOSTNAME: &str = "m5.eecs.umich.edu";

    /// Process id of the simulated program.
    pub const PID: u64 = 100;

    /// Parent process id.
    pub const PPID: u64 = 99;

    /// Real and effective user and group ids.
    pub const UID: u64 = 100;

    /// Working directory reported by `getcwd`.
    pub const CWD: &str = "/";

    /// Initial stack reservation (8 MiB).
    pub const STACK_SIZE: u64 = 8 * 1024 * 1024;

    /// Upper bound on stack growth (64 MiB).
    pub const MAX_STACK_SIZE: u64 = 64 * 1024 * 1024;

    /// TLB entry count.
    pub const TLB_ENTRIES: usize = 48;
}

/// Root configuration for the simulator.
///
/// Every section and field is optional in JSON; omitted values take the
/// defaults above.
///
/// # Examples
///
/// ```
/// use multisim_core::config::Config;
///
/// let json = r#"{
///     "general": { "trace_syscalls": true },
///     "process": {
///         "argv": ["hello", "world"],
///         "hostname": "sim0",
///         "pid": 42
///     },
///     "debug": { "enabled": true },
///     "memory": { "tlb_entries": 64 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(config.general.trace_syscalls);
/// assert_eq!(config.process.argv, ["hello", "world"]);
/// assert_eq!(config.process.pid, 42);
/// assert_eq!(config.process.ppid, 99);
/// assert!(config.debug.enabled);
/// assert_eq!(config.memory.tlb_entries, 64);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Emulated process identity and layout
    #[serde(default)]
    pub process: ProcessConfig,
    /// Remote debug settings
    #[serde(default)]
    pub debug: DebugConfig,
    /// Translation settings
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input or mistyped fields.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Log every syscall with its arguments and result at `debug` level
    #[serde(default)]
    pub trace_syscalls: bool,

    /// Stop after this many retired instructions (unbounded if unset)
    #[serde(default)]
    pub max_instructions: Option<u64>,
}

/// Identity and memory layout of the emulated process.
///
/// `stack_base` and `mmap_start` default to the architecture's conventions
/// when unset.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessConfig {
    /// Host name reported to the program
    #[serde(default = "ProcessConfig::default_hostname")]
    pub hostname: String,

    /// Process id
    #[serde(default = "ProcessConfig::default_pid")]
    pub pid: u64,

    /// Parent process id
    #[serde(default = "ProcessConfig::default_ppid")]
    pub ppid: u64,

    /// Real user id
    #[serde(default = "ProcessConfig::default_uid")]
    pub uid: u64,

    /// Effective user id
    #[serde(default = "ProcessConfig::default_uid")]
    pub euid: u64,

    /// Real group id
    #[serde(default = "ProcessConfig::default_uid")]
    pub gid: u64,

    /// Effective group id
    #[serde(default = "ProcessConfig::default_uid")]
    pub egid: u64,

    /// Program arguments, `argv[0]` first
    #[serde(default)]
    pub argv: Vec<String>,

    /// Environment strings (`NAME=value`)
    #[serde(default)]
    pub envp: Vec<String>,

    /// Working directory
    #[serde(default = "ProcessConfig::default_cwd")]
    pub cwd: String,

    /// Top of the initial stack
    #[serde(default)]
    pub stack_base: Option<u64>,

    /// Initial stack reservation in bytes
    #[serde(default = "ProcessConfig::default_stack_size")]
    pub stack_size: u64,

    /// Maximum stack size in bytes
    #[serde(default = "ProcessConfig::default_max_stack_size")]
    pub max_stack_size: u64,

    /// First address handed out by anonymous `mmap`
    #[serde(default)]
    pub mmap_start: Option<u64>,
}

impl ProcessConfig {
    fn default_hostname() -> String {
        defaults::HOSTNAME.to_owned()
    }

    fn default_pid() -> u64 {
        defaults::PID
    }

    fn default_ppid() -> u64 {
        defaults::PPID
    }

    fn default_uid() -> u64 {
        defaults::UID
    }

    fn default_cwd() -> String {
        defaults::CWD.to_owned()
    }

    fn default_stack_size() -> u64 {
        defaults::STACK_SIZE
    }

    fn default_max_stack_size() -> u64 {
        defaults::MAX_STACK_SIZE
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            hostname: defaults::HOSTNAME.to_owned(),
            pid: defaults::PID,
            ppid: defaults::PPID,
            uid: defaults::UID,
            euid: defaults::UID,
            gid: defaults::UID,
            egid: defaults::UID,
            argv: Vec::new(),
            envp: Vec::new(),
            cwd: defaults::CWD.to_owned(),
            stack_base: None,
            stack_size: defaults::STACK_SIZE,
            max_stack_size: defaults::MAX_STACK_SIZE,
            mmap_start: None,
        }
    }
}

/// Remote debug settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugConfig {
    /// Create a debug stub for the thread
    #[serde(default)]
    pub enabled: bool,

    /// Hold the thread halted until a debugger attaches and resumes it
    #[serde(default)]
    pub wait_for_attach: bool,
}

/// Translation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// TLB entry count
    #[serde(default = "MemoryConfig::default_tlb_entries")]
    pub tlb_entries: usize,
}

impl MemoryConfig {
    /// Returns the default TLB entry count.
    fn default_tlb_entries() -> usize {
        defaults::TLB_ENTRIES
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            tlb_entries: defaults::TLB_ENTRIES,
        }
    }
}
