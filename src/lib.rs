//! # tinysettings
//!
//! A minimal persistent key-value settings store for resource-constrained
//! devices:
//! - One contract (`init`, `get`, `set`, `add`, `delete`, `wipe`) for every
//!   storage backend
//! - Multi-valued keys (16-bit keys, values up to 65535 bytes)
//! - A flat-file log backend that stays crash consistent through
//!   copy-and-rename rewrites
//! - Optional routing of sensitive keys to a separate secure backend
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Settings (dispatch)                        │
//! │          sensitive keys ──┐        ┌── normal keys           │
//! └───────────────────────────┼────────┼────────────────────────┘
//!                             │        │
//!                             ▼        ▼
//!                   ┌──────────────┐ ┌──────────────┐
//!                   │    secure    │ │   primary    │
//!                   │   backend    │ │   backend    │
//!                   └──────────────┘ └──────┬───────┘
//!                                           │
//!                                           ▼
//!                                  ┌─────────────────┐
//!                                  │  SettingsFile   │
//!                                  │ <base>.data     │
//!                                  │ <base>.Swap     │
//!                                  └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tinysettings::{Config, SettingsBackend, SettingsFile, Target};
//!
//! let config = Config::builder()
//!     .settings_dir("/var/lib/mydevice")
//!     .base_name("node0")
//!     .build();
//!
//! let mut store = SettingsFile::open(&config)?;
//! store.set(0x0001, b"dataset")?;
//! store.add(0x8001, b"first")?;
//! store.add(0x8001, b"second")?;
//!
//! assert_eq!(store.get_value(0x8001, 1)?, b"second");
//! store.delete(0x8001, Target::All)?;
//! # Ok::<(), tinysettings::SettingsError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod backend;
pub mod log;
pub mod command;
pub mod settings;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use backend::{keys, MemoryBackend, SettingsBackend, Target};
pub use command::{Command, Outcome};
pub use config::{BackendKind, Config};
pub use error::{Result, SettingsError};
pub use log::{InitStatus, SettingsFile};
pub use settings::Settings;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tinysettings
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
