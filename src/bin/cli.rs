//! tinysettings CLI
//!
//! Command-line interface for inspecting and editing a settings log.

use clap::{Parser, Subcommand};
use tinysettings::{Command, Config, Outcome, Settings, SettingsFile, Target};
use tracing_subscriber::{fmt, EnvFilter};

/// Node id used for the default base name
const DEFAULT_NODE_ID: u64 = 0x1234567890abcdef;

/// tinysettings CLI
#[derive(Parser, Debug)]
#[command(name = "tinysettings")]
#[command(about = "Inspect and edit a tinysettings store")]
#[command(version)]
struct Args {
    /// Settings directory
    #[arg(short, long, default_value = "./tmp")]
    dir: String,

    /// File base name (defaults to "<PORT_OFFSET>_<node id>")
    #[arg(short, long)]
    name: Option<String>,

    /// Node id used to derive the default base name
    #[arg(long, value_parser = parse_u64, default_value_t = DEFAULT_NODE_ID)]
    node_id: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key and index
    Get {
        /// The key (decimal or 0x-prefixed hex)
        #[arg(value_parser = parse_key)]
        key: u16,

        /// Position among the key's values
        #[arg(default_value = "0")]
        index: usize,
    },

    /// Replace all values of a key
    Set {
        #[arg(value_parser = parse_key)]
        key: u16,

        /// The value to store
        value: String,
    },

    /// Add a value to a key
    Add {
        #[arg(value_parser = parse_key)]
        key: u16,

        /// The value to store
        value: String,
    },

    /// Delete one value (by index) or all values of a key
    Delete {
        #[arg(value_parser = parse_key)]
        key: u16,

        /// Position among the key's values
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        index: Option<usize>,

        /// Delete every value of the key
        #[arg(long)]
        all: bool,
    },

    /// Remove every setting
    Wipe,

    /// Print every record in log order
    Dump,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tinysettings=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let base_name = args
        .name
        .clone()
        .unwrap_or_else(|| Config::node_base_name(args.node_id));

    let config = Config::builder()
        .settings_dir(&args.dir)
        .base_name(base_name)
        .build();

    tracing::debug!("tinysettings v{}", tinysettings::VERSION);

    if let Err(e) = run(&config, args.command) {
        tracing::error!("{}", e);
        std::process::exit(if e.is_fatal() { 2 } else { 1 });
    }
}

fn run(config: &Config, command: Commands) -> tinysettings::Result<()> {
    let store = SettingsFile::open(config)?;

    let command = match command {
        Commands::Dump => {
            for (position, record) in store.records()?.iter().enumerate() {
                println!(
                    "{:4}  key={:#06x}  len={:5}  {}",
                    position,
                    record.key,
                    record.value.len(),
                    String::from_utf8_lossy(&record.value)
                );
            }
            return Ok(());
        }
        Commands::Get { key, index } => Command::Get { key, index },
        Commands::Set { key, value } => Command::Set {
            key,
            value: value.into_bytes(),
        },
        Commands::Add { key, value } => Command::Add {
            key,
            value: value.into_bytes(),
        },
        Commands::Delete { key, index, all } => Command::Delete {
            key,
            target: match index {
                Some(index) if !all => Target::Index(index),
                _ => Target::All,
            },
        },
        Commands::Wipe => Command::Wipe,
    };

    let mut settings = Settings::new(Box::new(store));
    match settings.execute(command)? {
        Outcome::Value(value) => println!("{}", String::from_utf8_lossy(&value)),
        Outcome::Done => println!("OK"),
    }

    Ok(())
}

/// Parse a decimal or 0x-prefixed hex number
fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {:?}: {}", s, e))
}

/// Parse a 16-bit setting key
fn parse_key(s: &str) -> Result<u16, String> {
    let value = parse_u64(s)?;
    u16::try_from(value).map_err(|_| format!("key {:?} does not fit in 16 bits", s))
}
