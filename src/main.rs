//! SmartValues command line.
//!
//! Inspects and edits a preferences file and its document directory.
//!
//! # Running
//!
//! ```sh
//! cargo run -- list
//! cargo run -- set-int coins 120
//! cargo run -- level coins 0,50,100
//! ```
//!
//! `RUST_LOG` controls verbosity (default `info`).

use clap::{Parser, Subcommand};
use smartvalues::app;
use smartvalues::resources::config::StoreConfig;
use smartvalues::resources::prefs::{Prefs, PrefValue};
use smartvalues::values::document::DocumentStore;
use std::error::Error;
use std::path::PathBuf;

/// SmartValues store inspector
#[derive(Parser)]
#[command(version, about = "Inspect and edit SmartValues preferences and documents.")]
struct Cli {
    /// Configuration file (default: ./smartvalues.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every stored preference.
    List,
    /// Print one preference.
    Get { key: String },
    /// Store an integer preference.
    SetInt { key: String, value: i32 },
    /// Store a string preference.
    SetString { key: String, value: String },
    /// Delete a preference.
    Delete { key: String },
    /// Print the level index an integer preference reaches.
    Level {
        key: String,
        /// Ascending thresholds, comma separated.
        #[arg(value_delimiter = ',')]
        thresholds: Vec<i32>,
    },
    /// List stored documents.
    Docs,
    /// Pretty-print one document.
    ShowDoc { name: String },
    /// Write the active configuration to the config file.
    InitConfig,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => StoreConfig::with_path(path),
        None => StoreConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: &StoreConfig) -> Result<(), Box<dyn Error>> {
    if let Command::InitConfig = command {
        config.save_to_file()?;
        println!("Config written to {}", config.config_path.display());
        return Ok(());
    }

    let world = app::build_world(config)?;
    let prefs = world.non_send_resource::<Prefs>().backend();

    match command {
        Command::List => {
            for (key, value) in prefs.entries() {
                println!("{key} = {value}");
            }
        }
        Command::Get { key } => match prefs.entries().into_iter().find(|(k, _)| *k == key) {
            Some((_, value)) => println!("{value}"),
            None => return Err(format!("no preference named {key:?}").into()),
        },
        Command::SetInt { key, value } => {
            app::saved_int(&world, key.as_str(), 0).set(value)?;
            println!("{key} = {}", PrefValue::Int(value));
        }
        Command::SetString { key, value } => {
            app::saved_string(&world, key.as_str(), "").set(value.clone())?;
            println!("{key} = {}", PrefValue::Str(value));
        }
        Command::Delete { key } => {
            if !prefs.has_key(&key) {
                return Err(format!("no preference named {key:?}").into());
            }
            prefs.delete_key(&key)?;
            println!("Deleted {key}");
        }
        Command::Level { key, thresholds } => match app::inspect_level(&world, &key, &thresholds) {
            Some((value, Some(index))) => println!("{key} = {value} -> level {index}"),
            Some((value, None)) => println!("{key} = {value} -> below every threshold"),
            None => return Err(format!("no int preference named {key:?}").into()),
        },
        Command::Docs => {
            for name in world.resource::<DocumentStore>().names()? {
                println!("{name}");
            }
        }
        Command::ShowDoc { name } => {
            let document: serde_json::Value = world.resource::<DocumentStore>().load(&name)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::InitConfig => {}
    }
    Ok(())
}
