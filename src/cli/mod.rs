//! Command-line interface.

pub mod completions;
pub mod init;
pub mod mounts;
pub mod output;
pub mod recipients;
pub mod secrets;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::config::Config;
use crate::core::constants::CONFIG_ENV;
use crate::core::session::Session;
use crate::core::sync::LogNotifier;
use crate::core::vault::Vault;
use crate::error::Result;

/// Bunker - a path-addressed password store.
#[derive(Parser)]
#[command(
    name = "bunker",
    about = "A path-addressed password store with mountable, multi-recipient encrypted stores",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Accept defaults instead of asking
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Never prompt
    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Config file location
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create the config file and the root store
    Init {
        /// Cipher for the root store (age, gpg, plain)
        #[arg(long, default_value = "age")]
        cipher: String,
        /// Root store directory
        #[arg(long)]
        path: Option<PathBuf>,
        /// Permit the unencrypted plain cipher (tests only)
        #[arg(long)]
        allow_plaintext: bool,
    },

    /// Insert a secret, or one key of it
    Insert {
        /// Secret path, optionally with #key
        path: String,
        /// Key to set, or key:value to set inline
        key: Option<String>,
        /// Overwrite existing content
        #[arg(short, long)]
        force: bool,
    },

    /// Show a secret, or one key of it
    Show {
        /// Secret path, optionally with #key
        path: String,
        /// Key to show
        key: Option<String>,
        /// Print exactly what is stored, without parsing
        #[arg(short = 'n', long = "noparse")]
        no_parse: bool,
    },

    /// Remove a secret
    Rm {
        /// Secret path
        path: String,
    },

    /// List all secrets
    Ls {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage mounted stores
    Mounts {
        #[command(subcommand)]
        action: MountAction,
    },

    /// Manage store recipients
    Recipients {
        #[command(subcommand)]
        action: RecipientAction,
    },

    /// Re-encrypt every secret for the current recipients
    Reencrypt,

    /// Print the private key and identity acting for you
    Whoami,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Mount subcommands.
#[derive(Subcommand)]
pub enum MountAction {
    /// Mount a store directory at a prefix
    Add {
        /// Mount point, e.g. work/team
        prefix: String,
        /// Store directory
        path: PathBuf,
        /// Cipher for the store; defaults to the root store's
        #[arg(long)]
        cipher: Option<String>,
    },

    /// Unmount a store; its files are kept
    Rm {
        /// Mount point
        prefix: String,
    },

    /// List mount points
    Ls,
}

/// Recipient subcommands.
#[derive(Subcommand)]
pub enum RecipientAction {
    /// List recipients
    Ls {
        /// Store mount point; asks when omitted
        #[arg(long)]
        store: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a recipient by key ID
    Add {
        /// Key ID or public key
        id: String,
        /// Store mount point; asks when omitted
        #[arg(long)]
        store: Option<String>,
    },

    /// Remove a recipient by key ID
    Rm {
        /// Key ID or public key
        id: String,
        /// Store mount point; asks when omitted
        #[arg(long)]
        store: Option<String>,
    },
}

/// Execute a command.
pub fn execute(command: Command, global: &GlobalArgs) -> Result<()> {
    use Command::*;

    match command {
        Init {
            cipher,
            path,
            allow_plaintext,
        } => init::execute(global, &cipher, path, allow_plaintext),
        Insert { path, key, force } => secrets::insert(global, &path, key, force),
        Show {
            path,
            key,
            no_parse,
        } => secrets::show(global, &path, key, no_parse),
        Rm { path } => secrets::rm(global, &path),
        Ls { json } => secrets::list(global, json),
        Mounts { action } => match action {
            MountAction::Add {
                prefix,
                path,
                cipher,
            } => mounts::add(global, &prefix, path, cipher),
            MountAction::Rm { prefix } => mounts::rm(global, &prefix),
            MountAction::Ls => mounts::list(global),
        },
        Recipients { action } => match action {
            RecipientAction::Ls { store, json } => recipients::list(global, store, json),
            RecipientAction::Add { id, store } => recipients::add(global, &id, store),
            RecipientAction::Rm { id, store } => recipients::rm(global, &id, store),
        },
        Reencrypt => recipients::reencrypt(global),
        Whoami => recipients::whoami(global),
        Completions { shell } => completions::execute(shell),
    }
}

/// Config file path from `--config` / `$BUNKER_CONFIG` or the default.
pub(crate) fn config_path(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => Config::default_path(),
    }
}

/// Session from config defaults and command-line flags. Prompts need a
/// terminal on stderr.
pub(crate) fn session(global: &GlobalArgs, config: &Config) -> Session {
    let base = Session::from(&config.session);
    base.with_interactive(
        base.interactive && !global.no_interactive && std::io::stderr().is_terminal(),
    )
    .with_always_yes(base.always_yes || global.yes)
}

/// Open the vault named by the global flags. Changes are logged.
pub(crate) fn open_vault(global: &GlobalArgs) -> Result<Vault> {
    let path = config_path(global)?;
    let config = Config::load(&path)?;
    let session = session(global, &config);
    Ok(Vault::from_config(config, &path, session)?.with_notifier(LogNotifier))
}
