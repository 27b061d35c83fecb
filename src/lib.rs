//! Bunker - a path-addressed password store with mountable, multi-recipient
//! encrypted stores.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Create config and root store
//! │   ├── secrets       # insert / show / rm / ls
//! │   ├── mounts        # Mount table management
//! │   ├── recipients    # Recipient management, reencrypt, whoami
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # config.toml management
//!     ├── session       # Per-command interaction flags
//!     ├── cipher/       # Encryption backends (age, gpg, plain)
//!     ├── domain/       # Secret codec, paths, recipients, events
//!     ├── store/        # One encrypted tree: blobs, manifest, locks
//!     ├── mount         # Prefix routing across stores
//!     ├── recipients    # Recipient sets and private key selection
//!     ├── prompt        # Injected question/answer boundary
//!     ├── sync          # Change notification boundary
//!     └── vault/        # Engine tying it together
//! ```
//!
//! # Example
//!
//! ```no_run
//! use bunker::core::session::Session;
//! use bunker::core::vault::{InsertOptions, ShowOptions, Vault};
//!
//! # fn main() -> bunker::error::Result<()> {
//! let config = bunker::core::config::Config::default_path()?;
//! let vault = Vault::open(&config, Session::non_interactive())?;
//! vault.insert("web/github", b"hunter2\nuser: alice", InsertOptions::default())?;
//! let user = vault.show("web/github#user", ShowOptions::default())?;
//! println!("{}", String::from_utf8_lossy(&user.to_bytes()));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
