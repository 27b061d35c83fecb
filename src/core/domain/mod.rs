//! Domain types.

mod path;
mod recipient;
pub mod secret;
mod sync;

pub use path::SecretPath;
pub use recipient::{KeyInfo, Recipient};
pub use secret::{Entry, Lookup, Newline, Secret};
pub use sync::{ChangeEvent, ChangeKind, SyncResult};
