//! Signal handling.
//!
//! SIGINT and SIGTERM set the cancellation token's flag and nothing
//! else; the main loop notices on its next poll. Signal handlers never
//! touch runtime state directly.

use std::io;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::cancel::CancelToken;

/// Routes SIGINT and SIGTERM into `token`.
///
/// # Errors
///
/// Returns the underlying error when handler registration fails.
pub fn install(token: &CancelToken) -> io::Result<()> {
    flag::register(SIGINT, token.flag())?;
    flag::register(SIGTERM, token.flag())?;
    Ok(())
}
