// crates/guestbook-cli/src/commands/mod.rs
//
// Command module declarations for the Guestbook CLI.

pub mod entries;
pub mod status;
pub mod token;
