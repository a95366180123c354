//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map to the individual workspace
//! crates (`core-runtime`, `core-progress`). Host applications can depend on
//! `listen-sync-workspace` and enable `desktop-shims` to get the progress
//! syncer wired with the desktop bridge adapters.

#[cfg(feature = "desktop-shims")]
pub use core_progress as progress;
#[cfg(feature = "desktop-shims")]
pub use core_runtime as runtime;
