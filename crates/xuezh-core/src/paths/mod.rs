//! Path utilities for the xuezh workspace.
//!
//! This module provides the canonical path resolution for all components:
//! - Workspace root and its fixed subdirectories
//! - Database location
//! - Confinement of user-supplied paths to the workspace
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Environment lookups are injected as `Fn(&str) -> Option<String>`
//! - OS-specific logic is kept private in `platform`

mod ensure;
mod error;
mod platform;
mod workspace;

// Error type
pub use error::PathError;

// Home expansion for inputs that live outside the workspace
pub use platform::expand_home;

// Directory operations
pub use ensure::{ensure_directory, verify_writable};

// Workspace root and confinement
pub use workspace::{
    DB_PATH_ENV, WORKSPACE_DIR_ENV, WORKSPACE_SUBDIRS, Workspace, database_path_hint,
    workspace_dir,
};
