//! Common constants used throughout the ironmaker application.

/// Suffix that marks a renderable template inside the template set
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Template set shipped with the crate
pub const DEFAULT_TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Mode for generated text files
pub const MODE_FILE: u32 = 0o666;

/// Mode for generated entry scripts and directories
pub const MODE_EXECUTABLE: u32 = 0o755;

/// Arguments that `delete_directory_recursive` refuses to act on
pub const PROTECTED_DELETE_TARGETS: [&str; 2] = [".", "*"];

/// Output extensions whose interpolated values render as code literals
pub const CODE_EXTENSIONS: [&str; 3] = ["js", "mjs", "cjs"];
