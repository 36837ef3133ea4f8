//! Command: print version information.

/// Version string: `TEMPLATE_TREE_VERSION` at build time, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("TEMPLATE_TREE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version to stdout.
pub fn run() {
    println!("template-tree {}", version());
}
