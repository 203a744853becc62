//! Command: print version information.

/// Version string: `AGENTDECK_VERSION` at build time, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("AGENTDECK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the agentdeck version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("agentdeck {}", version());
}
