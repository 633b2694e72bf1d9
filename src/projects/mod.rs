/// # The ways unawait can be driven from outside the library
/// For now that is only the command line.

// Parses commands and flags, then hands them to the build system
pub(crate) mod cli;
