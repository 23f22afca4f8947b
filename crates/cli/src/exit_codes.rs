//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                              |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad args, unknown row id or column)         |
//! | 3    | Startup failure (invalid settings, directory creation)   |
//! | 4    | File-parse error reading an uploaded table               |
//! | 5    | Session store error (unreadable or corrupt session)      |
//! | 6    | Output write failure                                     |
//! | 7    | Generate refused: both sources must be loaded            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown row id, column not in the loaded file.
pub const EXIT_USAGE: u8 = 2;

/// Settings could not be resolved, or the output/log directory could not be created.
pub const EXIT_STARTUP: u8 = 3;

/// An uploaded table could not be read (type, size, or malformed content).
pub const EXIT_PARSE: u8 = 4;

/// The session file could not be read, parsed, or written.
pub const EXIT_SESSION: u8 = 5;

/// The generated configuration could not be written or delivered.
pub const EXIT_WRITE: u8 = 6;

/// `generate` called before both source files were loaded.
pub const EXIT_NOT_READY: u8 = 7;
