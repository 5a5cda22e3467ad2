//! Command catalog: human-readable command names to TV key codes.
//!
//! The TV identifies each physical remote button by a key code string such as
//! `KEY_VOLUP`.  Users pick commands by friendlier names (`VolumeUp`), so the
//! catalog translates between the two.
//!
//! The table is a `static` slice sorted by command name.  Storing it
//! pre-sorted means the presentation order (ascending, stable across runs) is
//! simply the iteration order, and lookups can use binary search.

/// `(command name, key code)` pairs, sorted ascending by command name.
///
/// Keep this sorted: [`CommandCatalog::key_code`] relies on binary search and
/// the tests in this module verify the ordering.
static COMMANDS: &[(&str, &str)] = &[
    ("ArrowDown", "KEY_DOWN"),
    ("ArrowLeft", "KEY_LEFT"),
    ("ArrowRight", "KEY_RIGHT"),
    ("ArrowUp", "KEY_UP"),
    ("Back", "KEY_RETURN"),
    ("ChannelDown", "KEY_CHDOWN"),
    ("ChannelUp", "KEY_CHUP"),
    ("Enter", "KEY_ENTER"),
    ("Exit", "KEY_EXIT"),
    ("FastForward", "KEY_FF"),
    ("Home", "KEY_HOME"),
    ("Info", "KEY_INFO"),
    ("Menu", "KEY_MENU"),
    ("Mute", "KEY_MUTE"),
    ("Pause", "KEY_PAUSE"),
    ("Play", "KEY_PLAY"),
    ("PowerOff", "KEY_POWEROFF"),
    ("Rewind", "KEY_REWIND"),
    ("Source", "KEY_SOURCE"),
    ("Stop", "KEY_STOP"),
    ("VolumeDown", "KEY_VOLDOWN"),
    ("VolumeUp", "KEY_VOLUP"),
];

/// Read-only view over the process-wide command table.
pub struct CommandCatalog;

impl CommandCatalog {
    /// Returns every command name in ascending lexicographic order.
    ///
    /// The result is identical on every call; the UI relies on this to show
    /// commands in the same order every run.
    pub fn available_commands() -> Vec<&'static str> {
        COMMANDS.iter().map(|(name, _)| *name).collect()
    }

    /// Looks up the key code for `name`.
    ///
    /// Matching is exact and case-sensitive.  Returns `None` if the catalog
    /// has no such command.
    pub fn key_code(name: &str) -> Option<&'static str> {
        COMMANDS
            .binary_search_by(|(candidate, _)| (*candidate).cmp(name))
            .ok()
            .map(|idx| COMMANDS[idx].1)
    }

    /// Returns `true` if `name` is a known command.
    pub fn contains(name: &str) -> bool {
        Self::key_code(name).is_some()
    }

    /// Iterates over `(name, key code)` pairs in presentation order.
    pub fn iter() -> impl Iterator<Item = (&'static str, &'static str)> {
        COMMANDS.iter().copied()
    }

    /// Number of commands in the catalog.
    pub fn len() -> usize {
        COMMANDS.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
