//! Translation of the sixteen classic console colors to ANSI escape
//! sequences, for callers building colored formatters.

/// The classic 16-color console palette. Each variant's discriminant is its
/// index in the ANSI 256-color table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black = 0,
    DarkRed = 1,
    DarkGreen = 2,
    DarkYellow = 3,
    DarkBlue = 4,
    DarkMagenta = 5,
    DarkCyan = 6,
    Gray = 7,
    DarkGray = 8,
    Red = 9,
    Green = 10,
    Yellow = 11,
    Blue = 12,
    Magenta = 13,
    Cyan = 14,
    White = 15,
}

/// The escape sequence selecting the given color, as a foreground color by
/// default or a background color when `background` is set. `None` yields the
/// reset sequence that restores the terminal's default, the "no color" state.
pub fn ansi_code(color: Option<Color>, background: bool) -> String {
    match color {
        Some(color) => format!("\x1b[{};5;{}m", if background { 48 } else { 38 }, color as u8),
        None => format!("\x1b[{}m", if background { 49 } else { 39 }),
    }
}

/// Brackets `s` in the given color and the matching reset sequence.
pub fn wrap(s: &str, color: Color, background: bool) -> String {
    format!(
        "{}{}{}",
        ansi_code(Some(color), background),
        s,
        ansi_code(None, background)
    )
}

#[cfg(test)]
mod tests {
    use super::{ansi_code, wrap, Color};

    #[test]
    fn foreground_and_background_use_their_select_codes() {
        assert_eq!(ansi_code(Some(Color::Red), false), "\x1b[38;5;9m");
        assert_eq!(ansi_code(Some(Color::DarkBlue), true), "\x1b[48;5;4m");
    }

    #[test]
    fn no_color_resets_to_the_terminal_default() {
        assert_eq!(ansi_code(None, false), "\x1b[39m");
        assert_eq!(ansi_code(None, true), "\x1b[49m");
    }

    #[test]
    fn wrap_brackets_the_text_in_color_and_reset() {
        assert_eq!(wrap("hi", Color::Green, false), "\x1b[38;5;10mhi\x1b[39m");
    }
}
