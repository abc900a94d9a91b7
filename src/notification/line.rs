//! Line recognition for bridge and capture output.
//!
//! Two shapes carry a notification on a text line: the bridge's
//! `telegram=|HEX|` wrapper, which may sit anywhere in a longer log line,
//! and a bare line of hex digits. Both accept the normalizer's separators.
//! Wrapper content is handed on as is so the normalizer can reject it;
//! other text (log chatter, blank lines) is ignored.

use crate::constants::{TELEGRAM_LINE_CLOSE, TELEGRAM_LINE_OPEN};
use crate::util::hex::is_separator;
use nom::{
    bytes::complete::{tag, take_till1, take_until, take_while1},
    combinator::{all_consuming, verify},
    sequence::{delimited, preceded},
    IResult,
};

/// Hex payload found on an input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineInput<'a> {
    /// Content of a `telegram=|...|` wrapper
    Wrapped(&'a str),
    /// Entire line is hex digits and separators
    RawHex(&'a str),
}

impl<'a> LineInput<'a> {
    pub fn hex(&self) -> &'a str {
        match self {
            LineInput::Wrapped(hex) | LineInput::RawHex(hex) => hex,
        }
    }
}

fn wrapped_telegram(input: &str) -> IResult<&str, &str> {
    preceded(
        take_until(TELEGRAM_LINE_OPEN),
        delimited(
            tag(TELEGRAM_LINE_OPEN),
            take_till1(|c: char| TELEGRAM_LINE_CLOSE.starts_with(c)),
            tag(TELEGRAM_LINE_CLOSE),
        ),
    )(input)
}

fn raw_hex_line(input: &str) -> IResult<&str, &str> {
    all_consuming(verify(
        take_while1(|c: char| c.is_ascii_hexdigit() || is_separator(c)),
        |text: &str| text.chars().any(|c| c.is_ascii_hexdigit()),
    ))(input)
}

/// Find the notification hex carried by a line, if any.
pub fn parse_line(line: &str) -> Option<LineInput<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok((_, hex)) = wrapped_telegram(trimmed) {
        return Some(LineInput::Wrapped(hex));
    }
    if let Ok((_, hex)) = raw_hex_line(trimmed) {
        return Some(LineInput::RawHex(hex));
    }
    None
}

/// Render the sink line for a telegram hex string
pub fn format_telegram_line(hex: &str) -> String {
    format!("{TELEGRAM_LINE_OPEN}{hex}{TELEGRAM_LINE_CLOSE}")
}
