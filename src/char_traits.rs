//! Character classification used by the scanner and the emitter.
//!
//! Every predicate works on a single `char`. The scanner feeds them characters peeked from its
//! lookahead buffer, where `\0` stands for "past the end of input".

/// Check whether the character is nil (`\0`), the end-of-input sentinel.
#[inline]
pub(crate) fn is_z(c: char) -> bool {
    c == '\0'
}

/// Check whether the character is a line break (`\r` or `\n`).
#[inline]
pub(crate) fn is_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Check whether the character is a line break in the YAML 1.1 sense.
///
/// This adds NEL, LS and PS to [`is_break`]. The emitter must treat those as breaks so that it
/// never writes them raw inside a plain or single-quoted scalar.
#[inline]
pub(crate) fn is_unicode_break(c: char) -> bool {
    is_break(c) || matches!(c, '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Check whether the character is nil or a line break (`\0`, `\r`, `\n`).
#[inline]
pub(crate) fn is_breakz(c: char) -> bool {
    is_break(c) || is_z(c)
}

/// Check whether the character is a space.
#[inline]
pub(crate) fn is_space(c: char) -> bool {
    c == ' '
}

/// Check whether the character is a tab.
#[inline]
pub(crate) fn is_tab(c: char) -> bool {
    c == '\t'
}

/// Check whether the character is a whitespace (` ` or `\t`).
#[inline]
pub(crate) fn is_blank(c: char) -> bool {
    is_space(c) || is_tab(c)
}

/// Check whether the character is nil, a linebreak or a whitespace.
///
/// `\0`, ` `, `\t`, `\n`, `\r`
#[inline]
pub(crate) fn is_blank_or_breakz(c: char) -> bool {
    is_blank(c) || is_breakz(c)
}

/// Check whether the character is an ascii digit.
#[inline]
pub(crate) fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Check whether the character is a digit, letter, `_` or `-`.
#[inline]
pub(crate) fn is_alpha(c: char) -> bool {
    matches!(c, '0'..='9' | 'a'..='z' | 'A'..='Z' | '_' | '-')
}

/// Check whether the character is a hexadecimal character (case insensitive).
#[inline]
pub(crate) fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Convert the hexadecimal digit to an integer.
///
/// Callers check [`is_hex`] first; anything else converts to 0.
#[inline]
pub(crate) fn as_hex(c: char) -> u32 {
    c.to_digit(16).unwrap_or(0)
}

/// Check whether the character is a YAML flow character (one of `,[]{}`).
#[inline]
pub(crate) fn is_flow(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// Check whether the character is the BOM character.
#[inline]
pub(crate) fn is_bom(c: char) -> bool {
    c == '\u{FEFF}'
}

/// Check whether the character belongs to the YAML printable set (`c-printable`).
#[inline]
pub(crate) fn is_printable(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r' | '\x20'..='\x7e'
        | '\u{85}'
        | '\u{a0}'..='\u{d7ff}'
        | '\u{e000}'..='\u{fffd}'
        | '\u{10000}'..='\u{10ffff}')
        && !is_bom(c)
}

/// Check whether the character is a YAML non-breaking character.
#[inline]
pub(crate) fn is_yaml_non_break(c: char) -> bool {
    !is_break(c) && !is_bom(c)
}

/// Check whether the character is NOT a YAML whitespace (` ` / `\t`).
#[inline]
pub(crate) fn is_yaml_non_space(c: char) -> bool {
    is_yaml_non_break(c) && !is_blank(c)
}

/// Check whether the character is a valid YAML anchor name character.
#[inline]
pub(crate) fn is_anchor_char(c: char) -> bool {
    is_yaml_non_space(c) && !is_flow(c) && !is_z(c)
}

/// Check whether the character is a valid word character.
#[inline]
pub(crate) fn is_word_char(c: char) -> bool {
    is_alpha(c) && c != '_'
}

/// Check whether the character is a valid URI character.
#[inline]
pub(crate) fn is_uri_char(c: char) -> bool {
    is_word_char(c) || "#;/?:@&=+$,_.!~*\'()[]%".contains(c)
}

/// Check whether the character is a valid tag character.
#[inline]
pub(crate) fn is_tag_char(c: char) -> bool {
    is_uri_char(c) && !is_flow(c) && c != '!'
}

/// Check whether the character can be written unescaped inside a `!<...>` or a tag suffix.
#[inline]
pub(crate) fn is_tag_content_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-;/?:@&=+$,_.~*'()[]".contains(c)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_breaks() {
        assert!(is_break('\n'));
        assert!(is_break('\r'));
        assert!(!is_break('\u{85}'));
        assert!(is_unicode_break('\u{2028}'));
        assert!(is_breakz('\0'));
        assert!(is_blank_or_breakz('\t'));
    }

    #[test]
    fn test_hex() {
        assert!(is_hex('f'));
        assert!(is_hex('B'));
        assert!(!is_hex('g'));
        assert_eq!(as_hex('a'), 10);
        assert_eq!(as_hex('F'), 15);
        assert_eq!(as_hex('7'), 7);
    }

    #[test]
    fn test_printable() {
        assert!(is_printable('a'));
        assert!(is_printable('\u{e9}'));
        assert!(!is_printable('\x07'));
        assert!(!is_printable('\u{feff}'));
        assert!(!is_printable('\u{fffe}'));
    }

    #[test]
    fn test_anchor_and_tag_chars() {
        assert!(is_anchor_char('a'));
        assert!(!is_anchor_char(','));
        assert!(!is_anchor_char(']'));
        assert!(is_tag_char(':'));
        assert!(!is_tag_char('!'));
        assert!(!is_tag_char('{'));
        assert!(is_tag_content_char('/'));
        assert!(!is_tag_content_char('!'));
        assert!(!is_tag_content_char(' '));
    }
}
