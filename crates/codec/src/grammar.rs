//! SIP quoted-string grammar.
//!
//! [RFC3261]: https://datatracker.ietf.org/doc/html/rfc3261
//!
//! The REALM and NONCE attributes carry the *content* of a quoted string
//! as described in [RFC3261], without the surrounding quotes: a sequence
//! of `qdtext` and `quoted-pair` (`\` followed by any byte in 0x00-0x09,
//! 0x0B-0x0C or 0x0E-0x7F). A `qdtext` run is linear whitespace followed
//! by bytes in 0x21, 0x23-0x5B, 0x5D-0x7E or UTF-8 encoded non-ASCII;
//! whitespace only ever leads a run, it never appears between the
//! remaining characters. The double quote (0x22) and a bare backslash
//! (0x5C) never appear outside a quoted pair.

#[inline]
fn is_qdtext_ascii(byte: u8) -> bool {
    matches!(byte, 0x21 | 0x23..=0x5B | 0x5D..=0x7E)
}

/// Whether the buffer is a single `qdtext` run: optional leading linear
/// whitespace, then a strict character sequence without whitespace.
///
/// # Test
///
/// ```
/// use stun_kit_codec::grammar::is_qdtext;
///
/// assert!(is_qdtext(b"panda"));
/// assert!(is_qdtext(b"  panda"));
/// assert!(is_qdtext("übung".as_bytes()));
/// assert!(!is_qdtext(b"pan da"));
/// assert!(!is_qdtext(b"pan\"da"));
/// assert!(!is_qdtext(br"pan\da"));
/// assert!(!is_qdtext(b"   "));
/// assert!(!is_qdtext(b""));
/// ```
pub fn is_qdtext(bytes: &[u8]) -> bool {
    if bytes.is_empty() || std::str::from_utf8(bytes).is_err() {
        return false;
    }

    // whitespace may lead the run, nothing more.
    let Some(position) = bytes.iter().position(|it| !it.is_ascii_whitespace()) else {
        return false;
    };

    // the buffer is valid UTF-8 at this point, so every byte >= 0x80
    // belongs to a non-ASCII code point and is allowed as is.
    bytes[position..]
        .iter()
        .all(|it| *it >= 0x80 || is_qdtext_ascii(*it))
}

/// Whether the buffer is exactly one `quoted-pair`.
///
/// # Test
///
/// ```
/// use stun_kit_codec::grammar::is_quoted_pair;
///
/// assert!(is_quoted_pair(br"\a"));
/// assert!(is_quoted_pair(b"\\\x00"));
/// assert!(!is_quoted_pair(b"\\\n"));
/// assert!(!is_quoted_pair(b"\\\r"));
/// assert!(!is_quoted_pair("\\ä".as_bytes()));
/// assert!(!is_quoted_pair(br"\"));
/// ```
pub fn is_quoted_pair(bytes: &[u8]) -> bool {
    bytes.len() == 2 && bytes[0] == 0x5C && bytes[1] <= 0x7F && bytes[1] != 0x0A && bytes[1] != 0x0D
}

/// Whether the buffer is valid quoted-string content, the value grammar
/// of the REALM and NONCE attributes: `qdtext` runs separated by
/// `quoted-pair`s.
///
/// # Test
///
/// ```
/// use stun_kit_codec::grammar::is_quoted_string_content;
///
/// assert!(is_quoted_string_content(b"raspberry"));
/// assert!(is_quoted_string_content(b"  raspberry"));
/// assert!(is_quoted_string_content(br"pan\da"));
/// assert!(!is_quoted_string_content(b"a realm with spaces"));
/// assert!(!is_quoted_string_content(b"pan\"da"));
/// assert!(!is_quoted_string_content(br"panda\"));
/// assert!(!is_quoted_string_content(b""));
/// ```
pub fn is_quoted_string_content(bytes: &[u8]) -> bool {
    if bytes.is_empty() || std::str::from_utf8(bytes).is_err() {
        return false;
    }

    // a backslash never occurs inside a multi byte code point, so
    // splitting on it keeps every segment valid UTF-8.
    let mut rest = bytes;
    while !rest.is_empty() {
        let Some(slash) = rest.iter().position(|it| *it == 0x5C) else {
            return is_qdtext(rest);
        };

        if slash + 2 > rest.len() || !is_quoted_pair(&rest[slash..slash + 2]) {
            return false;
        }

        if slash > 0 && !is_qdtext(&rest[..slash]) {
            return false;
        }

        rest = &rest[slash + 2..];
    }

    true
}
