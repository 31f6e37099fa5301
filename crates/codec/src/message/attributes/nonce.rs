//! Security-feature nonce construction.
//!
//! [RFC8489]: https://datatracker.ietf.org/doc/html/rfc8489
//!
//! [RFC8489] servers advertise security features inside the NONCE
//! attribute: the nonce starts with the fixed "nonce cookie" `obMatJos2`,
//! followed by four base64 characters encoding a 24 bit security-feature
//! field, followed by server-chosen random material. The whole value
//! still has to satisfy the quoted-string-content grammar that applies
//! to every nonce.
//!
//! Bit 0 of the feature field signals "Password algorithms", bit 1
//! signals "Username anonymity".

use base64::prelude::{BASE64_STANDARD, Engine as _};
use rand::Rng;

use crate::Error;

/// Security feature bit: the server supports the PASSWORD-ALGORITHMS
/// negotiation.
pub const PASSWORD_ALGORITHMS: u32 = 0x000001;

/// Security feature bit: the server accepts USERHASH in place of
/// USERNAME.
pub const USERNAME_ANONYMITY: u32 = 0x000002;

const PREFIX: &str = "obMatJos2";

/// Generate a security nonce of exactly `length` bytes.
///
/// The first 13 bytes are the nonce cookie and the encoded feature
/// field; the remainder is random quoted-string content drawn from the
/// basic multilingual plane. `length` must leave room for at least one
/// random byte and stay below the attribute maximum, and `security`
/// must fit the 24 bit field.
///
/// # Test
///
/// ```
/// use stun_kit_codec::message::attributes::nonce;
/// use stun_kit_codec::grammar;
///
/// let value = nonce::generate(32, nonce::PASSWORD_ALGORITHMS).unwrap();
///
/// assert_eq!(value.len(), 32);
/// assert!(value.starts_with("obMatJos2"));
/// assert!(grammar::is_quoted_string_content(value.as_bytes()));
/// assert!(nonce::password_algorithms_set(&value));
/// assert!(!nonce::username_anonymity_set(&value));
/// ```
pub fn generate(length: usize, security: u32) -> Result<String, Error> {
    if !(14..=763).contains(&length) || security > 0xFFFFFF {
        return Err(Error::InvalidInput);
    }

    let mut nonce = String::with_capacity(length);
    nonce.push_str(PREFIX);
    nonce.push_str(&BASE64_STANDARD.encode(&security.to_be_bytes()[1..]));

    let mut rng = rand::rng();
    while nonce.len() < length {
        let open = length - nonce.len();

        // the last byte has to be ASCII, everything before it may be a
        // multi-byte code point as long as it fits.
        let codepoint = if open == 1 {
            rng.random_range(0x21..=0x7Eu32)
        } else {
            rng.random_range(0x21..=0xFFFFu32)
        };

        let Some(ch) = char::from_u32(codepoint) else {
            continue;
        };

        if matches!(ch, '"' | '\\' | '\x7f') || ch.len_utf8() > open {
            continue;
        }

        nonce.push(ch);
    }

    Ok(nonce)
}

/// The 24 bit security-feature field, if the nonce carries one.
///
/// # Test
///
/// ```
/// use stun_kit_codec::message::attributes::nonce;
///
/// assert_eq!(nonce::security_features("obMatJos2AAADrest"), Some(3));
/// assert_eq!(nonce::security_features("some other nonce"), None);
/// ```
pub fn security_features(nonce: &str) -> Option<u32> {
    let rest = nonce.strip_prefix(PREFIX)?;
    let decoded = BASE64_STANDARD.decode(rest.as_bytes().get(..4)?).ok()?;
    if decoded.len() != 3 {
        return None;
    }

    Some(u32::from_be_bytes([0, decoded[0], decoded[1], decoded[2]]))
}

/// Whether the nonce is an [RFC8489] security nonce at all.
pub fn is_security_nonce(nonce: &str) -> bool {
    security_features(nonce).is_some()
}

/// Whether the "Password algorithms" security feature bit is set.
pub fn password_algorithms_set(nonce: &str) -> bool {
    security_features(nonce).is_some_and(|it| it & PASSWORD_ALGORITHMS != 0)
}

/// Whether the "Username anonymity" security feature bit is set.
pub fn username_anonymity_set(nonce: &str) -> bool {
    security_features(nonce).is_some_and(|it| it & USERNAME_ANONYMITY != 0)
}
