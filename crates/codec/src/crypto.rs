use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::Sha256;

use crate::Error;

/// HMAC SHA1 digest.
///
/// The source is taken as a list of slices so the caller can patch the
/// message-length field of the header without copying or mutating the
/// original buffer.
///
/// # Test
///
/// ```
/// use stun_kit_codec::crypto::hmac_sha1;
///
/// let buffer = [
///     0x00u8, 0x03, 0x00, 0x50, 0x21, 0x12, 0xa4, 0x42, 0x64, 0x4f, 0x5a,
///     0x78, 0x6a, 0x56, 0x33, 0x62, 0x4b, 0x52, 0x33, 0x31, 0x00, 0x19, 0x00,
///     0x04, 0x11, 0x00, 0x00, 0x00, 0x00, 0x06, 0x00, 0x05, 0x70, 0x61, 0x6e,
///     0x64, 0x61, 0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x09, 0x72, 0x61, 0x73,
///     0x70, 0x62, 0x65, 0x72, 0x72, 0x79, 0x00, 0x00, 0x00, 0x00, 0x15, 0x00,
///     0x10, 0x31, 0x63, 0x31, 0x33, 0x64, 0x32, 0x62, 0x32, 0x34, 0x35, 0x62,
///     0x33, 0x61, 0x37, 0x33, 0x34,
/// ];
///
/// let key = [
///     0x3eu8, 0x2f, 0x79, 0x1e, 0x1f, 0x14, 0xd1, 0x73, 0xfc, 0x91, 0xff,
///     0x2f, 0x59, 0xb5, 0x0f, 0xd1,
/// ];
///
/// let sign = [
///     0xd6u8, 0x78, 0x26, 0x99, 0x0e, 0x15, 0x56, 0x15, 0xe5, 0xf4, 0x24,
///     0x74, 0xe2, 0x3c, 0x26, 0xc5, 0xb1, 0x03, 0xb2, 0x6d,
/// ];
///
/// let hmac_output = hmac_sha1(&key, &[&buffer]).unwrap();
///
/// assert_eq!(&hmac_output, &sign);
/// ```
pub fn hmac_sha1(key: &[u8], source: &[&[u8]]) -> Result<[u8; 20], Error> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key).map_err(|_| Error::SummaryFailed)?;
    for buf in source {
        mac.update(buf);
    }

    Ok(mac.finalize().into_bytes().into())
}

/// Verify an HMAC SHA1 tag over a list of slices in constant time.
pub fn hmac_sha1_verify(key: &[u8], source: &[&[u8]], tag: &[u8]) -> Result<(), Error> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key).map_err(|_| Error::SummaryFailed)?;
    for buf in source {
        mac.update(buf);
    }

    mac.verify_slice(tag).map_err(|_| Error::IntegrityFailed)
}

/// HMAC SHA256 digest, for the MESSAGE-INTEGRITY-SHA256 attribute.
pub fn hmac_sha256(key: &[u8], source: &[&[u8]]) -> Result<[u8; 32], Error> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(|_| Error::SummaryFailed)?;
    for buf in source {
        mac.update(buf);
    }

    Ok(mac.finalize().into_bytes().into())
}

/// Verify an HMAC SHA256 tag over a list of slices in constant time.
pub fn hmac_sha256_verify(key: &[u8], source: &[&[u8]], tag: &[u8]) -> Result<(), Error> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(|_| Error::SummaryFailed)?;
    for buf in source {
        mac.update(buf);
    }

    mac.verify_slice(tag).map_err(|_| Error::IntegrityFailed)
}

/// CRC32 Fingerprint.
///
/// The CRC is the zlib one (ITU V.42 polynomial); the result is XOR'ed
/// with 0x5354554e so the FINGERPRINT check does not report a false
/// positive on a packet carrying a CRC-32 of some other protocol.
///
/// # Test
///
/// ```
/// use stun_kit_codec::crypto::fingerprint;
///
/// assert_eq!(fingerprint(b"1"), 3498621689);
/// ```
pub fn fingerprint(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes) ^ 0x5354_554e
}

/// create long term credential for md5.
///
/// > key = MD5(username ":" OpaqueString(realm) ":" OpaqueString(password))
///
/// # Test
///
/// ```
/// use stun_kit_codec::crypto::password_md5;
///
/// let buffer = [
///     0x3eu8, 0x2f, 0x79, 0x1e, 0x1f, 0x14, 0xd1, 0x73, 0xfc, 0x91, 0xff,
///     0x2f, 0x59, 0xb5, 0x0f, 0xd1,
/// ];
///
/// let key = password_md5("panda", "panda", "raspberry");
///
/// assert_eq!(key, buffer);
/// ```
pub fn password_md5(username: &str, password: &str, realm: &str) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update([username, realm, password].join(":"));
    hasher.finalize().into()
}

/// create long term credential for sha256.
///
/// > key = SHA256(username ":" OpaqueString(realm) ":" OpaqueString(password))
///
/// # Test
///
/// ```
/// use stun_kit_codec::crypto::password_sha256;
///
/// let key = password_sha256("panda", "panda", "raspberry");
///
/// assert_eq!(key.len(), 32);
/// ```
pub fn password_sha256(username: &str, password: &str, realm: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([username, realm, password].join(":"));
    hasher.finalize().into()
}

/// create the USERHASH value for username anonymity.
///
/// > userhash = SHA-256(OpaqueString(username) ":" OpaqueString(realm))
///
/// # Test
///
/// ```
/// use stun_kit_codec::crypto::userhash;
///
/// assert_eq!(userhash("panda", "raspberry").len(), 32);
/// ```
pub fn userhash(username: &str, realm: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([username, realm].join(":"));
    hasher.finalize().into()
}
