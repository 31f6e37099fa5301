pub mod attributes;
pub mod builder;
pub mod methods;

use crate::{
    Attributes, Error,
    crypto::{fingerprint, hmac_sha1, hmac_sha1_verify, hmac_sha256, hmac_sha256_verify},
    message::{
        attributes::{Attribute, AttributeType},
        methods::Method,
    },
};

use bytes::{BufMut, BytesMut};
use rand::Rng;

/// The magic cookie field MUST contain the fixed value 0x2112A442 in
/// network byte order; it is what tells an RFC 5389+ frame apart from
/// the older RFC 3489 format.
pub const MAGIC_COOKIE: u32 = 0x2112A442;

/// Fill a fresh 96 bit transaction id from the thread local CSPRNG.
///
/// Every byte value is acceptable, the id is an opaque token and
/// carries no structure.
///
/// # Test
///
/// ```
/// use stun_kit_codec::message::generate_transaction_id;
///
/// assert_ne!(generate_transaction_id(), generate_transaction_id());
/// ```
pub fn generate_transaction_id() -> [u8; 12] {
    let mut id = [0u8; 12];
    rand::rng().fill(&mut id[..]);
    id
}

pub struct MessageEncoder<'a> {
    token: &'a [u8],
    bytes: &'a mut BytesMut,
}

impl<'a> MessageEncoder<'a> {
    pub fn new(method: Method, token: &'a [u8; 12], bytes: &'a mut BytesMut) -> Self {
        bytes.clear();
        bytes.put_u16(method.into());
        bytes.put_u16(0);
        bytes.put_u32(MAGIC_COOKIE);
        bytes.put(token.as_slice());

        Self { bytes, token }
    }

    /// rely on old message to create new message.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::methods::*;
    /// use stun_kit_codec::message::*;
    /// use stun_kit_codec::*;
    /// use bytes::BytesMut;
    ///
    /// let buffer = [
    ///     0x00u8, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x72, 0x6d, 0x49,
    ///     0x42, 0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b, 0x2b,
    /// ];
    ///
    /// let mut attributes = Attributes::default();
    /// let mut buf = BytesMut::new();
    /// let old = Message::decode(&buffer[..], &mut attributes).unwrap();
    /// MessageEncoder::extend(BINDING_REQUEST, &old, &mut buf);
    ///
    /// assert_eq!(&buf[..], &buffer[..]);
    /// ```
    pub fn extend(method: Method, reader: &Message<'a>, bytes: &'a mut BytesMut) -> Self {
        let token = reader.transaction_id();

        bytes.clear();
        bytes.put_u16(method.into());
        bytes.put_u16(0);
        bytes.put_u32(MAGIC_COOKIE);
        bytes.put(token);

        Self { bytes, token }
    }

    /// append attribute.
    ///
    /// append attribute to message attribute list.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::attributes::*;
    /// use stun_kit_codec::message::methods::*;
    /// use stun_kit_codec::message::*;
    /// use stun_kit_codec::*;
    /// use bytes::BytesMut;
    ///
    /// let token = [
    ///     0x72u8, 0x6d, 0x49, 0x42, 0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b,
    ///     0x2b,
    /// ];
    ///
    /// let new_buf = [
    ///     0x00u8, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x72, 0x6d, 0x49,
    ///     0x42, 0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b, 0x2b, 0x00, 0x06, 0x00,
    ///     0x05, 0x70, 0x61, 0x6e, 0x64, 0x61, 0x00, 0x00, 0x00,
    /// ];
    ///
    /// let mut buf = BytesMut::new();
    /// let mut message = MessageEncoder::new(BINDING_REQUEST, &token, &mut buf);
    ///
    /// message.append::<UserName>("panda");
    ///
    /// assert_eq!(&new_buf[..], &buf[..]);
    /// ```
    pub fn append<'c, T: Attribute<'c>>(&'c mut self, value: T::Item) {
        self.bytes.put_u16(T::TYPE as u16);

        // reserve the length slot, the value size is only known after
        // the serializer ran.
        let os = self.bytes.len();
        self.bytes.put_u16(0);
        T::serialize(value, self.bytes, self.token);

        let size = self.bytes.len() - os - 2;
        self.bytes[os..os + 2].copy_from_slice(&(size as u16).to_be_bytes());

        // if you need to padding,
        // padding in the zero bytes.
        let psize = alignment_32(size);
        if psize > 0 {
            self.bytes.put(&[0u8; 3][..psize]);
        }
    }

    /// Close the message: write the attribute list size into the header
    /// and, when a key is given, protect the message with message
    /// integrity followed by a fingerprint.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::crypto::password_md5;
    /// use stun_kit_codec::message::methods::*;
    /// use stun_kit_codec::message::*;
    /// use stun_kit_codec::*;
    /// use bytes::BytesMut;
    ///
    /// let token = [
    ///     0x72u8, 0x6d, 0x49, 0x42, 0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b,
    ///     0x2b,
    /// ];
    ///
    /// let result = [
    ///     0, 1, 0, 32, 33, 18, 164, 66, 114, 109, 73, 66, 114, 82, 100, 72, 87,
    ///     98, 75, 43, 0, 8, 0, 20, 69, 14, 110, 68, 82, 30, 232, 222, 44, 240,
    ///     250, 182, 156, 92, 25, 23, 152, 198, 217, 222, 128, 40, 0, 4, 74, 165,
    ///     171, 86,
    /// ];
    ///
    /// let mut buf = BytesMut::with_capacity(1280);
    /// let mut message = MessageEncoder::new(BINDING_REQUEST, &token, &mut buf);
    ///
    /// message
    ///     .flush(Some(&password_md5("panda", "panda", "raspberry")))
    ///     .unwrap();
    ///
    /// assert_eq!(&buf[..], &result);
    /// ```
    pub fn flush(&mut self, key: Option<&[u8]>) -> Result<(), Error> {
        // write attribute list size.
        self.set_len(self.bytes.len() - 20);

        // if need message integrity?
        if let Some(key) = key {
            self.append_integrity(key)?;
            self.append_fingerprint();
        }

        Ok(())
    }

    /// append MessageIntegrity attribute.
    ///
    /// The header length field is updated first so the HMAC covers the
    /// exact prefix that will be on the wire once the attribute is in
    /// place, then the 20 byte digest is written.
    pub fn append_integrity(&mut self, key: &[u8]) -> Result<(), Error> {
        if key.is_empty() || self.bytes.len() < 20 {
            return Err(Error::InvalidInput);
        }

        // the length must count the integrity attribute itself before
        // the digest runs.
        let len = self.bytes.len();
        self.set_len(len + 24 - 20);

        let hmac = hmac_sha1(key, &[self.bytes])?;
        self.bytes.put_u16(AttributeType::MessageIntegrity as u16);
        self.bytes.put_u16(20);
        self.bytes.put(hmac.as_slice());

        Ok(())
    }

    /// append MessageIntegritySha256 attribute.
    ///
    /// Same dance as [`MessageEncoder::append_integrity`] with the
    /// digest grown to 32 bytes.
    pub fn append_integrity_sha256(&mut self, key: &[u8]) -> Result<(), Error> {
        if key.is_empty() || self.bytes.len() < 20 {
            return Err(Error::InvalidInput);
        }

        let len = self.bytes.len();
        self.set_len(len + 36 - 20);

        let hmac = hmac_sha256(key, &[self.bytes])?;
        self.bytes
            .put_u16(AttributeType::MessageIntegritySha256 as u16);
        self.bytes.put_u16(32);
        self.bytes.put(hmac.as_slice());

        Ok(())
    }

    /// append Fingerprint attribute.
    ///
    /// Must run after any integrity attribute; the CRC covers the
    /// patched length field and everything written so far.
    pub fn append_fingerprint(&mut self) {
        let len = self.bytes.len();
        self.set_len(len + 8 - 20);

        let fingerprint = fingerprint(self.bytes);
        self.bytes.put_u16(AttributeType::Fingerprint as u16);
        self.bytes.put_u16(4);
        self.bytes.put_u32(fingerprint);
    }

    // set stun message header size.
    fn set_len(&mut self, len: usize) {
        self.bytes[2..4].copy_from_slice((len as u16).to_be_bytes().as_slice());
    }
}

pub struct Message<'a> {
    /// message method.
    method: Method,
    /// message source bytes.
    bytes: &'a [u8],
    /// message attribute list.
    attributes: &'a Attributes,
    /// an attribute other than fingerprint followed the integrity
    /// attribute; the protection no longer covers the whole message.
    integrity_followed: bool,
}

impl<'a> Message<'a> {
    /// message method.
    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// message transaction id.
    #[inline]
    pub fn transaction_id(&self) -> &'a [u8] {
        &self.bytes[8..20]
    }

    /// Number of attributes surfaced by the decoder.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Pure header validation: reserved bits, magic cookie, and the
    /// length discipline of the frame.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::Message;
    ///
    /// let buffer: [u8; 20] = [
    ///     0x00, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x72, 0x6d, 0x49, 0x42,
    ///     0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b, 0x2b,
    /// ];
    ///
    /// assert!(Message::is_valid(&buffer));
    /// assert!(!Message::is_valid(&buffer[..16]));
    ///
    /// let mut bad = buffer;
    /// bad[0] |= 0x80;
    /// assert!(!Message::is_valid(&bad));
    ///
    /// let mut bad = buffer;
    /// bad[4] = 0x00;
    /// assert!(!Message::is_valid(&bad));
    /// ```
    pub fn is_valid(bytes: &[u8]) -> bool {
        if bytes.len() < 20 || bytes.len() % 4 != 0 {
            return false;
        }

        // leading two bits of the type and trailing two bits of the
        // length are always zero.
        if bytes[0] & 0xC0 != 0 || bytes[3] & 0x03 != 0 {
            return false;
        }

        if bytes[4..8] != MAGIC_COOKIE.to_be_bytes() {
            return false;
        }

        bytes.len() == 20 + u16::from_be_bytes([bytes[2], bytes[3]]) as usize
    }

    /// get attribute.
    ///
    /// get attribute from message attribute list.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::attributes::*;
    /// use stun_kit_codec::message::*;
    /// use stun_kit_codec::*;
    ///
    /// let buffer = [
    ///     0x00u8, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x72, 0x6d, 0x49,
    ///     0x42, 0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b, 0x2b,
    /// ];
    ///
    /// let mut attributes = Attributes::default();
    /// let message = Message::decode(&buffer[..], &mut attributes).unwrap();
    ///
    /// assert!(message.get::<UserName>().is_none());
    /// ```
    pub fn get<T: Attribute<'a>>(&self) -> Option<T::Item> {
        let range = self.attributes.get(&T::TYPE)?;
        T::deserialize(&self.bytes[range], self.transaction_id()).ok()
    }

    /// Gets all the values of an attribute from a list.
    ///
    /// Normally a stun message can have multiple attributes with the same name,
    /// and this function will all the values of the current attribute.
    pub fn get_all<T: Attribute<'a>>(&self) -> impl Iterator<Item = T::Item> {
        self.attributes
            .get_all(&T::TYPE)
            .map(|it| T::deserialize(&self.bytes[it.clone()], self.transaction_id()))
            .filter(|it| it.is_ok())
            .flatten()
    }

    /// The raw value bytes of the first attribute of the given type, a
    /// view into the message buffer.
    pub fn get_raw(&self, kind: AttributeType) -> Option<&'a [u8]> {
        self.attributes.get(&kind).map(|it| &self.bytes[it])
    }

    /// check MessageIntegrity attribute.
    ///
    /// return whether the `MessageIntegrity` attribute contained in the
    /// message can pass the check.
    ///
    /// The HMAC runs over the message prefix with the length field
    /// patched to point at the end of the integrity attribute; the
    /// buffer itself is never touched, so there is no length to
    /// restore afterwards.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::crypto::password_md5;
    /// use stun_kit_codec::message::*;
    /// use stun_kit_codec::*;
    ///
    /// let buffer = [
    ///     0x00u8, 0x03, 0x00, 0x50, 0x21, 0x12, 0xa4, 0x42, 0x64, 0x4f, 0x5a,
    ///     0x78, 0x6a, 0x56, 0x33, 0x62, 0x4b, 0x52, 0x33, 0x31, 0x00, 0x19, 0x00,
    ///     0x04, 0x11, 0x00, 0x00, 0x00, 0x00, 0x06, 0x00, 0x05, 0x70, 0x61, 0x6e,
    ///     0x64, 0x61, 0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x09, 0x72, 0x61, 0x73,
    ///     0x70, 0x62, 0x65, 0x72, 0x72, 0x79, 0x00, 0x00, 0x00, 0x00, 0x15, 0x00,
    ///     0x10, 0x31, 0x63, 0x31, 0x33, 0x64, 0x32, 0x62, 0x32, 0x34, 0x35, 0x62,
    ///     0x33, 0x61, 0x37, 0x33, 0x34, 0x00, 0x08, 0x00, 0x14, 0xd6, 0x78, 0x26,
    ///     0x99, 0x0e, 0x15, 0x56, 0x15, 0xe5, 0xf4, 0x24, 0x74, 0xe2, 0x3c, 0x26,
    ///     0xc5, 0xb1, 0x03, 0xb2, 0x6d,
    /// ];
    ///
    /// let mut attributes = Attributes::default();
    /// let message = Message::decode(&buffer[..], &mut attributes).unwrap();
    /// let result = message
    ///     .checksum(&password_md5("panda", "panda", "raspberry"))
    ///     .is_ok();
    ///
    /// assert!(result);
    /// ```
    pub fn checksum(&self, key: &[u8]) -> Result<(), Error> {
        let range = self
            .attributes
            .get(&AttributeType::MessageIntegrity)
            .ok_or(Error::NotFoundIntegrity)?;

        if self.integrity_followed {
            return Err(Error::IntegrityFailed);
        }

        // start of the integrity attribute, the digest covers
        // everything before it.
        let start = range.start - 4;
        let size_buf = ((start + 24 - 20) as u16).to_be_bytes();

        hmac_sha1_verify(
            key,
            &[&self.bytes[0..2], &size_buf, &self.bytes[4..start]],
            &self.bytes[range],
        )
    }

    /// check MessageIntegritySha256 attribute.
    ///
    /// The SHA256 flavor of [`Message::checksum`]; only the full 32
    /// byte digest form is accepted.
    pub fn checksum_sha256(&self, key: &[u8]) -> Result<(), Error> {
        let range = self
            .attributes
            .get(&AttributeType::MessageIntegritySha256)
            .ok_or(Error::NotFoundIntegrity)?;

        if self.integrity_followed {
            return Err(Error::IntegrityFailed);
        }

        let start = range.start - 4;
        let size_buf = ((start + 36 - 20) as u16).to_be_bytes();

        hmac_sha256_verify(
            key,
            &[&self.bytes[0..2], &size_buf, &self.bytes[4..start]],
            &self.bytes[range],
        )
    }

    /// Verify whichever integrity attribute the message carries,
    /// preferring the SHA256 variant. With `must_be_set` unset an
    /// unprotected message passes.
    pub fn check_message_integrity(&self, key: &[u8], must_be_set: bool) -> Result<(), Error> {
        let result = if self
            .attributes
            .get(&AttributeType::MessageIntegritySha256)
            .is_some()
        {
            self.checksum_sha256(key)
        } else {
            self.checksum(key)
        };

        match result {
            Err(Error::NotFoundIntegrity) if !must_be_set => Ok(()),
            result => result,
        }
    }

    /// check Fingerprint attribute.
    ///
    /// The CRC runs over the message prefix with the length field
    /// patched to the offset of the fingerprint attribute end, exactly
    /// as the emitter computed it.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::methods::*;
    /// use stun_kit_codec::message::*;
    /// use stun_kit_codec::*;
    /// use bytes::BytesMut;
    ///
    /// let token = [
    ///     0x72u8, 0x6d, 0x49, 0x42, 0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b,
    ///     0x2b,
    /// ];
    ///
    /// let mut buf = BytesMut::with_capacity(1280);
    /// let mut message = MessageEncoder::new(BINDING_REQUEST, &token, &mut buf);
    /// message.flush(None).unwrap();
    /// message.append_fingerprint();
    ///
    /// let mut attributes = Attributes::default();
    /// let message = Message::decode(&buf[..], &mut attributes).unwrap();
    ///
    /// assert!(message.check_fingerprint().is_ok());
    /// ```
    pub fn check_fingerprint(&self) -> Result<(), Error> {
        let range = self
            .attributes
            .get(&AttributeType::Fingerprint)
            .ok_or(Error::NotFoundFingerprint)?;

        let value = u32::from_be_bytes(self.bytes[range.clone()].try_into()?);

        let start = range.start - 4;
        let size_buf = ((start + 8 - 20) as u16).to_be_bytes();

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.bytes[0..2]);
        hasher.update(&size_buf);
        hasher.update(&self.bytes[4..start]);

        if hasher.finalize() ^ 0x5354_554e != value {
            return Err(Error::FingerprintFailed);
        }

        Ok(())
    }

    /// [`Message::check_fingerprint`] with the absence policy folded
    /// in: with `must_be_set` unset an unfingerprinted message passes.
    pub fn check_message_fingerprint(&self, must_be_set: bool) -> Result<(), Error> {
        match self.check_fingerprint() {
            Err(Error::NotFoundFingerprint) if !must_be_set => Ok(()),
            result => result,
        }
    }

    /// Decode a frame into attribute views.
    ///
    /// The frame is sliced strictly: an attribute length overrunning
    /// the message, padding overrunning the message, or a length field
    /// contradicting the buffer size is an error, not a truncation.
    ///
    /// Attributes violating the protection ordering (anything after a
    /// fingerprint, anything but a fingerprint after an integrity
    /// attribute) are not surfaced.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::attributes::*;
    /// use stun_kit_codec::message::methods::*;
    /// use stun_kit_codec::message::*;
    /// use stun_kit_codec::*;
    ///
    /// let buffer: [u8; 20] = [
    ///     0x00, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x72, 0x6d, 0x49, 0x42,
    ///     0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b, 0x2b,
    /// ];
    ///
    /// let mut attributes = Attributes::default();
    /// let message = Message::decode(&buffer[..], &mut attributes).unwrap();
    ///
    /// assert_eq!(message.method(), BINDING_REQUEST);
    /// assert!(message.get::<UserName>().is_none());
    /// ```
    pub fn decode(bytes: &'a [u8], attributes: &'a mut Attributes) -> Result<Self, Error> {
        let len = bytes.len();

        // There must be at least a complete header.
        if len < 20 || bytes[0] & 0xC0 != 0 {
            return Err(Error::InvalidInput);
        }

        // First check whether the message length is valid. The length
        // field does not include the header, is a multiple of four and
        // must match the buffer exactly.
        let size = u16::from_be_bytes(bytes[2..4].try_into()?) as usize;
        if size % 4 != 0 || len != size + 20 {
            return Err(Error::InvalidInput);
        }

        // Check whether the magic number is the same.
        if bytes[4..8] != MAGIC_COOKIE.to_be_bytes() {
            return Err(Error::NotFoundMagicNumber);
        }

        let method = Method::from(u16::from_be_bytes(bytes[..2].try_into()?));

        let mut find_integrity = false;
        let mut find_fingerprint = false;
        let mut integrity_followed = false;
        let mut offset = 20;

        while offset < len {
            if len - offset < 4 {
                return Err(Error::InvalidInput);
            }

            // get attribute type and size
            let key = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]);
            let size = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
            offset += 4;

            // check if the attribute length or its padding overflowed
            // the message.
            if len - offset < size {
                return Err(Error::InvalidInput);
            }

            let range = offset..(offset + size);
            let padded = size + alignment_32(size);
            if len - offset < padded {
                return Err(Error::InvalidInput);
            }

            offset += padded;

            let kind = AttributeType::try_from(key).ok();

            // nothing is surfaced after a fingerprint.
            if find_fingerprint {
                continue;
            }

            // only a trailing fingerprint may follow message
            // integrity; anything else taints the protection.
            if find_integrity {
                if kind == Some(AttributeType::Fingerprint) {
                    find_fingerprint = true;
                    attributes.append(AttributeType::Fingerprint, range);
                } else {
                    integrity_followed = true;
                }

                continue;
            }

            // skip the attributes that are not supported.
            let Some(kind) = kind else {
                continue;
            };

            match kind {
                AttributeType::MessageIntegrity | AttributeType::MessageIntegritySha256 => {
                    find_integrity = true;
                }
                AttributeType::Fingerprint => {
                    find_fingerprint = true;
                }
                _ => {}
            }

            attributes.append(kind, range);
        }

        Ok(Self {
            method,
            bytes,
            attributes,
            integrity_followed,
        })
    }

    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::*;
    ///
    /// let buffer: [u8; 20] = [
    ///     0x00, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x72, 0x6d, 0x49, 0x42,
    ///     0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b, 0x2b,
    /// ];
    ///
    /// let size = Message::message_size(&buffer[..]).unwrap();
    ///
    /// assert_eq!(size, 20);
    /// ```
    pub fn message_size(buffer: &[u8]) -> Result<usize, Error> {
        if buffer.len() < 20 || buffer[0] >> 6 != 0 {
            return Err(Error::InvalidInput);
        }

        Ok((u16::from_be_bytes(buffer[2..4].try_into()?) + 20) as usize)
    }
}

/// compute padding size.
///
/// Attribute values are padded out to a multiple of four bytes on the
/// wire; the padding is not part of the value length.
///
/// # Test
///
/// ```
/// use stun_kit_codec::message::alignment_32;
///
/// assert_eq!(alignment_32(4), 0);
/// assert_eq!(alignment_32(0), 0);
/// assert_eq!(alignment_32(5), 3);
/// ```
#[inline(always)]
pub fn alignment_32(size: usize) -> usize {
    let range = size % 4;
    if size == 0 || range == 0 {
        return 0;
    }

    4 - range
}
