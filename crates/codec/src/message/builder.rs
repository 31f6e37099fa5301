//! Whole-message builders.
//!
//! Each builder composes a complete STUN/TURN message into the caller's
//! buffer: header, application attributes in the canonical order
//! (username, realm, nonce, software), then message integrity and
//! fingerprint last. Every builder returns the ending cursor so the
//! caller can chain writes or prepend a transport level length field.

use std::net::SocketAddr;

use bytes::BytesMut;

use crate::{
    Error, grammar,
    message::{
        MessageEncoder,
        attributes::{
            ChannelNumber, Data, ErrorCode, Nonce, Realm, Software, TEXT_MAX, USERNAME_MAX,
            UserName, XorMappedAddress, XorPeerAddress,
        },
        methods::{
            BINDING_REQUEST, BINDING_RESPONSE, CHANNEL_BIND_REQUEST, CREATE_PERMISSION_REQUEST,
            DATA_INDICATION, Method, SEND_INDICATION,
        },
    },
};

/// Everything a binding request may carry. The attribute order on the
/// wire is fixed; this struct only decides what is present.
#[derive(Default, Clone, Copy)]
pub struct BindingRequestOptions<'a> {
    pub software: Option<&'a str>,
    pub username: Option<&'a str>,
    pub realm: Option<&'a str>,
    pub nonce: Option<&'a str>,
    pub key: Option<&'a [u8]>,
    pub integrity: bool,
    pub fingerprint: bool,
}

/// Long term credential material for the TURN request builders.
#[derive(Clone, Copy)]
pub struct TurnCredentials<'a> {
    pub username: &'a str,
    pub realm: &'a str,
    pub nonce: &'a str,
    pub key: &'a [u8],
}

fn check_username(username: &str) -> Result<(), Error> {
    if username.is_empty() || username.len() > USERNAME_MAX {
        return Err(Error::InvalidInput);
    }

    Ok(())
}

fn check_text(value: &str) -> Result<(), Error> {
    if value.is_empty() || value.len() > TEXT_MAX {
        return Err(Error::InvalidInput);
    }

    Ok(())
}

fn check_quoted_string(value: &str) -> Result<(), Error> {
    check_text(value)?;
    if !grammar::is_quoted_string_content(value.as_bytes()) {
        return Err(Error::InvalidGrammar);
    }

    Ok(())
}

/// Generate a binding request.
///
/// Attribute order: username, realm, nonce, software, message
/// integrity, fingerprint.
///
/// # Test
///
/// ```
/// use stun_kit_codec::message::builder::*;
/// use bytes::BytesMut;
///
/// let transaction_id = [
///     0xFAu8, 0xCE, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99,
///     0x00,
/// ];
///
/// let mut bytes = BytesMut::with_capacity(1280);
/// let end = binding_request(
///     &mut bytes,
///     &transaction_id,
///     &BindingRequestOptions {
///         software: Some("software"),
///         fingerprint: true,
///         ..Default::default()
///     },
/// )
/// .unwrap();
///
/// assert_eq!(end, 40);
/// assert_eq!(&bytes[..2], &[0x00, 0x01]);
/// assert_eq!(&bytes[4..8], &[0x21, 0x12, 0xA4, 0x42]);
/// assert_eq!(&bytes[8..20], &transaction_id);
/// ```
pub fn binding_request(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    options: &BindingRequestOptions,
) -> Result<usize, Error> {
    if let Some(username) = options.username {
        check_username(username)?;
    }

    if let Some(realm) = options.realm {
        check_quoted_string(realm)?;
    }

    if let Some(nonce) = options.nonce {
        check_quoted_string(nonce)?;
    }

    if let Some(software) = options.software {
        check_text(software)?;
    }

    if options.integrity && options.key.is_none_or(|it| it.is_empty()) {
        return Err(Error::InvalidInput);
    }

    let mut message = MessageEncoder::new(BINDING_REQUEST, transaction_id, bytes);
    if let Some(username) = options.username {
        message.append::<UserName>(username);
    }

    if let Some(realm) = options.realm {
        message.append::<Realm>(realm);
    }

    if let Some(nonce) = options.nonce {
        message.append::<Nonce>(nonce);
    }

    if let Some(software) = options.software {
        message.append::<Software>(software);
    }

    message.flush(None)?;

    if options.integrity {
        message.append_integrity(options.key.unwrap_or_default())?;
    }

    if options.fingerprint {
        message.append_fingerprint();
    }

    Ok(bytes.len())
}

/// Binding request without credentials.
pub fn binding_request_plain(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    software: Option<&str>,
    fingerprint: bool,
) -> Result<usize, Error> {
    binding_request(
        bytes,
        transaction_id,
        &BindingRequestOptions {
            software,
            fingerprint,
            ..Default::default()
        },
    )
}

/// Binding request with short term credentials: username and raw key,
/// message integrity always present.
pub fn binding_request_short_term(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    software: Option<&str>,
    username: &str,
    key: &[u8],
    fingerprint: bool,
) -> Result<usize, Error> {
    binding_request(
        bytes,
        transaction_id,
        &BindingRequestOptions {
            software,
            username: Some(username),
            key: Some(key),
            integrity: true,
            fingerprint,
            ..Default::default()
        },
    )
}

/// Binding request with long term credentials: username, realm, nonce
/// and the derived key, message integrity always present.
pub fn binding_request_long_term(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    software: Option<&str>,
    username: &str,
    realm: &str,
    nonce: &str,
    key: &[u8],
    fingerprint: bool,
) -> Result<usize, Error> {
    binding_request(
        bytes,
        transaction_id,
        &BindingRequestOptions {
            software,
            username: Some(username),
            realm: Some(realm),
            nonce: Some(nonce),
            key: Some(key),
            integrity: true,
            fingerprint,
        },
    )
}

/// Binding success response carrying the reflexive transport address.
pub fn binding_response(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    mapped: SocketAddr,
    software: Option<&str>,
    fingerprint: bool,
) -> Result<usize, Error> {
    if let Some(software) = software {
        check_text(software)?;
    }

    let mut message = MessageEncoder::new(BINDING_RESPONSE, transaction_id, bytes);
    message.append::<XorMappedAddress>(mapped);

    if let Some(software) = software {
        message.append::<Software>(software);
    }

    message.flush(None)?;

    if fingerprint {
        message.append_fingerprint();
    }

    Ok(bytes.len())
}

/// Error response to a request, preserving the request method bits.
///
/// # Test
///
/// ```
/// use stun_kit_codec::message::attributes::ErrorCode;
/// use stun_kit_codec::message::builder::*;
/// use stun_kit_codec::message::methods::Method;
/// use bytes::BytesMut;
///
/// let transaction_id = [
///     0xFAu8, 0xCE, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99,
///     0x00,
/// ];
///
/// let mut bytes = BytesMut::with_capacity(1280);
/// error_response(
///     &mut bytes,
///     &transaction_id,
///     Method::from(0x0064),
///     ErrorCode::new(438, "stale nonce").unwrap(),
///     None,
/// )
/// .unwrap();
///
/// assert_eq!(bytes[0] & 0x01, 0x01);
/// assert_eq!(bytes[1] & 0x10, 0x10);
/// ```
pub fn error_response(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    method: Method,
    error: ErrorCode,
    software: Option<&str>,
) -> Result<usize, Error> {
    let method = method.error().ok_or(Error::InvalidInput)?;
    if let Some(software) = software {
        check_text(software)?;
    }

    let mut message = MessageEncoder::new(method, transaction_id, bytes);
    message.append::<ErrorCode>(error);

    if let Some(software) = software {
        message.append::<Software>(software);
    }

    message.flush(None)?;
    Ok(bytes.len())
}

fn append_credentials(
    message: &mut MessageEncoder,
    credentials: &TurnCredentials,
) -> Result<(), Error> {
    check_username(credentials.username)?;
    check_quoted_string(credentials.realm)?;
    check_quoted_string(credentials.nonce)?;
    if credentials.key.is_empty() {
        return Err(Error::InvalidInput);
    }

    message.append::<UserName>(credentials.username);
    message.append::<Realm>(credentials.realm);
    message.append::<Nonce>(credentials.nonce);

    Ok(())
}

/// CreatePermission request: the peer address the permission is for,
/// long term credentials, message integrity always present.
pub fn create_permission_request(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    peer: SocketAddr,
    credentials: &TurnCredentials,
    software: Option<&str>,
    fingerprint: bool,
) -> Result<usize, Error> {
    if let Some(software) = software {
        check_text(software)?;
    }

    let mut message = MessageEncoder::new(CREATE_PERMISSION_REQUEST, transaction_id, bytes);
    message.append::<XorPeerAddress>(peer);
    append_credentials(&mut message, credentials)?;

    if let Some(software) = software {
        message.append::<Software>(software);
    }

    message.flush(None)?;
    message.append_integrity(credentials.key)?;

    if fingerprint {
        message.append_fingerprint();
    }

    Ok(bytes.len())
}

/// Send indication: peer address plus application data, unprotected
/// apart from an optional fingerprint.
pub fn send_indication(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    peer: SocketAddr,
    data: &[u8],
    fingerprint: bool,
) -> Result<usize, Error> {
    let mut message = MessageEncoder::new(SEND_INDICATION, transaction_id, bytes);
    message.append::<XorPeerAddress>(peer);
    message.append::<Data>(data);
    message.flush(None)?;

    if fingerprint {
        message.append_fingerprint();
    }

    Ok(bytes.len())
}

/// Data indication: the mirror image of [`send_indication`], emitted by
/// the relay towards the client.
pub fn data_indication(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    peer: SocketAddr,
    data: &[u8],
    fingerprint: bool,
) -> Result<usize, Error> {
    let mut message = MessageEncoder::new(DATA_INDICATION, transaction_id, bytes);
    message.append::<XorPeerAddress>(peer);
    message.append::<Data>(data);
    message.flush(None)?;

    if fingerprint {
        message.append_fingerprint();
    }

    Ok(bytes.len())
}

/// ChannelBind request: channel number in the TURN range plus the peer
/// it binds to, long term credentials, message integrity always
/// present.
///
/// # Test
///
/// ```
/// use stun_kit_codec::message::builder::*;
/// use bytes::BytesMut;
///
/// let transaction_id = [0u8; 12];
/// let credentials = TurnCredentials {
///     username: "panda",
///     realm: "raspberry",
///     nonce: "9jLBcjff3xrKRAES",
///     key: b"secret",
/// };
///
/// let mut bytes = BytesMut::with_capacity(1280);
/// let peer = "127.0.0.1:8080".parse().unwrap();
///
/// assert!(
///     channel_bind_request(&mut bytes, &transaction_id, 0x3FFF, peer, &credentials, None, false)
///         .is_err()
/// );
/// assert!(
///     channel_bind_request(&mut bytes, &transaction_id, 0x4000, peer, &credentials, None, false)
///         .is_ok()
/// );
/// ```
pub fn channel_bind_request(
    bytes: &mut BytesMut,
    transaction_id: &[u8; 12],
    channel: u16,
    peer: SocketAddr,
    credentials: &TurnCredentials,
    software: Option<&str>,
    fingerprint: bool,
) -> Result<usize, Error> {
    if !(0x4000..=0x7FFF).contains(&channel) {
        return Err(Error::InvalidInput);
    }

    if let Some(software) = software {
        check_text(software)?;
    }

    let mut message = MessageEncoder::new(CHANNEL_BIND_REQUEST, transaction_id, bytes);
    message.append::<ChannelNumber>(channel);
    message.append::<XorPeerAddress>(peer);
    append_credentials(&mut message, credentials)?;

    if let Some(software) = software {
        message.append::<Software>(software);
    }

    message.flush(None)?;
    message.append_integrity(credentials.key)?;

    if fingerprint {
        message.append_fingerprint();
    }

    Ok(bytes.len())
}
