use std::net::SocketAddr;

use anyhow::Result;
use bytes::BytesMut;
use stun_kit_codec::{
    Attributes,
    crypto::fingerprint,
    message::{
        Message, MessageEncoder,
        attributes::{address::IpFamily, error::ErrorType, nonce, *},
        builder::*,
        methods::*,
    },
};

const TRANSACTION_ID: [u8; 12] = [
    0xFA, 0xCE, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0x00,
];

#[test]
fn plain_binding_request() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    let end = binding_request_plain(&mut bytes, &TRANSACTION_ID, Some("software"), true)?;

    assert_eq!(end, 40);
    assert_eq!(&bytes[..2], &[0x00, 0x01]);
    assert_eq!(&bytes[4..8], &[0x21, 0x12, 0xA4, 0x42]);
    assert_eq!(&bytes[8..20], &TRANSACTION_ID);

    // header length counts the attribute bytes only.
    assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]) as usize, end - 20);

    // software value then a trailing fingerprint.
    assert_eq!(&bytes[20..24], &[0x80, 0x22, 0x00, 0x08]);
    assert_eq!(&bytes[24..32], b"software");
    assert_eq!(&bytes[32..36], &[0x80, 0x28, 0x00, 0x04]);

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.method(), BINDING_REQUEST);
    assert_eq!(message.attribute_count(), 2);
    assert_eq!(message.get::<Software>(), Some("software"));
    assert!(message.check_fingerprint().is_ok());

    // the CRC relation: recomputing over the prefix with the length
    // pinned to the fingerprint attribute produces the stored value.
    let stored = message.get::<Fingerprint>().unwrap();
    let mut prefix = bytes[..32].to_vec();
    prefix[2..4].copy_from_slice(&((32u16 - 12).to_be_bytes()));
    assert_eq!(fingerprint(&prefix), stored);

    Ok(())
}

#[test]
fn short_term_binding_request() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    binding_request_short_term(
        &mut bytes,
        &TRANSACTION_ID,
        Some("software"),
        "username",
        b"key",
        true,
    )?;

    // attribute order: username, software, integrity, fingerprint.
    assert_eq!(&bytes[20..24], &[0x00, 0x06, 0x00, 0x08]);
    assert_eq!(&bytes[24..32], b"username");
    assert_eq!(&bytes[32..36], &[0x80, 0x22, 0x00, 0x08]);
    assert_eq!(&bytes[44..48], &[0x00, 0x08, 0x00, 0x14]);
    assert_eq!(&bytes[68..72], &[0x80, 0x28, 0x00, 0x04]);

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.get::<UserName>(), Some("username"));
    assert!(message.checksum(b"key").is_ok());
    assert!(message.checksum(b"ke").is_err());
    assert!(message.check_fingerprint().is_ok());

    Ok(())
}

#[test]
fn tampering_breaks_the_checksum() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    binding_request_short_term(&mut bytes, &TRANSACTION_ID, None, "username", b"key", false)?;

    // flip one bit inside the username value, before the integrity
    // attribute.
    let mut tampered = bytes.to_vec();
    tampered[24] ^= 0x01;

    let mut attributes = Attributes::default();
    let message = Message::decode(&tampered[..], &mut attributes)?;

    assert!(message.checksum(b"key").is_err());

    Ok(())
}

#[test]
fn xor_mapped_address_wire_format() -> Result<()> {
    let addr: SocketAddr = "192.0.2.1:32853".parse()?;

    let mut bytes = BytesMut::with_capacity(1280);
    let mut message = MessageEncoder::new(BINDING_RESPONSE, &TRANSACTION_ID, &mut bytes);
    message.append::<XorMappedAddress>(addr);
    message.flush(None)?;

    // port 0x8055 ^ 0x2112, address 192.0.2.1 ^ 0x2112A442, byte by
    // byte in network order.
    assert_eq!(&bytes[24..32], &[0x00, 0x01, 0xA1, 0x47, 0xE1, 0x12, 0xA6, 0x43]);

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.get::<XorMappedAddress>(), Some(addr));

    Ok(())
}

#[test]
fn xor_address_involution_v6() -> Result<()> {
    let addr: SocketAddr = "[2001:db8::1]:3478".parse()?;

    let mut bytes = BytesMut::with_capacity(1280);
    let mut message = MessageEncoder::new(BINDING_RESPONSE, &TRANSACTION_ID, &mut bytes);
    message.append::<XorMappedAddress>(addr);
    message.flush(None)?;

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.get::<XorMappedAddress>(), Some(addr));

    Ok(())
}

#[test]
fn error_response_preserves_the_method() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    let end = error_response(
        &mut bytes,
        &TRANSACTION_ID,
        Method::from(message_type(100, MessageClass::Request)),
        ErrorCode::new(438, "stale nonce")?,
        None,
    )?;

    // error class bits are set, the method bits survive.
    assert_eq!(bytes[0] & 0x01, 0x01);
    assert_eq!(bytes[1] & 0x10, 0x10);

    let message_type = u16::from_be_bytes([bytes[0], bytes[1]]);
    assert_eq!(method_bits(message_type), 100);
    assert_eq!(MessageClass::of(message_type), MessageClass::ErrorResponse);

    // header length is the attribute byte count.
    assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]) as usize, end - 20);

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    let error = message.get::<ErrorCode>().unwrap();
    assert_eq!(error.code, 438);
    assert_eq!(error.message, "stale nonce");
    assert_eq!(error, ErrorCode::from(ErrorType::StaleNonce));

    Ok(())
}

#[test]
fn integrity_must_be_last_before_fingerprint() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    let mut message = MessageEncoder::new(BINDING_REQUEST, &TRANSACTION_ID, &mut bytes);
    message.append::<UserName>("username");
    message.flush(None)?;
    message.append_integrity(b"key")?;

    // sneak another attribute in after the protection and fix the
    // header length by hand.
    message.append::<Software>("tampered");
    let total = bytes.len();
    bytes[2..4].copy_from_slice(&((total - 20) as u16).to_be_bytes());

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    // the trailing attribute is stripped from the view list and the
    // protection no longer verifies.
    assert!(message.get::<Software>().is_none());
    assert!(message.check_message_integrity(b"key", true).is_err());

    Ok(())
}

#[test]
fn missing_protection_and_the_must_be_set_flag() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    binding_request_plain(&mut bytes, &TRANSACTION_ID, None, false)?;

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert!(message.check_message_integrity(b"key", false).is_ok());
    assert!(message.check_message_integrity(b"key", true).is_err());
    assert!(message.check_message_fingerprint(false).is_ok());
    assert!(message.check_message_fingerprint(true).is_err());

    Ok(())
}

#[test]
fn sha256_protection_round_trip() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    let mut message = MessageEncoder::new(BINDING_REQUEST, &TRANSACTION_ID, &mut bytes);
    message.append::<UserName>("username");
    message.flush(None)?;
    message.append_integrity_sha256(b"key")?;
    message.append_fingerprint();

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.get::<MessageIntegritySha256>().map(<[u8]>::len), Some(32));
    assert!(message.checksum_sha256(b"key").is_ok());
    assert!(message.checksum_sha256(b"other key").is_err());
    assert!(message.check_message_integrity(b"key", true).is_ok());
    assert!(message.check_fingerprint().is_ok());

    Ok(())
}

#[test]
fn create_permission_request_layout() -> Result<()> {
    let peer: SocketAddr = "127.0.0.1:55616".parse()?;
    let credentials = TurnCredentials {
        username: "user1",
        realm: "localhost",
        nonce: "9jLBcjff3xrKRAES",
        key: b"secret",
    };

    let mut bytes = BytesMut::with_capacity(1280);
    create_permission_request(&mut bytes, &TRANSACTION_ID, peer, &credentials, None, true)?;

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.method(), CREATE_PERMISSION_REQUEST);
    assert_eq!(message.get::<XorPeerAddress>(), Some(peer));
    assert_eq!(message.get::<UserName>(), Some("user1"));
    assert_eq!(message.get::<Realm>(), Some("localhost"));
    assert_eq!(message.get::<Nonce>(), Some("9jLBcjff3xrKRAES"));
    assert!(message.checksum(b"secret").is_ok());
    assert!(message.check_fingerprint().is_ok());

    Ok(())
}

#[test]
fn send_and_data_indications() -> Result<()> {
    let peer: SocketAddr = "127.0.0.1:55616".parse()?;

    let mut bytes = BytesMut::with_capacity(1280);
    send_indication(&mut bytes, &TRANSACTION_ID, peer, b"hello world", false)?;

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.method(), SEND_INDICATION);
    assert_eq!(message.get::<XorPeerAddress>(), Some(peer));
    assert_eq!(message.get::<Data>(), Some(&b"hello world"[..]));

    let mut bytes = BytesMut::with_capacity(1280);
    data_indication(&mut bytes, &TRANSACTION_ID, peer, b"hello world", false)?;

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.method(), DATA_INDICATION);
    assert_eq!(message.get::<Data>(), Some(&b"hello world"[..]));

    Ok(())
}

#[test]
fn attribute_round_trips() -> Result<()> {
    let v4: SocketAddr = "192.0.2.1:32853".parse()?;
    let v6: SocketAddr = "[2001:db8::42]:443".parse()?;

    let mut bytes = BytesMut::with_capacity(1280);
    let mut message = MessageEncoder::new(ALLOCATE_REQUEST, &TRANSACTION_ID, &mut bytes);

    message.append::<MappedAddress>(v4);
    message.append::<XorMappedAddress>(v4);
    message.append::<XorPeerAddress>(v6);
    message.append::<XorRelayedAddress>(v4);
    message.append::<AlternateServer>(v6);
    message.append::<UserName>("username");
    message.append::<Realm>("localhost");
    message.append::<Nonce>("UHm1hiE0jm9r9rGS");
    message.append::<Software>("software");
    message.append::<AlternateDomain>("stun.example.org");
    message.append::<ErrorCode>(ErrorCode::from(ErrorType::Unauthorized));
    message.append::<UnknownAttributes>(vec![0x0002, 0x0004]);
    message.append::<ChannelNumber>(0x4000);
    message.append::<Lifetime>(600);
    message.append::<RequestedTransport>(RequestedTransport::Udp);
    message.append::<RequestedAddressFamily>(IpFamily::V4);
    message.append::<AdditionalAddressFamily>(IpFamily::V6);
    message.append::<EvenPort>(true);
    message.append::<DontFragment>(());
    message.append::<ReservationToken>(0x0123_4567_89AB_CDEF);
    message.append::<Icmp>(Icmp {
        kind: 3,
        code: 1,
        data: 0xDEAD_BEEF,
    });
    message.append::<AddressErrorCode>(AddressErrorCode {
        family: IpFamily::V6,
        code: 440,
        message: "Address Family not Supported",
    });
    message.append::<PasswordAlgorithm>(PasswordAlgorithm::Sha256);
    message.append::<PasswordAlgorithms>(vec![
        PasswordAlgorithm::Md5,
        PasswordAlgorithm::Sha256,
    ]);
    message.append::<UserHash>(&[7u8; 32][..]);
    message.append::<Priority>(0x6E00_28FF);
    message.append::<UseCandidate>(());
    message.append::<IceControlled>(0x2249_DA28_2C6F_2EDB);
    message.append::<IceControlling>(0x1122_3344_5566_7788);
    message.append::<Data>(b"payload");

    message.flush(None)?;

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;

    assert_eq!(message.get::<MappedAddress>(), Some(v4));
    assert_eq!(message.get::<XorMappedAddress>(), Some(v4));
    assert_eq!(message.get::<XorPeerAddress>(), Some(v6));
    assert_eq!(message.get::<XorRelayedAddress>(), Some(v4));
    assert_eq!(message.get::<AlternateServer>(), Some(v6));
    assert_eq!(message.get::<UserName>(), Some("username"));
    assert_eq!(message.get::<Realm>(), Some("localhost"));
    assert_eq!(message.get::<Nonce>(), Some("UHm1hiE0jm9r9rGS"));
    assert_eq!(message.get::<Software>(), Some("software"));
    assert_eq!(message.get::<AlternateDomain>(), Some("stun.example.org"));
    assert_eq!(
        message.get::<ErrorCode>(),
        Some(ErrorCode::from(ErrorType::Unauthorized))
    );
    assert_eq!(
        message.get::<UnknownAttributes>(),
        Some(vec![0x0002, 0x0004])
    );
    assert_eq!(message.get::<ChannelNumber>(), Some(0x4000));
    assert_eq!(message.get::<Lifetime>(), Some(600));
    assert_eq!(
        message.get::<RequestedTransport>(),
        Some(RequestedTransport::Udp)
    );
    assert_eq!(message.get::<RequestedAddressFamily>(), Some(IpFamily::V4));
    assert_eq!(message.get::<AdditionalAddressFamily>(), Some(IpFamily::V6));
    assert_eq!(message.get::<EvenPort>(), Some(true));
    assert!(message.get::<DontFragment>().is_some());
    assert_eq!(message.get::<ReservationToken>(), Some(0x0123_4567_89AB_CDEF));
    assert_eq!(
        message.get::<Icmp>(),
        Some(Icmp {
            kind: 3,
            code: 1,
            data: 0xDEAD_BEEF,
        })
    );
    assert_eq!(
        message.get::<AddressErrorCode>().map(|it| (it.family, it.code)),
        Some((IpFamily::V6, 440))
    );
    assert_eq!(
        message.get::<PasswordAlgorithm>(),
        Some(PasswordAlgorithm::Sha256)
    );
    assert_eq!(
        message.get::<PasswordAlgorithms>(),
        Some(vec![PasswordAlgorithm::Md5, PasswordAlgorithm::Sha256])
    );
    assert_eq!(message.get::<UserHash>(), Some(&[7u8; 32][..]));
    assert_eq!(message.get::<Priority>(), Some(0x6E00_28FF));
    assert!(message.get::<UseCandidate>().is_some());
    assert_eq!(message.get::<IceControlled>(), Some(0x2249_DA28_2C6F_2EDB));
    assert_eq!(message.get::<IceControlling>(), Some(0x1122_3344_5566_7788));
    assert_eq!(message.get::<Data>(), Some(&b"payload"[..]));

    Ok(())
}

#[test]
fn every_append_keeps_the_cursor_aligned() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    let mut message = MessageEncoder::new(BINDING_REQUEST, &TRANSACTION_ID, &mut bytes);

    message.append::<UserName>("abc");
    assert_eq!(bytes.len() % 4, 0);

    let mut message = MessageEncoder::new(BINDING_REQUEST, &TRANSACTION_ID, &mut bytes);
    message.append::<Data>(b"12345");
    assert_eq!(bytes.len() % 4, 0);

    let mut message = MessageEncoder::new(BINDING_REQUEST, &TRANSACTION_ID, &mut bytes);
    message.append::<Software>("odd length.");
    message.flush(None)?;
    assert_eq!(bytes.len() % 4, 0);

    Ok(())
}

#[test]
fn class_and_method_are_orthogonal() {
    let classes = [
        MessageClass::Request,
        MessageClass::Indication,
        MessageClass::SuccessResponse,
        MessageClass::ErrorResponse,
    ];

    for method in 0..=0xFFF {
        for class in classes {
            let ty = message_type(method, class);
            assert_eq!(ty & 0xC000, 0);
            assert_eq!(method_bits(ty), method);
            assert_eq!(MessageClass::of(ty), class);
            assert_eq!(u16::from(Method::from(ty)), ty);
        }
    }
}

#[test]
fn malformed_frames_are_rejected() -> Result<()> {
    let mut bytes = BytesMut::with_capacity(1280);
    binding_request_plain(&mut bytes, &TRANSACTION_ID, Some("software"), false)?;

    // truncated attribute list.
    let mut attributes = Attributes::default();
    assert!(Message::decode(&bytes[..bytes.len() - 4], &mut attributes).is_err());

    // attribute length overruns the message.
    let mut overrun = bytes.to_vec();
    overrun[23] = 0xFF;
    let mut attributes = Attributes::default();
    assert!(Message::decode(&overrun[..], &mut attributes).is_err());

    // broken magic cookie.
    let mut cookie = bytes.to_vec();
    cookie[4] = 0x00;
    let mut attributes = Attributes::default();
    assert!(Message::decode(&cookie[..], &mut attributes).is_err());

    // a well formed message with zero attributes slices to nothing.
    let mut bytes = BytesMut::with_capacity(64);
    let mut message = MessageEncoder::new(BINDING_REQUEST, &TRANSACTION_ID, &mut bytes);
    message.flush(None)?;

    let mut attributes = Attributes::default();
    let message = Message::decode(&bytes[..], &mut attributes)?;
    assert_eq!(message.attribute_count(), 0);

    Ok(())
}

#[test]
fn security_nonce_round_trip() -> Result<()> {
    for length in [14, 16, 33, 128, 763] {
        let value = nonce::generate(length, nonce::USERNAME_ANONYMITY)?;

        assert_eq!(value.len(), length);
        assert!(nonce::is_security_nonce(&value));
        assert!(nonce::username_anonymity_set(&value));
        assert!(!nonce::password_algorithms_set(&value));

        // a generated nonce is always a legal NONCE attribute value.
        let mut bytes = BytesMut::with_capacity(1280);
        let mut message = MessageEncoder::new(BINDING_REQUEST, &TRANSACTION_ID, &mut bytes);
        message.append::<Nonce>(&value);
        message.flush(None)?;

        let mut attributes = Attributes::default();
        let message = Message::decode(&bytes[..], &mut attributes)?;
        assert_eq!(message.get::<Nonce>(), Some(value.as_str()));
    }

    assert!(nonce::generate(13, 0).is_err());
    assert!(nonce::generate(764, 0).is_err());
    assert!(nonce::generate(32, 0x0100_0000).is_err());

    Ok(())
}
