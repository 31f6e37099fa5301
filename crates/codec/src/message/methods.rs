/// STUN Methods Registry
///
/// [RFC5389]: https://datatracker.ietf.org/doc/html/rfc5389
/// [RFC8489]: https://datatracker.ietf.org/doc/html/rfc8489
/// [Section 5]: https://datatracker.ietf.org/doc/html/rfc8489#section-5
///
/// A STUN method is a hex number in the range 0x000-0xFFF. The encoding
/// of a STUN method into a STUN message is described in [Section 5]:
/// the 12 method bits are interleaved around the two class bits C1 and
/// C0, which sit at positions 0x0100 and 0x0010 of the 16 bit message
/// type:
///
/// ```text
///  0                   1
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |0 0|M M M M M C M M M C M M M M|
/// |   |1 1 9 8 7 1 6 5 4 0 3 2 1 0|
/// |   |1 0        .       .       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Methods known to this crate:
///
/// 0x001: Binding
/// 0x003: Allocate
/// 0x004: Refresh
/// 0x006: Send
/// 0x007: Data
/// 0x008: CreatePermission
/// 0x009: ChannelBind
///
/// Everything else is carried through as [`Method::Other`] so upper
/// layers can route methods this crate does not interpret.
#[repr(u16)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum MessageClass {
    Request = 0x0000,
    Indication = 0x0010,
    SuccessResponse = 0x0100,
    ErrorResponse = 0x0110,
}

impl MessageClass {
    /// The C1/C0 bit positions inside the 16 bit message type.
    pub const MASK: u16 = 0x0110;

    pub const fn of(message_type: u16) -> Self {
        match message_type & Self::MASK {
            0x0000 => Self::Request,
            0x0010 => Self::Indication,
            0x0100 => Self::SuccessResponse,
            _ => Self::ErrorResponse,
        }
    }
}

/// Pack a 12 bit method number and a class into a 16 bit message type.
///
/// Setting the class never disturbs the method bits and vice versa.
///
/// # Test
///
/// ```
/// use stun_kit_codec::message::methods::*;
///
/// assert_eq!(message_type(0x001, MessageClass::Request), 0x0001);
/// assert_eq!(message_type(0x001, MessageClass::SuccessResponse), 0x0101);
/// assert_eq!(message_type(0x001, MessageClass::ErrorResponse), 0x0111);
/// assert_eq!(message_type(0x006, MessageClass::Indication), 0x0016);
///
/// for method in 0..=0xFFF {
///     let ty = message_type(method, MessageClass::ErrorResponse);
///     assert_eq!(method_bits(ty), method);
///     assert_eq!(MessageClass::of(ty), MessageClass::ErrorResponse);
/// }
/// ```
pub const fn message_type(method: u16, class: MessageClass) -> u16 {
    ((method & 0x0F80) << 2) | ((method & 0x0070) << 1) | (method & 0x000F) | class as u16
}

/// Extract the 12 bit method number from a 16 bit message type.
pub const fn method_bits(message_type: u16) -> u16 {
    ((message_type >> 2) & 0x0F80) | ((message_type >> 1) & 0x0070) | (message_type & 0x000F)
}

#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Method {
    Binding(MessageClass),
    Allocate(MessageClass),
    CreatePermission(MessageClass),
    ChannelBind(MessageClass),
    Refresh(MessageClass),
    SendIndication,
    DataIndication,
    /// A method this crate does not interpret, kept as the raw method
    /// number so it can be forwarded upstream.
    Other(u16, MessageClass),
}

pub const BINDING_REQUEST: Method = Method::Binding(MessageClass::Request);
pub const BINDING_RESPONSE: Method = Method::Binding(MessageClass::SuccessResponse);
pub const BINDING_ERROR: Method = Method::Binding(MessageClass::ErrorResponse);
pub const ALLOCATE_REQUEST: Method = Method::Allocate(MessageClass::Request);
pub const ALLOCATE_RESPONSE: Method = Method::Allocate(MessageClass::SuccessResponse);
pub const ALLOCATE_ERROR: Method = Method::Allocate(MessageClass::ErrorResponse);
pub const CREATE_PERMISSION_REQUEST: Method = Method::CreatePermission(MessageClass::Request);
pub const CREATE_PERMISSION_RESPONSE: Method =
    Method::CreatePermission(MessageClass::SuccessResponse);
pub const CREATE_PERMISSION_ERROR: Method = Method::CreatePermission(MessageClass::ErrorResponse);
pub const CHANNEL_BIND_REQUEST: Method = Method::ChannelBind(MessageClass::Request);
pub const CHANNEL_BIND_RESPONSE: Method = Method::ChannelBind(MessageClass::SuccessResponse);
pub const CHANNEL_BIND_ERROR: Method = Method::ChannelBind(MessageClass::ErrorResponse);
pub const REFRESH_REQUEST: Method = Method::Refresh(MessageClass::Request);
pub const REFRESH_RESPONSE: Method = Method::Refresh(MessageClass::SuccessResponse);
pub const REFRESH_ERROR: Method = Method::Refresh(MessageClass::ErrorResponse);
pub const SEND_INDICATION: Method = Method::SendIndication;
pub const DATA_INDICATION: Method = Method::DataIndication;

impl Method {
    /// The 12 bit method number.
    pub const fn method(self) -> u16 {
        match self {
            Self::Binding(_) => 0x001,
            Self::Allocate(_) => 0x003,
            Self::Refresh(_) => 0x004,
            Self::SendIndication => 0x006,
            Self::DataIndication => 0x007,
            Self::CreatePermission(_) => 0x008,
            Self::ChannelBind(_) => 0x009,
            Self::Other(method, _) => method,
        }
    }

    pub const fn class(self) -> MessageClass {
        match self {
            Self::SendIndication | Self::DataIndication => MessageClass::Indication,
            Self::Binding(class)
            | Self::Allocate(class)
            | Self::Refresh(class)
            | Self::CreatePermission(class)
            | Self::ChannelBind(class)
            | Self::Other(_, class) => class,
        }
    }

    /// Rewrite the class while preserving the method bits.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::methods::*;
    ///
    /// let method = Method::from(0x0064);
    /// let error = method.with_class(MessageClass::ErrorResponse);
    ///
    /// assert_eq!(error.method(), method.method());
    /// assert_eq!(error.class(), MessageClass::ErrorResponse);
    /// ```
    pub fn with_class(self, class: MessageClass) -> Method {
        Method::from(message_type(self.method(), class))
    }

    pub fn is_request(&self) -> bool {
        matches!(self.class(), MessageClass::Request)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.class(), MessageClass::ErrorResponse)
    }

    /// The success response counterpart, None for indications.
    pub fn success(self) -> Option<Method> {
        if matches!(self.class(), MessageClass::Indication) {
            return None;
        }

        Some(self.with_class(MessageClass::SuccessResponse))
    }

    /// The error response counterpart, None for indications.
    pub fn error(self) -> Option<Method> {
        if matches!(self.class(), MessageClass::Indication) {
            return None;
        }

        Some(self.with_class(MessageClass::ErrorResponse))
    }
}

impl From<u16> for Method {
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::methods::*;
    ///
    /// assert_eq!(Method::from(0x0001), BINDING_REQUEST);
    /// assert_eq!(Method::from(0x0101), BINDING_RESPONSE);
    /// assert_eq!(Method::from(0x0111), BINDING_ERROR);
    /// assert_eq!(Method::from(0x0003), ALLOCATE_REQUEST);
    /// assert_eq!(Method::from(0x0103), ALLOCATE_RESPONSE);
    /// assert_eq!(Method::from(0x0113), ALLOCATE_ERROR);
    /// assert_eq!(Method::from(0x0008), CREATE_PERMISSION_REQUEST);
    /// assert_eq!(Method::from(0x0108), CREATE_PERMISSION_RESPONSE);
    /// assert_eq!(Method::from(0x0118), CREATE_PERMISSION_ERROR);
    /// assert_eq!(Method::from(0x0009), CHANNEL_BIND_REQUEST);
    /// assert_eq!(Method::from(0x0109), CHANNEL_BIND_RESPONSE);
    /// assert_eq!(Method::from(0x0119), CHANNEL_BIND_ERROR);
    /// assert_eq!(Method::from(0x0004), REFRESH_REQUEST);
    /// assert_eq!(Method::from(0x0104), REFRESH_RESPONSE);
    /// assert_eq!(Method::from(0x0114), REFRESH_ERROR);
    /// assert_eq!(Method::from(0x0016), SEND_INDICATION);
    /// assert_eq!(Method::from(0x0017), DATA_INDICATION);
    /// assert_eq!(
    ///     Method::from(message_type(0x0FF, MessageClass::Request)),
    ///     Method::Other(0x0FF, MessageClass::Request)
    /// );
    /// ```
    fn from(value: u16) -> Self {
        let class = MessageClass::of(value);
        match (method_bits(value), class) {
            (0x001, _) => Self::Binding(class),
            (0x003, _) => Self::Allocate(class),
            (0x004, _) => Self::Refresh(class),
            (0x006, MessageClass::Indication) => Self::SendIndication,
            (0x007, MessageClass::Indication) => Self::DataIndication,
            (0x008, _) => Self::CreatePermission(class),
            (0x009, _) => Self::ChannelBind(class),
            (method, _) => Self::Other(method, class),
        }
    }
}

impl From<Method> for u16 {
    /// # Test
    ///
    /// ```
    /// use stun_kit_codec::message::methods::*;
    ///
    /// assert_eq!(0x0001u16, u16::from(BINDING_REQUEST));
    /// assert_eq!(0x0101u16, u16::from(BINDING_RESPONSE));
    /// assert_eq!(0x0111u16, u16::from(BINDING_ERROR));
    /// assert_eq!(0x0016u16, u16::from(SEND_INDICATION));
    /// assert_eq!(0x0017u16, u16::from(DATA_INDICATION));
    /// ```
    fn from(value: Method) -> Self {
        message_type(value.method(), value.class())
    }
}
