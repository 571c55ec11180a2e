//! Byte classification lookup tables.

macro_rules! byte_map {
    {
        $(#[$meta:meta])*
        $vis:vis const fn $fn_id:ident($byte:ident:$u8:ty) { $e:expr }
    } => {
        $(#[$meta])*
        $vis const fn $fn_id($byte: $u8) -> bool {
            static PAT: [bool; 256] = {
                let mut bytes = [false; 256];
                let mut $byte = 0u8;
                const fn filter($byte: $u8) -> bool {
                    $e
                }
                loop {
                    bytes[$byte as usize] = filter($byte);
                    if $byte == 255 {
                        break;
                    }
                    $byte += 1;
                }
                bytes
            };
            PAT[$byte as usize]
        }
    };
}

pub(crate) use byte_map;

byte_map! {
    /// token   = 1*tchar
    /// tchar   = "!" / "#" / "$" / "%" / "&" / "'" / "*"
    ///         / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
    ///         / DIGIT / ALPHA
    #[inline(always)]
    pub const fn is_token(byte: u8) {
        matches!(
            byte,
            | b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*'
            | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
        )
        || byte.is_ascii_alphanumeric()
    }
}

byte_map! {
    /// field-value = *( field-content )
    /// field-vchar = VCHAR / obs-text
    ///
    /// SP and HTAB are allowed inside the value.
    #[inline(always)]
    pub const fn is_header_value(byte: u8) {
        matches!(byte, b'\t' | b' ' | 0x21..=0x7E | 0x80..=0xFF)
    }
}

byte_map! {
    /// request-target is sent verbatim, any visible ASCII is accepted.
    #[inline(always)]
    pub const fn is_target(byte: u8) {
        matches!(byte, 0x21..=0x7E)
    }
}

byte_map! {
    /// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
    #[inline(always)]
    pub const fn is_scheme(byte: u8) {
        byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'-' | b'.')
    }
}

/// reason-phrase  = 1*( HTAB / SP / VCHAR / obs-text )
#[inline]
pub const fn is_reason(byte: u8) -> bool {
    is_header_value(byte)
}
