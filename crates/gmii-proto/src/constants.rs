//! Ethernet framing constants.

/// Width of the GMII data bus in bits.
pub const DATA_WIDTH: u32 = 8;

/// Number of bytes transferred per active cycle.
pub const BYTE_WIDTH: usize = 1;

/// Preamble and start-of-frame delimiter bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EthPre {
    /// Preamble byte, alternating ones and zeros on the wire.
    Pre = 0x55,
    /// Start-of-frame delimiter, the last byte before the destination MAC.
    Sfd = 0xD5,
}

impl EthPre {
    /// Raw byte value.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Standard 8-byte Ethernet preamble: seven `0x55` followed by `0xD5`.
pub const ETH_PREAMBLE: [u8; 8] = [
    EthPre::Pre.to_u8(),
    EthPre::Pre.to_u8(),
    EthPre::Pre.to_u8(),
    EthPre::Pre.to_u8(),
    EthPre::Pre.to_u8(),
    EthPre::Pre.to_u8(),
    EthPre::Pre.to_u8(),
    EthPre::Sfd.to_u8(),
];
