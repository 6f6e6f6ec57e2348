//! Control character constants.

/// C0 control characters
pub mod c0 {
    pub const NUL: u8 = 0x00;
    pub const ENQ: u8 = 0x05;
    pub const BEL: u8 = 0x07;
    pub const BS: u8 = 0x08;
    pub const HT: u8 = 0x09;
    pub const LF: u8 = 0x0A;
    pub const VT: u8 = 0x0B;
    pub const FF: u8 = 0x0C;
    pub const CR: u8 = 0x0D;
    pub const SO: u8 = 0x0E;
    pub const SI: u8 = 0x0F;
    pub const CAN: u8 = 0x18;
    pub const SUB: u8 = 0x1A;
    pub const ESC: u8 = 0x1B;
    pub const DEL: u8 = 0x7F;
}
