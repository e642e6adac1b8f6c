//! Sensirion CRC-8 (polynomial 0x31, init 0xFF, no reflection, no final XOR).
//!
//! Protects every 16-bit word on the SGP30 bus and the stored baseline record.

const POLYNOMIAL: u8 = 0x31;
const INIT: u8 = 0xFF;

pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = INIT;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
