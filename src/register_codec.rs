use crate::error::CodecError;

/// Number of 16-bit registers that hold one float.
pub const FLOAT_REGISTER_COUNT: u16 = 2;

const FLOAT_BYTES: usize = 4;

/// Reinterprets a 4-byte big-endian buffer as an IEEE-754 single precision float.
///
/// This is a bit-pattern reinterpretation, not a numeric conversion.
pub fn f32_from_be_bytes(bytes: &[u8]) -> Result<f32, CodecError> {
    let raw: [u8; FLOAT_BYTES] = bytes.try_into().map_err(|_| CodecError::Length {
        expected: FLOAT_BYTES,
        actual: bytes.len(),
    })?;
    Ok(f32::from_bits(u32::from_be_bytes(raw)))
}

/// Lays register words out the way they travelled on the wire, high byte first.
pub fn registers_to_be_bytes(registers: &[u16]) -> Vec<u8> {
    registers
        .iter()
        .flat_map(|register| register.to_be_bytes())
        .collect()
}

/// Decodes two consecutive registers (high word first) into a float
pub fn f32_from_registers(registers: &[u16]) -> Result<f32, CodecError> {
    f32_from_be_bytes(&registers_to_be_bytes(registers))
}
