//! Unsigned LEB128, used to keep signatures compact and self-delimiting.

/// Writes an unsigned LEB128 integer.
pub(crate) fn write_uleb128_u64(out: &mut Vec<u8>, mut value: u64) {
    loop {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "masked to 7 bits before the cast"
        )]
        let mut b = (value & 0x7f) as u8;
        value = value.wrapping_shr(7);
        if value != 0 {
            b |= 0x80;
        }
        out.push(b);
        if value == 0 {
            break;
        }
    }
}

/// Reads an unsigned LEB128 integer as `u64`, updating `offset`.
///
/// Returns `None` on truncated or overlong input.
pub(crate) fn read_uleb128_u64(bytes: &[u8], offset: &mut usize) -> Option<u64> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    for i in 0..10 {
        let b = *bytes.get(*offset)?;
        *offset = offset.checked_add(1)?;

        let payload = b & 0x7f;
        if i == 9 && payload > 1 {
            return None;
        }
        value |= u64::from(payload).checked_shl(shift)?;
        if (b & 0x80) == 0 {
            return Some(value);
        }
        shift = shift.checked_add(7)?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_take_one_byte() {
        let mut buf = Vec::new();
        write_uleb128_u64(&mut buf, 0);
        write_uleb128_u64(&mut buf, 127);
        assert_eq!(buf, vec![0x00, 0x7f]);
    }

    #[test]
    fn uleb128_roundtrip() {
        let values = [0, 1, 2, 127, 128, 129, 16_384, u64::MAX];
        for &v in &values {
            let mut buf = Vec::new();
            write_uleb128_u64(&mut buf, v);
            let mut off = 0;
            assert_eq!(read_uleb128_u64(&buf, &mut off), Some(v));
            assert_eq!(off, buf.len());
        }
    }

    #[test]
    fn concatenated_values_stay_distinct() {
        // [1, 2] and [258] must not share an encoding.
        let mut pair = Vec::new();
        write_uleb128_u64(&mut pair, 1);
        write_uleb128_u64(&mut pair, 2);
        let mut single = Vec::new();
        write_uleb128_u64(&mut single, 258);
        assert_ne!(pair, single);
    }

    #[test]
    fn truncated_input_is_rejected() {
        let mut off = 0;
        assert_eq!(read_uleb128_u64(&[0x80], &mut off), None);
    }
}
