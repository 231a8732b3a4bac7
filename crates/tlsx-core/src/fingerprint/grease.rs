/// Check if a u16 value is a GREASE value (RFC 8701).
///
/// GREASE values follow the pattern 0x?A?A where both bytes are identical:
/// 0x0A0A, 0x1A1A, ..., 0xFAFA. Clients sprinkle them through cipher suites,
/// extension ids, groups and versions.
pub fn is_grease_u16(val: u16) -> bool {
    let [hi, lo] = val.to_be_bytes();
    hi == lo && (hi & 0x0F) == 0x0A
}

/// Values of `values` with GREASE removed, in their original order.
pub fn without_grease(values: &[u16]) -> impl Iterator<Item = u16> + '_ {
    values.iter().copied().filter(|v| !is_grease_u16(*v))
}
