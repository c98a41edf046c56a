use uuid::Uuid;

/// Conversions between a [`Uuid`] and the `BINARY(16)` column layout used by
/// every table in this schema: the most-significant 64 bits followed by the
/// least-significant 64 bits, each big-endian. This matches MariaDB/MySQL's
/// own `UUID_TO_BIN(x)` (without the swap flag), so rows inserted outside the
/// application stay queryable.
pub fn encode(id: Uuid) -> [u8; 16] {
    let (hi, lo) = id.as_u64_pair();
    let mut buf = [0u8; 16];
    buf[..8].copy_from_slice(&hi.to_be_bytes());
    buf[8..].copy_from_slice(&lo.to_be_bytes());
    buf
}

/// Reads back a `BINARY(16)` value. Returns `None` for anything that is not
/// exactly 16 bytes rather than erroring; callers decide whether a short
/// column value is fatal.
pub fn decode(bytes: &[u8]) -> Option<Uuid> {
    if bytes.len() != 16 {
        return None;
    }
    let hi = u64::from_be_bytes(bytes[..8].try_into().ok()?);
    let lo = u64::from_be_bytes(bytes[8..].try_into().ok()?);
    Some(Uuid::from_u64_pair(hi, lo))
}
