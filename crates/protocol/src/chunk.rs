use crate::ProtocolError;

/// A decoded chunk-size line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkHeader {
    /// A chunk of this many bytes follows.
    Size(usize),
    /// Zero-length chunk: the chunked body is over.
    Terminator,
}

/// Parses a chunk-size line the way `strtol(line, NULL, 16)` reads it.
///
/// Leading whitespace, a `+` sign and a `0x` prefix are skipped; the size is
/// the longest run of hex digits and anything after it (chunk extensions,
/// trailing garbage) is ignored. No digits, a negative sign or an overflow
/// is a [`ProtocolError::ChunkSize`].
pub fn parse_chunk_size(line: &str) -> Result<ChunkHeader, ProtocolError> {
    let invalid = || ProtocolError::ChunkSize(line.to_string());

    let digits = line.trim_start();
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    let digits = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_hexdigit()) => rest,
        _ => digits,
    };

    let end = digits
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Err(invalid());
    }

    let size = usize::from_str_radix(&digits[..end], 16).map_err(|_| invalid())?;
    Ok(match size {
        0 => ChunkHeader::Terminator,
        n => ChunkHeader::Size(n),
    })
}
