pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

pub(super) fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'@' | b'#' | b'$')
}

/// Whether `bytes[idx..]` starts with `marker` and is not glued to a preceding identifier.
pub(super) fn starts_marker(bytes: &[u8], idx: usize, marker: &[u8]) -> bool {
    let preceded = idx
        .checked_sub(1)
        .and_then(|prev| bytes.get(prev))
        .is_some_and(|b| is_identifier_byte(*b));
    !preceded && bytes[idx..].starts_with(marker)
}
