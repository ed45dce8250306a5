/// Longest prefix of `value` that fits in `max_bytes` without splitting a
/// character.
pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let end = value
        .char_indices()
        .map(|(idx, _)| idx)
        .take_while(|idx| *idx <= max_bytes)
        .last()
        .unwrap_or(0);
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::truncate_utf8_prefix;

    #[test]
    fn ascii_is_cut_at_limit() {
        assert_eq!(truncate_utf8_prefix("hello", 3), "hel");
        assert_eq!(truncate_utf8_prefix("hello", 10), "hello");
        assert_eq!(truncate_utf8_prefix("hello", 0), "");
    }

    #[test]
    fn multibyte_chars_are_not_split() {
        assert_eq!(truncate_utf8_prefix("a✅b", 2), "a");
        assert_eq!(truncate_utf8_prefix("a✅b", 4), "a✅");
    }
}
