pub(crate) use str_indices::chars::count as count_chars;
pub(crate) use str_indices::chars::to_byte_idx as char_to_byte;

/// The byte range of the chars `range` in `text`.
pub(crate) fn char_range_to_bytes(
    text: &str,
    range: std::ops::Range<usize>,
) -> std::ops::Range<usize> {
    let start = char_to_byte(text, range.start);
    let end = start + char_to_byte(&text[start..], range.end - range.start);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multibyte_ranges() {
        let text = "a⑤b€c";
        assert_eq!(count_chars(text), 5);
        let bytes = char_range_to_bytes(text, 1..4);
        assert_eq!(&text[bytes], "⑤b€");
        assert_eq!(char_range_to_bytes(text, 5..5), text.len()..text.len());
    }
}
