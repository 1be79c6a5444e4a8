//! Addressing of note content on the server.

/// Item path of the note with id `note_id`, e.g. `root:/0123abcd.md:`.
pub fn item_path(note_id: &str) -> String {
    format!("root:/{}.md:", note_id)
}

/// Percent-encode an item path, keeping `:` and `/` literal.
pub fn encode_item_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for piece in path.split_inclusive(|c: char| c == ':' || c == '/') {
        let (segment, delimiter) = match piece.char_indices().last() {
            Some((idx, c)) if c == ':' || c == '/' => (&piece[..idx], &piece[idx..]),
            _ => (piece, ""),
        };
        encoded.push_str(&urlencoding::encode(segment));
        encoded.push_str(delimiter);
    }
    encoded
}

/// Content endpoint for a note, relative to an already-trimmed base URL.
pub fn content_url(base_url: &str, note_id: &str) -> String {
    format!(
        "{}/api/items/{}/content",
        base_url,
        encode_item_path(&item_path(note_id))
    )
}
