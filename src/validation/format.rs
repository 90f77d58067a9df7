use crate::config::{ACCESS_KEY_DIGITS, ACCESS_KEY_GROUP};

pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Splits a digit run into space-separated groups of four.
pub fn chunk_digits(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    chars
        .chunks(ACCESS_KEY_GROUP)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keeps the left-most 44 digits of `text`, grouped by four.
pub fn chunk_access_key(text: &str) -> String {
    let digits: String = digits_only(text).chars().take(ACCESS_KEY_DIGITS).collect();
    chunk_digits(&digits)
}

/// `NN.NNN.NNN/NNNN-NN` for 14+ digits, `NNN.NNN.NNN-NN` for 11+,
/// `None` when there are too few digits for either.
pub fn format_tax_id(text: &str) -> Option<String> {
    let d = digits_only(text);
    if d.len() >= 14 {
        Some(format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        ))
    } else if d.len() >= 11 {
        Some(format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]))
    } else {
        None
    }
}
