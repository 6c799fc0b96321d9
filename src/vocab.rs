//! Character vocabulary the classifier was trained on.

pub const VOCAB_SIZE: usize = 39;

/// Index order matches the training vocabulary: `-`, `.`, digits, `_`, letters.
pub const CHARSET: [char; VOCAB_SIZE] = [
    '-', '.', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '_',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

#[inline]
pub fn char_index(c: char) -> Option<u8> {
    let idx = match c {
        '-' => 0,
        '.' => 1,
        '0'..='9' => 2 + (c as u8 - b'0'),
        '_' => 12,
        'a'..='z' => 13 + (c as u8 - b'a'),
        _ => return None,
    };
    Some(idx)
}

#[inline]
pub fn index_char(idx: u8) -> Option<char> {
    CHARSET.get(idx as usize).copied()
}
