//! Shift cipher, guess normalization and hint masks.

/// Shift every ASCII letter `shift` places forward, wrapping within the
/// alphabet. Case is kept; everything else passes through unchanged.
pub fn encode_shift(text: &str, shift: u8) -> String {
    text.chars().map(|c| rotate(c, shift % 26)).collect()
}

/// Undo [`encode_shift`] with the same `shift`.
pub fn decode_shift(text: &str, shift: u8) -> String {
    text.chars().map(|c| rotate(c, 26 - shift % 26)).collect()
}

fn rotate(c: char, by: u8) -> char {
    let base = match c {
        'a'..='z' => b'a',
        'A'..='Z' => b'A',
        _ => return c,
    };
    (((c as u8 - base + by) % 26) + base) as char
}

/// Case-fold a guess and strip everything but letters and digits.
pub fn normalize_guess(guess: &str) -> String {
    guess
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// How much of the current word a hint discloses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HintTier {
    /// Only the word length.
    Length,
    /// First and last letters.
    Ends,
    /// Every consonant.
    Consonants,
}

impl HintTier {
    /// Tier earned after `wrong` misses on the same word.
    pub fn for_misses(wrong: u32) -> Self {
        match wrong {
            0 => HintTier::Length,
            1 => HintTier::Ends,
            _ => HintTier::Consonants,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    /// Mask `word`, replacing hidden letters with `_`.
    pub fn mask(self, word: &str) -> String {
        let last = word.chars().count().saturating_sub(1);
        word.chars()
            .enumerate()
            .map(|(i, c)| {
                let shown = match self {
                    HintTier::Length => false,
                    HintTier::Ends => i == 0 || i == last,
                    HintTier::Consonants => is_consonant(c),
                };
                if shown {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}
