//! Czech collation for surname ordering.
//!
//! Strings are compared in three passes: base letters, then diacritics, then
//! case. `č ř š ž` are letters of their own sorting after `c r s z`, and the
//! digraph `ch` sorts after `h`. Other accents (`á é ě í ó ú ů ý ď ň ť`) only
//! break ties between otherwise equal strings.

use std::cmp::Ordering;

const PUNCTUATION_BASE: u32 = 0;
const DIGIT_BASE: u32 = 0x100;
const LETTER_BASE: u32 = 0x200;
const OTHER_BASE: u32 = 0x1_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Element {
    primary: u32,
    secondary: u8,
    tertiary: u8,
}

/// Orders two strings the way Czech-locale string comparison does.
pub fn compare_czech(left: &str, right: &str) -> Ordering {
    let left = collation_elements(left);
    let right = collation_elements(right);

    let primary = |elements: &[Element]| elements.iter().map(|e| e.primary).collect::<Vec<_>>();
    let secondary =
        |elements: &[Element]| elements.iter().map(|e| e.secondary).collect::<Vec<_>>();
    let tertiary = |elements: &[Element]| elements.iter().map(|e| e.tertiary).collect::<Vec<_>>();

    primary(&left)
        .cmp(&primary(&right))
        .then_with(|| secondary(&left).cmp(&secondary(&right)))
        .then_with(|| tertiary(&left).cmp(&tertiary(&right)))
}

fn collation_elements(value: &str) -> Vec<Element> {
    let mut elements = Vec::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        let tertiary = u8::from(ch.is_uppercase());
        let lower = ch.to_lowercase().next().unwrap_or(ch);

        if lower == 'c' && matches!(chars.peek(), Some('h' | 'H')) {
            chars.next();
            elements.push(Element {
                primary: letter_weight('h', 1),
                secondary: 0,
                tertiary,
            });
            continue;
        }

        let (primary, secondary) = weigh(lower);
        elements.push(Element {
            primary,
            secondary,
            tertiary,
        });
    }
    elements
}

/// Letters are spaced four apart so that caron letters and `ch` can sit
/// directly after their base letter.
fn letter_weight(base: char, offset: u32) -> u32 {
    LETTER_BASE + (base as u32 - 'a' as u32) * 4 + offset
}

fn weigh(lower: char) -> (u32, u8) {
    match lower {
        'a'..='z' => (letter_weight(lower, 0), 0),
        'č' => (letter_weight('c', 1), 0),
        'ř' => (letter_weight('r', 1), 0),
        'š' => (letter_weight('s', 1), 0),
        'ž' => (letter_weight('z', 1), 0),
        'á' => (letter_weight('a', 0), 1),
        'é' => (letter_weight('e', 0), 1),
        'í' => (letter_weight('i', 0), 1),
        'ó' => (letter_weight('o', 0), 1),
        'ú' => (letter_weight('u', 0), 1),
        'ý' => (letter_weight('y', 0), 1),
        'ď' => (letter_weight('d', 0), 2),
        'ě' => (letter_weight('e', 0), 2),
        'ň' => (letter_weight('n', 0), 2),
        'ť' => (letter_weight('t', 0), 2),
        'ů' => (letter_weight('u', 0), 3),
        'ä' => (letter_weight('a', 0), 4),
        'ë' => (letter_weight('e', 0), 4),
        'ö' => (letter_weight('o', 0), 4),
        'ü' => (letter_weight('u', 0), 4),
        '0'..='9' => (DIGIT_BASE + (lower as u32 - '0' as u32), 0),
        other if other.is_whitespace() || other.is_ascii_punctuation() => {
            (PUNCTUATION_BASE + (other as u32).min(DIGIT_BASE - 1), 0)
        }
        other => (OTHER_BASE + other as u32, 0),
    }
}
