//! Byte classification tables that route all scanning decisions.

use std::sync::OnceLock;

/// A fixed classification set over the 256 possible byte values.
///
/// Built once from inclusive byte ranges and/or unions of other classes,
/// materialized as a 256-bit membership table for O(1) queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharClass {
    bits: [u64; 4],
}

impl CharClass {
    /// Create an empty class.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: [0; 4] }
    }

    /// Create a class from the given inclusive `(start, end)` byte ranges.
    ///
    /// A single byte is expressed as the range `(byte, byte)`.
    #[must_use]
    pub fn from_ranges(ranges: &[(u8, u8)]) -> Self {
        let mut class = Self::empty();
        for &(start, end) in ranges {
            for byte in start..=end {
                class.bits[usize::from(byte >> 6)] |= 1 << (byte & 63);
            }
        }
        class
    }

    /// Create the union of this class and another.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        for (bits, other_bits) in self.bits.iter_mut().zip(other.bits) {
            *bits |= other_bits;
        }
        self
    }

    /// Whether the given byte is a member of the class.
    #[must_use]
    pub fn contains(&self, byte: u8) -> bool {
        self.bits[usize::from(byte >> 6)] & (1 << (byte & 63)) != 0
    }
}

/// Space, horizontal tab, carriage return, line feed and friends.
pub fn whitespace() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| CharClass::from_ranges(&[(9, 13), (32, 32)]))
}

/// Bytes that may start a word token.
///
/// Besides letters, `_` and `$`, this deliberately includes the non-NUL
/// control bytes and every byte above 127, so UTF-8 continuation bytes stay
/// inside word lexemes.
pub fn word_start() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| {
        CharClass::from_ranges(&[
            (1, 8),
            (14, 31),
            (36, 36),
            (65, 90),
            (95, 95),
            (97, 122),
            (127, 255),
        ])
    })
}

/// Bytes that may continue a word token.
///
/// Word-start plus digits plus `&`, the language's word continuation byte.
pub fn word_continue() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| {
        word_start()
            .union(*digit())
            .union(CharClass::from_ranges(&[(38, 38)]))
    })
}

/// Bytes that may start a symbol token.
///
/// The symbol table asserts at construction time that its first bytes are
/// exactly this class.
pub fn symbol_start() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| {
        CharClass::from_ranges(&[
            (33, 33),
            (37, 38),
            (40, 47),
            (58, 64),
            (91, 94),
            (96, 96),
            (123, 126),
        ])
    })
}

/// Decimal digits.
pub fn digit() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| CharClass::from_ranges(&[(48, 57)]))
}

/// String delimiters: `"` and `'`.
pub fn string_delimiter() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| CharClass::from_ranges(&[(34, 34), (39, 39)]))
}

/// The comment start byte `#`.
pub fn comment_start() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| CharClass::from_ranges(&[(35, 35)]))
}

/// Digits valid in a binary literal.
pub fn binary_digit() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| CharClass::from_ranges(&[(48, 49)]))
}

/// Digits valid in a quaternary literal.
pub fn quaternary_digit() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| CharClass::from_ranges(&[(48, 51)]))
}

/// Digits valid in an octal literal.
pub fn octal_digit() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| CharClass::from_ranges(&[(48, 55)]))
}

/// Digits valid in a hexadecimal literal.
pub fn hex_digit() -> &'static CharClass {
    static CLASS: OnceLock<CharClass> = OnceLock::new();
    CLASS.get_or_init(|| CharClass::from_ranges(&[(48, 57), (65, 70), (97, 102)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_matches_the_ranges() {
        let ranges = [(9u8, 13u8), (32, 32), (97, 102)];
        let class = CharClass::from_ranges(&ranges);

        for byte in 0..=u8::MAX {
            let expected = ranges
                .iter()
                .any(|&(start, end)| byte >= start && byte <= end);
            assert_eq!(class.contains(byte), expected, "byte {byte}");
        }
    }

    #[test]
    fn union_is_the_union_of_memberships() {
        let left = CharClass::from_ranges(&[(0, 10)]);
        let right = CharClass::from_ranges(&[(200, 255)]);
        let union = left.union(right);

        for byte in 0..=u8::MAX {
            assert_eq!(
                union.contains(byte),
                left.contains(byte) || right.contains(byte),
                "byte {byte}"
            );
        }
    }

    #[test]
    fn scanning_classes_are_disjoint() {
        let classes = [
            whitespace(),
            word_start(),
            symbol_start(),
            digit(),
            string_delimiter(),
            comment_start(),
        ];

        for byte in 0..=u8::MAX {
            let members = classes.iter().filter(|class| class.contains(byte)).count();
            assert!(members <= 1, "byte {byte} is in {members} classes");
        }
    }

    #[test]
    fn sentinel_byte_matches_no_class() {
        for class in [
            whitespace(),
            word_start(),
            word_continue(),
            symbol_start(),
            digit(),
            string_delimiter(),
            comment_start(),
        ] {
            assert!(!class.contains(0));
        }
    }
}
