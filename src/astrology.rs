//! Calendar arithmetic behind a reading: tropical zodiac sign and life path number.

use std::fmt;

/// Western tropical zodiac sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZodiacSign {
    Aquarius,
    Pisces,
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// (sign, first month, first day, last month, last day), inclusive on both ends.
const SIGN_RANGES: [(ZodiacSign, u32, u32, u32, u32); 12] = [
    (ZodiacSign::Aquarius, 1, 20, 2, 18),
    (ZodiacSign::Pisces, 2, 19, 3, 20),
    (ZodiacSign::Aries, 3, 21, 4, 19),
    (ZodiacSign::Taurus, 4, 20, 5, 20),
    (ZodiacSign::Gemini, 5, 21, 6, 20),
    (ZodiacSign::Cancer, 6, 21, 7, 22),
    (ZodiacSign::Leo, 7, 23, 8, 22),
    (ZodiacSign::Virgo, 8, 23, 9, 22),
    (ZodiacSign::Libra, 9, 23, 10, 22),
    (ZodiacSign::Scorpio, 10, 23, 11, 21),
    (ZodiacSign::Sagittarius, 11, 22, 12, 21),
    (ZodiacSign::Capricorn, 12, 22, 1, 19),
];

/// Looks up the sign for a day of a month.
///
/// Returns `None` when no range contains the pair, which only happens for
/// out-of-calendar input (month 13, day 0, ...). Callers must treat that as an
/// error rather than invent a sign.
pub fn zodiac_sign(day: u32, month: u32) -> Option<ZodiacSign> {
    if day == 0 || day > 31 {
        return None;
    }
    SIGN_RANGES
        .iter()
        .find(|(_, start_month, start_day, end_month, end_day)| {
            (month == *start_month && day >= *start_day) || (month == *end_month && day <= *end_day)
        })
        .map(|(sign, ..)| *sign)
}

/// Numerology life path number of a date string.
///
/// Sums every decimal digit (separators are ignored) and keeps re-summing until
/// a single digit remains. Master numbers (11, 22) are reduced like any other.
pub fn life_path_number(date: &str) -> u32 {
    let mut total: u32 = date.chars().filter_map(|c| c.to_digit(10)).sum();
    while total > 9 {
        total = digit_sum(total);
    }
    total
}

fn digit_sum(mut n: u32) -> u32 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}
