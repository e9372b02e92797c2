//! Cell-token grammars. The cells the readers care about hold tiny
//! languages — jam-number tokens, trip scores — and these parsers are the
//! only place those grammars are spelled out.

use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map, map_res, opt};
use nom::sequence::terminated;
use nom::IResult;

pub(crate) type ParserResult<'a, Out> = IResult<&'a str, Out>;

/// A jam-number cell: a 1-based jam number, or a star-pass marker. `SP`
/// belongs to the team whose block it appears in; `SP*` records the
/// opposing team's pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JamToken {
    Number(u32),
    StarPass { own: bool },
}

fn jam_number(input: &str) -> ParserResult<JamToken> {
    map_res(digit1, |s: &str| match s.parse::<u32>() {
        // Jam numbers are 1-based; a literal 0 is as unusable as text.
        Ok(n) if n >= 1 => Ok(JamToken::Number(n)),
        _ => Err("jam numbers start at 1"),
    })(input)
}

fn star_pass(input: &str) -> ParserResult<JamToken> {
    let (input, _) = tag_no_case("SP")(input)?;
    let (input, star) = opt(char('*'))(input)?;
    Ok((input, JamToken::StarPass { own: star.is_none() }))
}

/// Parse a trimmed jam-number cell. `None` means the token is malformed,
/// which is fatal to the run.
pub fn parse_jam_token(text: &str) -> Option<JamToken> {
    all_consuming(alt((star_pass, jam_number)))(text.trim())
        .ok()
        .map(|(_, token)| token)
}

/// A trip-score cell. `PointsNoPass` is the `<digits>+NP` form that
/// retroactively scores the initial pass instead of recording a new trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripCell {
    Points(u32),
    PointsNoPass(u32),
}

fn whole_number(input: &str) -> ParserResult<u32> {
    map_res(digit1, str::parse)(input)
}

/// Parse a trimmed trip cell. `None` means the text is not a score at
/// all; the reader skips such cells.
pub fn parse_trip_cell(text: &str) -> Option<TripCell> {
    all_consuming(alt((
        map(terminated(whole_number, tag_no_case("+NP")), TripCell::PointsNoPass),
        map(whole_number, TripCell::Points),
    )))(text.trim())
    .ok()
    .map(|(_, cell)| cell)
}

/// First run of four consecutive digits in the version cell's text, e.g.
/// `"2019"` out of `"WFTDA Statsbook, 2019 edition"`.
pub fn four_digit_year(text: &str) -> Option<&str> {
    text.as_bytes()
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .map(|i| &text[i..i + 4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jam_tokens() {
        assert_eq!(parse_jam_token("12"), Some(JamToken::Number(12)));
        assert_eq!(parse_jam_token(" 3 "), Some(JamToken::Number(3)));
        assert_eq!(parse_jam_token("SP"), Some(JamToken::StarPass { own: true }));
        assert_eq!(parse_jam_token("sp"), Some(JamToken::StarPass { own: true }));
        assert_eq!(parse_jam_token("SP*"), Some(JamToken::StarPass { own: false }));
        assert_eq!(parse_jam_token("sp*"), Some(JamToken::StarPass { own: false }));
    }

    #[test]
    fn malformed_jam_tokens_are_rejected() {
        assert_eq!(parse_jam_token("0"), None);
        assert_eq!(parse_jam_token("3a"), None);
        assert_eq!(parse_jam_token("SP**"), None);
        assert_eq!(parse_jam_token("jam 4"), None);
        assert_eq!(parse_jam_token(""), None);
    }

    #[test]
    fn trip_cells() {
        assert_eq!(parse_trip_cell("4"), Some(TripCell::Points(4)));
        assert_eq!(parse_trip_cell("0"), Some(TripCell::Points(0)));
        assert_eq!(parse_trip_cell("3+NP"), Some(TripCell::PointsNoPass(3)));
        assert_eq!(parse_trip_cell("3+np"), Some(TripCell::PointsNoPass(3)));
        assert_eq!(parse_trip_cell("x"), None);
        assert_eq!(parse_trip_cell("3+4"), None);
    }

    #[test]
    fn version_year_extraction() {
        assert_eq!(four_digit_year("2019"), Some("2019"));
        assert_eq!(four_digit_year("Statsbook 2018 (rev 2)"), Some("2018"));
        assert_eq!(four_digit_year("20192"), Some("2019"));
        assert_eq!(four_digit_year("v2.1"), None);
    }
}
