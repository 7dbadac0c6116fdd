use crate::error::{Result, VttError};
use crate::shift::Adjustment;
use crate::snip::Snip;

use std::time::Duration;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1, take_while_m_n};
use nom::character::complete::{digit1, one_of};
use nom::combinator::{all_consuming, map_res, verify};
use nom::error::VerboseError;
use nom::sequence::{separated_pair, terminated, tuple};
use nom::IResult;

pub const TIMESTAMP_FORMAT: &str = "[HH:]MM:SS.mmm";
pub const ADJUSTMENT_FORMAT: &str = "<timestamp><+|-><milliseconds>, e.g. 00:11:22.333+4444";
pub const SNIP_FORMAT: &str = "<timestamp>-<timestamp>, e.g. 00:10:00.000-00:20:00.000";

struct Fields {
    hours: u64,
    minutes: u64,
    seconds: u64,
    millis: u64,
}

impl Fields {
    fn total_millis(&self) -> Option<u64> {
        self.hours
            .checked_mul(60)?
            .checked_add(self.minutes)?
            .checked_mul(60)?
            .checked_add(self.seconds)?
            .checked_mul(1000)?
            .checked_add(self.millis)
    }
}

/// Parses a complete WebVTT timestamp. Leading or trailing characters are
/// rejected, as is an hour count too large to represent.
pub fn parse_timestamp(text: &str) -> Result<Duration> {
    let malformed = || VttError::format("timestamp", text, TIMESTAMP_FORMAT);
    let (_, fields) = all_consuming(timestamp)(text).map_err(|_| malformed())?;
    fields
        .total_millis()
        .map(Duration::from_millis)
        .ok_or_else(malformed)
}

/// Parses `<timestamp><sign><milliseconds>`. The sign doubles as the
/// separator, since a timestamp never contains `+` or `-`.
pub fn parse_adjustment(text: &str) -> Result<Adjustment> {
    let malformed = || VttError::format("adjustment", text, ADJUSTMENT_FORMAT);
    let (_, (threshold, sign, digits)) = all_consuming(adjustment)(text).map_err(|_| malformed())?;
    let threshold = parse_timestamp(threshold)?;
    let millis: i64 = digits.parse().map_err(|_| malformed())?;
    let offset = if sign == '-' { -millis } else { millis };
    Ok(Adjustment::new(threshold, offset))
}

/// Parses `<timestamp>-<timestamp>`. The snip must not be empty or reversed.
pub fn parse_snip(text: &str) -> Result<Snip> {
    let (_, (start, stop)) = all_consuming(snip)(text)
        .map_err(|_| VttError::format("snip", text, SNIP_FORMAT))?;
    let start = parse_timestamp(start)?;
    let stop = parse_timestamp(stop)?;
    if start >= stop {
        return Err(VttError::argument(
            text,
            "the start of a snip must lie before its stop",
        ));
    }
    Ok(Snip::new(start, stop))
}

fn timestamp(input: &str) -> IResult<&str, Fields, VerboseError<&str>> {
    alt((long_timestamp, short_timestamp))(input)
}

fn long_timestamp(input: &str) -> IResult<&str, Fields, VerboseError<&str>> {
    let (input, hours) = terminated(hours, tag(":"))(input)?;
    let (input, (minutes, seconds, millis)) = minutes_seconds_millis(input)?;
    Ok((
        input,
        Fields {
            hours,
            minutes,
            seconds,
            millis,
        },
    ))
}

fn short_timestamp(input: &str) -> IResult<&str, Fields, VerboseError<&str>> {
    let (input, (minutes, seconds, millis)) = minutes_seconds_millis(input)?;
    Ok((
        input,
        Fields {
            hours: 0,
            minutes,
            seconds,
            millis,
        },
    ))
}

fn minutes_seconds_millis(input: &str) -> IResult<&str, (u64, u64, u64), VerboseError<&str>> {
    let (input, minutes) = terminated(fixed_digits(2), tag(":"))(input)?;
    let (input, seconds) = terminated(fixed_digits(2), tag("."))(input)?;
    let (input, millis) = fixed_digits(3)(input)?;
    Ok((input, (minutes, seconds, millis)))
}

fn hours(input: &str) -> IResult<&str, u64, VerboseError<&str>> {
    // Unlike minutes and seconds, hours may run past two digits.
    map_res(verify(digit1, |s: &str| s.len() >= 2), |s: &str| {
        s.parse::<u64>()
    })(input)
}

fn fixed_digits<'a>(
    count: usize,
) -> impl FnMut(&'a str) -> IResult<&'a str, u64, VerboseError<&'a str>> {
    map_res(
        take_while_m_n(count, count, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u64>(),
    )
}

fn adjustment(input: &str) -> IResult<&str, (&str, char, &str), VerboseError<&str>> {
    tuple((
        take_till1(|c: char| c == '+' || c == '-'),
        one_of("+-"),
        digit1,
    ))(input)
}

fn snip(input: &str) -> IResult<&str, (&str, &str), VerboseError<&str>> {
    separated_pair(
        take_till1(|c: char| c == '-'),
        tag("-"),
        take_till1(|c: char| c == '-'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Duration {
        Duration::from_millis(((hours * 60 + minutes) * 60 + seconds) * 1000 + millis)
    }

    macro_rules! test_parse_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                let duration = parse_timestamp(input).unwrap();

                assert_eq!(duration.as_millis(), expected);
            }
        )*
        }
    }

    test_parse_ts! {
        test_parse_ts_0: ("00:00:00.000", 0),
        test_parse_ts_1: ("00:00:01.200", 1200),
        test_parse_ts_2: ("00:00:01.002", 1002),
        test_parse_ts_3: ("01:01:01.200", 3_661_200),
        test_parse_ts_4: ("12:34.567", 754_567),
        test_parse_ts_5: ("100:00:00.001", 360_000_001),
        test_parse_ts_6: ("0001:00:00.000", 3_600_000),
        test_parse_ts_7: ("00:00:66.777", 66_777),
    }

    macro_rules! test_reject_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let input = $value;

                let err = parse_timestamp(input).unwrap_err();

                assert_eq!(err, VttError::format("timestamp", input, TIMESTAMP_FORMAT));
            }
        )*
        }
    }

    test_reject_ts! {
        test_reject_ts_empty: "",
        test_reject_ts_one_digit_hour: "1:00:00.000",
        test_reject_ts_one_digit_minute: "00:0:00.000",
        test_reject_ts_three_digit_minute: "123:45.678",
        test_reject_ts_short_millis: "00:00:01.20",
        test_reject_ts_long_millis: "00:00:01.2000",
        test_reject_ts_comma: "00:00:01,200",
        test_reject_ts_leading_space: " 00:00:01.200",
        test_reject_ts_trailing_text: "00:00:01.200x",
        test_reject_ts_no_fraction: "00:00:01",
        test_reject_ts_hour_overflow: "99999999999999999:00:00.000",
    }

    #[test]
    fn test_parse_adjustment_positive() {
        let adj = parse_adjustment("00:11:22.333+4444").unwrap();

        assert_eq!(adj.threshold(), hms(0, 11, 22, 333));
        assert_eq!(adj.offset_millis(), 4444);
    }

    #[test]
    fn test_parse_adjustment_negative() {
        let adj = parse_adjustment("55:44:33.222-1111").unwrap();

        assert_eq!(adj.threshold(), hms(55, 44, 33, 222));
        assert_eq!(adj.offset_millis(), -1111);
    }

    #[test]
    fn test_parse_adjustment_without_hours() {
        let adj = parse_adjustment("14:50.000+5000").unwrap();

        assert_eq!(adj.threshold(), hms(0, 14, 50, 0));
        assert_eq!(adj.offset_millis(), 5000);
    }

    #[test]
    fn test_parse_adjustment_rejects_missing_sign() {
        let err = parse_adjustment("00:11:22.333").unwrap_err();

        assert_eq!(
            err,
            VttError::format("adjustment", "00:11:22.333", ADJUSTMENT_FORMAT)
        );
    }

    #[test]
    fn test_parse_adjustment_rejects_missing_digits() {
        assert!(parse_adjustment("00:11:22.333+").is_err());
        assert!(parse_adjustment("00:11:22.333+12a").is_err());
        assert!(parse_adjustment("+1000").is_err());
    }

    #[test]
    fn test_parse_adjustment_reports_bad_timestamp() {
        let err = parse_adjustment("0:11:22.333+1").unwrap_err();

        assert_eq!(
            err,
            VttError::format("timestamp", "0:11:22.333", TIMESTAMP_FORMAT)
        );
    }

    #[test]
    fn test_parse_snip() {
        let snip = parse_snip("00:11:22.333-44:55:66.777").unwrap();

        assert_eq!(snip.start(), hms(0, 11, 22, 333));
        assert_eq!(snip.stop(), hms(44, 55, 66, 777));
    }

    #[test]
    fn test_parse_snip_rejects_extra_hyphen() {
        let err = parse_snip("00:10:00.000-00:20:00.000-00:30:00.000").unwrap_err();

        assert_eq!(
            err,
            VttError::format("snip", "00:10:00.000-00:20:00.000-00:30:00.000", SNIP_FORMAT)
        );
    }

    #[test]
    fn test_parse_snip_rejects_missing_stop() {
        assert!(parse_snip("00:10:00.000-").is_err());
        assert!(parse_snip("00:10:00.000").is_err());
    }

    #[test]
    fn test_parse_snip_rejects_reversed() {
        let err = parse_snip("20:00.000-10:00.000").unwrap_err();

        assert!(matches!(err, VttError::Argument { .. }));
    }

    #[test]
    fn test_parse_snip_rejects_empty() {
        assert!(parse_snip("10:00.000-10:00.000").is_err());
    }
}
