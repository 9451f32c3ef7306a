use std::collections::HashMap;
use std::str::FromStr;

use nom::IResult;
use nom::branch::alt;
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{all_consuming, map, map_res, opt};
use nom::error::VerboseError;
use nom::multi::{many1, separated_list1};
use nom::sequence::{delimited, pair, preceded, tuple};

use crate::bigint::BigNat;
use crate::error::{Error, Result};
use crate::factor::TableEntry;

/// Default modulus when the trailing ", p" is omitted.
const DEFAULT_MODULUS: u64 = 2;

/// Degrees beyond this are taken as typos rather than intent.
const MAX_PARSED_DEGREE: usize = 1_000_000;

/// Parse the external polynomial form, e.g. `x^4 + x + 1, 2` or
/// `x ^ 19 + 9 x + 2, 13`. Returns the dense coefficient vector a0..an and
/// the modulus.
pub fn parse_poly(input: &str) -> Result<(Vec<u64>, u64)> {
    let (terms, modulus) = match all_consuming(ws(parse_poly_body))(input) {
        Ok((_, parsed)) => parsed,
        Err(e) => return Err(Error::Parse(format!("{e:?}"))),
    };
    let p = modulus.unwrap_or(DEFAULT_MODULUS);
    if p < 2 {
        return Err(Error::Range(format!("modulus {p} must be at least 2")));
    }
    let degree = terms.iter().map(|(_, e)| *e).max().unwrap_or(0);
    if degree > MAX_PARSED_DEGREE {
        return Err(Error::Range(format!("degree {degree} is unreasonably large")));
    }
    let mut coeffs = vec![0u64; degree + 1];
    let mut seen = vec![false; degree + 1];
    for (c, e) in terms {
        if seen[e] {
            return Err(Error::Parse(format!("duplicate term of degree {e}")));
        }
        if c >= p {
            return Err(Error::Range(format!("coefficient {c} is not below {p}")));
        }
        seen[e] = true;
        coeffs[e] = c;
    }
    Ok((coeffs, p))
}

type PIResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

fn parse_poly_body(input: &str) -> PIResult<'_, (Vec<(u64, usize)>, Option<u64>)> {
    pair(
        separated_list1(ws(char('+')), parse_term),
        opt(preceded(ws(char(',')), ws(u64_lit))),
    )(input)
}

fn parse_term(input: &str) -> PIResult<'_, (u64, usize)> {
    alt((
        // coefficient times a power of x; the `*` is optional
        map(
            tuple((ws(u64_lit), opt(ws(char('*'))), ws(char('x')), parse_exponent)),
            |(c, _, _, e)| (c, e),
        ),
        map(pair(ws(char('x')), parse_exponent), |(_, e)| (1, e)),
        map(ws(u64_lit), |c| (c, 0)),
    ))(input)
}

fn parse_exponent(input: &str) -> PIResult<'_, usize> {
    map(opt(preceded(ws(char('^')), ws(usize_lit))), |e| {
        e.unwrap_or(1)
    })(input)
}

fn u64_lit(input: &str) -> PIResult<'_, u64> {
    map_res(digit1, str::parse::<u64>)(input)
}

fn usize_lit(input: &str) -> PIResult<'_, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn bignat_lit(input: &str) -> PIResult<'_, BigNat> {
    map_res(digit1, BigNat::from_str)(input)
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PIResult<'a, O>
where
    F: FnMut(&'a str) -> PIResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse the embedded factor table: one record per line,
/// `p n: q1^e1 q2^e2 ...`, with an optional `+ residual` marking a known
/// composite remainder and `#` starting a comment.
pub(crate) fn parse_factor_table(input: &str) -> Result<HashMap<(u64, u64), TableEntry>> {
    let mut entries = HashMap::new();
    for (lineno, line) in input.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let (key, entry) = match all_consuming(ws(parse_table_record))(line) {
            Ok((_, parsed)) => parsed,
            Err(e) => {
                return Err(Error::Parse(format!(
                    "factor table line {}: {e:?}",
                    lineno + 1
                )));
            }
        };
        if entries.insert(key, entry).is_some() {
            return Err(Error::Parse(format!(
                "factor table line {}: duplicate entry for {} {}",
                lineno + 1,
                key.0,
                key.1
            )));
        }
    }
    Ok(entries)
}

fn parse_table_record(input: &str) -> PIResult<'_, ((u64, u64), TableEntry)> {
    map(
        tuple((
            ws(u64_lit),
            ws(u64_lit),
            ws(char(':')),
            many1(parse_prime_power),
            opt(preceded(ws(char('+')), ws(bignat_lit))),
        )),
        |(p, n, _, factors, residual)| ((p, n), TableEntry { factors, residual }),
    )(input)
}

fn parse_prime_power(input: &str) -> PIResult<'_, (BigNat, u32)> {
    pair(
        ws(bignat_lit),
        map(opt(preceded(char('^'), u32_lit)), |e| e.unwrap_or(1)),
    )(input)
}

fn u32_lit(input: &str) -> PIResult<'_, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}
