use std::cmp::Ordering;
use std::fmt;
use std::slice;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, warn};
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::map,
    error::{FromExternalError, ParseError},
    multi::separated_list0,
    sequence::delimited,
    IResult,
};
use nom_supreme::error::ErrorTree;
use util::{parse_nice, parse_number, BadInput, Span};

/// Integers appearing in the two divider packets, `[[2]]` and `[[6]]`.
pub const DIVIDERS: [i64; 2] = [2, 6];

/// Derived equality is structural: `5` and `[5]` differ here even though
/// [`compare`] orders them as equal, which is why `Packet` is not `Ord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Integer(i64),
    List(Vec<Packet>),
}

impl Packet {
    pub fn divider(n: i64) -> Self {
        Packet::List(vec![Packet::List(vec![Packet::Integer(n)])])
    }

    /// `[[2]]` or `[[6]]`.
    pub fn is_divider_shaped(&self) -> bool {
        match self {
            Packet::List(outer) => match outer.as_slice() {
                [Packet::List(inner)] => {
                    matches!(inner.as_slice(), [Packet::Integer(n)] if DIVIDERS.contains(n))
                }
                _ => false,
            },
            Packet::Integer(_) => false,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Integer(i) => write!(f, "{i}"),
            Packet::List(v) => write!(f, "[{}]", v.iter().join(",")),
        }
    }
}

/// Orders two packets. A lone integer compared against a list is treated as
/// the one-element list holding it.
pub fn compare(left: &Packet, right: &Packet) -> Ordering {
    match (left, right) {
        (Packet::Integer(l), Packet::Integer(r)) => l.cmp(r),
        (Packet::List(l), Packet::List(r)) => compare_lists(l, r),
        (Packet::Integer(_), Packet::List(r)) => compare_lists(slice::from_ref(left), r),
        (Packet::List(l), Packet::Integer(_)) => compare_lists(l, slice::from_ref(right)),
    }
}

fn compare_lists(left: &[Packet], right: &[Packet]) -> Ordering {
    left.iter()
        .zip(right)
        .map(|(l, r)| compare(l, r))
        .find(|ord| ord.is_ne())
        .unwrap_or_else(|| left.len().cmp(&right.len()))
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SignalError {
    #[error("pair {index} compares equal, so its order is undefined")]
    EqualPair { index: usize },

    #[error("odd number of packets ({len}), the last one has no partner")]
    UnpairedInput { len: usize },
}

fn parse_packet_data<'a, E>(i: Span<'a>) -> IResult<Span<'a>, Packet, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, std::num::ParseIntError>,
{
    alt((
        map(parse_number, Packet::Integer),
        map(
            delimited(tag("["), separated_list0(tag(","), parse_packet_data), tag("]")),
            Packet::List,
        ),
    ))(i)
}

pub fn parse_packet(line: &str) -> Result<Packet, BadInput> {
    parse_nice(line, parse_packet_data::<ErrorTree<Span<'_>>>)
}

/// Parses one packet per non-blank line.
pub fn parse_packets(input: &str) -> Result<Vec<Packet>> {
    input
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .map(|(line_no, l)| {
            parse_packet(l).with_context(|| format!("malformed packet on line {line_no}"))
        })
        .collect()
}

/// Sum of the 1-based indices of the pairs that are already in order.
pub fn sum_ordered_pair_indices(packets: &[Packet]) -> Result<usize, SignalError> {
    if packets.len() % 2 != 0 {
        return Err(SignalError::UnpairedInput { len: packets.len() });
    }

    packets
        .iter()
        .tuples::<(_, _)>()
        .enumerate()
        .try_fold(0, |sum, (i, (left, right))| {
            let index = i + 1;
            let ord = compare(left, right);
            debug!("== Pair {index} == {left} vs {right}: {ord:?}");
            match ord {
                Ordering::Less => Ok(sum + index),
                Ordering::Greater => Ok(sum),
                Ordering::Equal => Err(SignalError::EqualPair { index }),
            }
        })
}

/// Sorts the packets together with the two dividers and multiplies the
/// dividers' 1-based positions.
///
/// Dividers are tracked by a flag carried through the sort, so an input
/// packet that happens to read `[[2]]` or `[[6]]` never counts.
pub fn decoder_key(packets: &[Packet]) -> usize {
    let dividers = DIVIDERS.map(Packet::divider);

    for packet in packets.iter().filter(|p| p.is_divider_shaped()) {
        warn!("input packet {packet} looks like a divider packet");
    }

    packets
        .iter()
        .map(|p| (p, false))
        .chain(dividers.iter().map(|p| (p, true)))
        .sorted_by(|(l, _), (r, _)| compare(l, r))
        .enumerate()
        .inspect(|(i, (p, is_divider))| {
            debug!("{:>4} {p}{}", i + 1, if *is_divider { " (divider)" } else { "" })
        })
        .filter(|(_, (_, is_divider))| *is_divider)
        .map(|(i, _)| i + 1)
        .product()
}
