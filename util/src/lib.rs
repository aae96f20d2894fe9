use std::{
    fs,
    io::{self, BufRead},
    path::Path,
    str::FromStr,
};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::error;
use miette::GraphicalReportHandler;
use nom::{
    character::complete::{char, digit1},
    combinator::{map_res, opt, recognize},
    error::{FromExternalError, ParseError},
    sequence::tuple,
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};

pub type Span<'a> = LocatedSpan<&'a str>;

/// A line that could not be parsed, located at the byte where parsing gave up.
#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("bad input")]
pub struct BadInput {
    #[source_code]
    src: String,

    #[label("{kind}")]
    bad_bit: miette::SourceSpan,

    kind: String,
}

impl BadInput {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Renders the graphical report, falling back to a plain one-liner.
    pub fn render(&self) -> String {
        let mut s = String::new();
        match GraphicalReportHandler::new().render_report(&mut s, self) {
            Ok(()) => s,
            Err(_) => format!("{self} at offset {}: {}", self.offset(), self.kind),
        }
    }
}

pub fn parse_number<'a, E>(i: Span<'a>) -> IResult<Span<'a>, i64, E>
where
    E: ParseError<Span<'a>> + FromExternalError<Span<'a>, std::num::ParseIntError>,
{
    map_res(recognize(tuple((opt(char('-')), digit1))), |i: Span<'a>| {
        i64::from_str(i.fragment())
    })(i)
}

// Alternatives report the branch that got furthest into the line.
fn deepest_failure(tree: &ErrorTree<Span<'_>>) -> (usize, String) {
    match tree {
        GenericErrorTree::Base { location, kind } => (location.location_offset(), kind.to_string()),
        GenericErrorTree::Stack { base, .. } => deepest_failure(base),
        GenericErrorTree::Alt(branches) => branches
            .iter()
            .map(deepest_failure)
            .max_by_key(|(offset, _)| *offset)
            .unwrap_or_default(),
    }
}

/// Runs `parse_fun` over the whole of `l`, logging a rendered report on failure.
pub fn parse_nice<'a, T, F>(l: &'a str, parse_fun: F) -> Result<T, BadInput>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(Span::new(l));
    line.map_err(|e| {
        let (offset, kind) = deepest_failure(&e);
        let err = BadInput {
            src: l.to_string(),
            bad_bit: miette::SourceSpan::new(offset.into(), 0.into()),
            kind,
        };
        error!("{}", err.render());
        err
    })
}

/// Reads the puzzle input from `path`, or from stdin when there is none.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => read_input_as_string(),
    }
}

pub fn read_input_as_string() -> Result<String> {
    let stdin = io::stdin();

    Itertools::intersperse_with(stdin.lock().lines(), || Ok("\n".to_string()))
        .collect::<std::result::Result<String, _>>()
        .context("reading stdin")
}
