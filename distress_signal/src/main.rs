use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use distress_signal::{decoder_key, parse_packets, sum_ordered_pair_indices};
use log::info;

/// Checks the order of distress signal packets and finds the decoder key
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Puzzle input file; reads stdin when omitted
    input: Option<PathBuf>,

    /// Only run one part (1 or 2)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=2))]
    part: Option<u8>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let input = util::read_input(args.input.as_deref())?;
    let packets = parse_packets(&input)?;
    info!("parsed {} packets", packets.len());

    if args.part != Some(2) {
        println!("{}", sum_ordered_pair_indices(&packets)?);
    }
    if args.part != Some(1) {
        println!("{}", decoder_key(&packets));
    }

    Ok(())
}
