mod args;
mod coastline_ring;
mod geometry;
mod osm_parser;
mod output;
mod projection;
mod ring_collection;
mod validity;

use args::Args;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use osm_parser::parse_coastline_data;
use output::OutputDatabase;
use projection::OutputSrs;
use ring_collection::RingCollection;
use std::fs::File;
use std::io::BufReader;
use std::process::exit;

pub const RETURN_CODE_OK: i32 = 0;
pub const RETURN_CODE_WARNING: i32 = 1;
pub const RETURN_CODE_ERROR: i32 = 2;
pub const RETURN_CODE_CMDLINE: i32 = 3;
pub const RETURN_CODE_FATAL: i32 = 4;

fn main() {
    let args: Args = Args::parse();
    args.run();

    let srs = OutputSrs::from_epsg(args.srs).unwrap_or_else(|e| {
        eprintln!("{}", format!("Error! {e}").red().bold());
        exit(RETURN_CODE_CMDLINE);
    });
    if args.debug {
        eprintln!("Writing output in EPSG:{}", srs.epsg());
    }

    println!("{} Reading input file...", "[1/6]".bold());
    let file = File::open(&args.file).unwrap_or_else(|e| {
        eprintln!(
            "{}",
            format!("Error! Failed to open '{}': {e}", args.file.display())
                .red()
                .bold()
        );
        exit(RETURN_CODE_FATAL);
    });
    let raw_data: serde_json::Value =
        serde_json::from_reader(BufReader::new(file)).unwrap_or_else(|e| {
            eprintln!(
                "{}",
                format!("Error! Input file is not valid JSON: {e}")
                    .red()
                    .bold()
            );
            exit(RETURN_CODE_FATAL);
        });
    let parsed = parse_coastline_data(&raw_data).unwrap_or_else(|e| {
        eprintln!("{}", format!("Error! {e}").red().bold());
        exit(RETURN_CODE_FATAL);
    });

    let mut warnings: u32 = parsed.ways_dropped;
    let mut errors: u32 = 0;

    println!(
        "{} Assembling {} coastline ways into rings...",
        "[2/6]".bold(),
        parsed.ways.len()
    );
    let mut coastline_rings = RingCollection::new();
    let assemble_pb: ProgressBar = ProgressBar::new(parsed.ways.len() as u64);
    assemble_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:45.white/black}] {pos}/{len} ways ({eta})")
            .unwrap(),
    );
    for way in &parsed.ways {
        coastline_rings.add_way(way);
        assemble_pb.inc(1);
    }
    assemble_pb.finish_and_clear();

    println!("{} Resolving node positions...", "[3/6]".bold());
    coastline_rings.setup_positions(&parsed.positions);

    let mut output = OutputDatabase::create(&args.output, srs);

    println!("{} Checking for intersections...", "[4/6]".bold());
    errors += coastline_rings.check_for_intersections(&mut output, args.debug);

    println!("{} Closing gaps...", "[5/6]".bold());
    if args.close_distance > 0.0 {
        coastline_rings.close_rings(&mut output, args.debug, args.close_distance);
    }

    println!("{} Writing output layers...", "[6/6]".bold());
    warnings += coastline_rings.output_rings(&mut output);
    let polygons = coastline_rings.polygons();
    warnings += coastline_rings.output_questionable(&polygons, &mut output);
    output.commit();

    eprintln!("Ways: {}", coastline_rings.num_ways());
    eprintln!(
        "Rings: {} ({} from a single way, {} fixed)",
        coastline_rings.num_rings(),
        coastline_rings.num_rings_from_single_way(),
        coastline_rings.num_fixed_rings()
    );
    eprintln!(
        "Unconnected nodes: {}",
        coastline_rings.num_unconnected_nodes()
    );
    eprintln!("Polygons: {}", polygons.len());
    eprintln!("There were {warnings} warnings.");
    eprintln!("There were {errors} errors.");

    let return_code = if errors > 0 {
        RETURN_CODE_ERROR
    } else if warnings > 0 {
        RETURN_CODE_WARNING
    } else {
        RETURN_CODE_OK
    };
    exit(return_code);
}
