//! Conway's Game of Life on a sparse live-cell set.
//!
//! Reads "x y" coordinate pairs (one cell per line) from a start file or
//! stdin, advances the given number of generations, and writes the
//! surviving cells back out in the same format. The simulation keeps two
//! hash sets and swaps them every generation; backward-shift deletion and
//! per-generation clears mean the slot arrays are reused instead of
//! decaying under churn.
//!
//!     cargo run --example life --features stats -- 1000 glider.life

use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::io::stdin;
use std::io::stdout;
use std::mem;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rh_hash::HashSet;
use rh_hash::fnv::Fnv1BuildHasher;

#[derive(Parser, Debug)]
struct Args {
    /// Number of generations to advance.
    generations: u64,

    /// Start file of "x y" lines; stdin when omitted.
    start_file: Option<PathBuf>,

    /// Print the live set's probe-distance histogram after the run.
    #[arg(long = "histogram")]
    histogram: bool,
}

type Cell = (i64, i64);
type CellSet = HashSet<Cell, Fnv1BuildHasher>;

const NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn live_neighbors(cells: &CellSet, (x, y): Cell) -> u32 {
    NEIGHBORS
        .iter()
        .filter(|(dx, dy)| cells.contains(&(x + dx, y + dy)))
        .count() as u32
}

// Only cells in the 3x3 neighborhood of a live cell can be alive next
// generation, so visiting those is enough to apply the rule everywhere.
fn one_generation(current: &mut CellSet, next: &mut CellSet) -> rh_hash::Result<()> {
    next.clear();
    for &(x, y) in current.iter() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cell = (x + dx, y + dy);
                let n = live_neighbors(current, cell);
                if n == 3 || (n == 2 && current.contains(&cell)) {
                    next.insert(cell)?;
                }
            }
        }
    }
    mem::swap(current, next);
    Ok(())
}

fn read_cells(input: &str) -> Result<CellSet, String> {
    let mut cells = CellSet::with_hasher(Fnv1BuildHasher);
    for (lineno, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let cell = match (fields.next(), fields.next(), fields.next()) {
            (Some(x), Some(y), None) => {
                let x: i64 = x
                    .parse()
                    .map_err(|e| format!("line {}: bad x coordinate: {e}", lineno + 1))?;
                let y: i64 = y
                    .parse()
                    .map_err(|e| format!("line {}: bad y coordinate: {e}", lineno + 1))?;
                (x, y)
            }
            _ => return Err(format!("line {}: expected \"x y\"", lineno + 1)),
        };
        cells.insert(cell).map_err(|e| e.to_string())?;
    }
    Ok(cells)
}

fn run(args: &Args) -> Result<(), String> {
    let mut input = String::new();
    match &args.start_file {
        Some(path) => {
            File::open(path)
                .and_then(|mut f| f.read_to_string(&mut input))
                .map_err(|e| format!("{}: {e}", path.display()))?;
        }
        None => {
            stdin()
                .read_to_string(&mut input)
                .map_err(|e| format!("stdin: {e}"))?;
        }
    }

    let mut current = read_cells(&input)?;
    let mut next = CellSet::with_hasher(Fnv1BuildHasher);

    for _ in 0..args.generations {
        one_generation(&mut current, &mut next).map_err(|e| e.to_string())?;
    }

    let mut out = BufWriter::new(stdout().lock());
    let mut cells: Vec<Cell> = current.iter().copied().collect();
    cells.sort_unstable();
    for (x, y) in cells {
        writeln!(out, "{x} {y}").map_err(|e| format!("stdout: {e}"))?;
    }
    out.flush().map_err(|e| format!("stdout: {e}"))?;

    eprintln!("{} cells alive", current.len());
    if args.histogram {
        current.print_probe_histogram();
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("life: {message}");
            ExitCode::FAILURE
        }
    }
}
