//! Hexgoban: build irregular hexagonal Go boards and play on them.
//!
//! ## Usage
//!
//! - `hexgoban` - Run the pipeline demo
//! - `hexgoban shell` - Start the interactive command shell
//! - `hexgoban demo` - Run the pipeline demo explicitly

use clap::{Parser, Subcommand};

use hexgoban::constants::DEFAULT_RADIUS;
use hexgoban::grid::corner_vertices;
use hexgoban::session::Session;

/// Hexgoban: procedural hex-mesh Go boards
#[derive(Parser)]
#[command(name = "hexgoban")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell driving mesh edits and game moves
    Shell {
        /// Hex disk radius in lattice rings
        #[arg(short, long, default_value_t = DEFAULT_RADIUS)]
        radius: i32,
    },
    /// Run the full pipeline once and print what happened
    Demo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Shell { radius }) => {
            let mut session = Session::new(radius);
            session.run_shell()
        }
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_demo() -> anyhow::Result<()> {
    println!("Hexgoban: procedural hex-mesh Go boards\n");

    let mut session = Session::new(DEFAULT_RADIUS);
    println!("=== Grid ===");
    println!("{}", session.status());

    println!("\n=== Quadrangulation ===");
    if session.merge_auto() {
        println!("converged: {}", session.status());
    } else {
        println!("failed; mesh restored: {}", session.status());
    }

    println!("\n=== Subdivision + relaxation ===");
    session.subdivide();
    session.relax(200);
    println!("{}", session.status());
    println!("corner vertices: {:?}", corner_vertices(&session.topo));

    println!("\n=== A few stones ===");
    let open: Vec<_> = session
        .topo
        .verts
        .iter()
        .filter(|v| v.visible)
        .map(|v| v.id)
        .collect();
    for vid in open.into_iter().take(5) {
        match session.place_stone(vid) {
            Ok(()) => println!("played {vid}"),
            Err(err) => println!("{vid}: {err}"),
        }
    }
    let score = session.score();
    println!(
        "score: black {} - white {}",
        score.black_total, score.white_total
    );
    Ok(())
}
