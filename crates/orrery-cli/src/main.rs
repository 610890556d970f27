use anyhow::Result;
use clap::{Parser, Subcommand};
use hifitime::{Duration, Epoch};
use orrery_core::constants::AU;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "orrery")]
#[command(about = "Hierarchical orbital-mechanics engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print body positions for a world description at an epoch
    Positions {
        /// World description JSON
        #[arg(short, long)]
        world: PathBuf,

        /// Epoch (ISO format, or relative like "+100y")
        #[arg(short, long, default_value = "2000-01-01T12:00:00 UTC")]
        epoch: String,
    },

    /// Step the world and print sampled positions
    Run {
        /// World description JSON
        #[arg(short, long)]
        world: PathBuf,

        #[arg(short, long, default_value = "2000-01-01T12:00:00 UTC")]
        epoch: String,

        /// Tick length, seconds
        #[arg(long, default_value = "60")]
        dt: f64,

        /// Number of ticks to run
        #[arg(long, default_value = "10000")]
        steps: usize,

        /// Print every N-th tick
        #[arg(long, default_value = "1000")]
        sample: usize,

        /// Body to sample; all bodies when omitted
        #[arg(long)]
        body: Option<String>,
    },

    /// Resolve a slash-delimited body path
    Lookup {
        /// World description JSON
        #[arg(short, long)]
        world: PathBuf,

        /// Path like "Sol/Earth/Luna"
        path: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Positions { world, epoch } => {
            let mut world = orrery_sim::load_world_file(&world)?;
            let epoch = parse_epoch(&epoch)?;
            world.clock_mut().set_epoch(epoch);
            world.init();

            println!("Positions at {}:", epoch);
            print_positions(&world);
        }

        Commands::Run {
            world,
            epoch,
            dt,
            steps,
            sample,
            body,
        } => {
            let mut world = orrery_sim::load_world_file(&world)?;
            world.clock_mut().set_epoch(parse_epoch(&epoch)?);
            world.init();

            for step in 1..=steps {
                world.step(dt);

                if step % sample.max(1) == 0 {
                    match &body {
                        Some(path) => match world.body_position(path) {
                            Some(p) => println!(
                                "{}  {:<20} {:>15.6} {:>15.6} {:>15.6} AU",
                                world.clock().epoch(),
                                path,
                                p.x / AU,
                                p.y / AU,
                                p.z / AU
                            ),
                            None => anyhow::bail!("no body at path '{}'", path),
                        },
                        None => {
                            println!("-- {}", world.clock().epoch());
                            print_positions(&world);
                        }
                    }
                }
            }
        }

        Commands::Lookup { world, path } => {
            let world = orrery_sim::load_world_file(&world)?;
            match world.lookup(&path) {
                Some(_) => {
                    let p = world.body_position(&path).unwrap_or_default();
                    let v = world.body_velocity(&path).unwrap_or_default();
                    println!("{}", path);
                    println!("  position: ({:.6e}, {:.6e}, {:.6e}) m", p.x, p.y, p.z);
                    println!("  distance: {:.6} AU", p.norm() / AU);
                    println!("  speed:    {:.3} m/s", v.norm());
                }
                None => {
                    println!("not found: {}", path);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn print_positions(world: &orrery_sim::World) {
    println!(
        "{:<24} {:>15} {:>15} {:>15} {:>12}",
        "Body", "X (AU)", "Y (AU)", "Z (AU)", "Dist (AU)"
    );
    for path in world.body_paths() {
        if let Some(p) = world.body_position(&path) {
            println!(
                "{:<24} {:>15.6} {:>15.6} {:>15.6} {:>12.4}",
                path,
                p.x / AU,
                p.y / AU,
                p.z / AU,
                p.norm() / AU
            );
        }
    }
}

/// Parse an absolute epoch, or "+100y" / "-30d" relative to J2000.
fn parse_epoch(s: &str) -> Result<Epoch> {
    let j2000 = Epoch::from_gregorian_utc(2000, 1, 1, 12, 0, 0, 0);
    if let Some(years) = s.strip_suffix('y') {
        if let Ok(years) = years.parse::<f64>() {
            return Ok(j2000 + Duration::from_days(years * 365.25));
        }
    }
    if let Some(days) = s.strip_suffix('d') {
        if let Ok(days) = days.parse::<f64>() {
            return Ok(j2000 + Duration::from_days(days));
        }
    }
    Ok(Epoch::from_str(s)?)
}
