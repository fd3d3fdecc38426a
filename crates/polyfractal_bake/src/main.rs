//! Polyhedral fractal baker.
//!
//! Builds every fractal listed in a scene TOML and writes each combined mesh
//! as a Wavefront OBJ with a one-material MTL.
//!
//! ```toml
//! output_dir = "baked"
//! scheduling = "parallel"
//!
//! [[fractal]]
//! name = "sierpinski"
//! kind = "tetrahedron"
//! edge_length = 50.0
//! max_depth = 5
//! color = [0.9, 0.4, 0.1]
//! ```

mod config;
mod obj;

use anyhow::{Context, Result};
use clap::Parser;
use polyfractal::{BuildConfig, FractalRegistry, Scheduling};
use std::path::{Path, PathBuf};

use config::Config;

/// Polyhedral fractal baker.
#[derive(Parser, Debug)]
#[command(name = "bake_fractals")]
#[command(about = "Bakes polyhedral fractal scenes into OBJ meshes")]
struct Args {
	/// Path to scene TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Output directory (default: config's output_dir next to the config file).
	#[arg(short, long)]
	output_dir: Option<PathBuf>,

	/// Run subdivision on the calling thread only.
	#[arg(long)]
	sequential: bool,

	/// Build and report statistics without writing meshes.
	#[arg(long)]
	dry_run: bool,

	/// Increase log verbosity (-v debug, -vv trace).
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn main() -> Result<()> {
	let args = Args::parse();
	init_logging(args.verbose);

	log::info!("Loading config from: {}", args.config.display());
	let config = Config::load(&args.config)?;

	let output_dir = args.output_dir.clone().unwrap_or_else(|| {
		args.config
			.parent()
			.unwrap_or(Path::new("."))
			.join(&config.output_dir)
	});
	if !args.dry_run {
		std::fs::create_dir_all(&output_dir)
			.with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;
	}

	let scheduling = if args.sequential {
		Scheduling::Sequential
	} else {
		config.scheduling.into()
	};
	let mut registry = FractalRegistry::new().with_config(BuildConfig::default().with_scheduling(scheduling));

	println!("Baking {} fractals ({scheduling:?})", config.fractals.len());

	// Every build is validated and started before any result is awaited.
	let mut pending = Vec::with_capacity(config.fractals.len());
	for fractal in &config.fractals {
		let name = fractal.name()?;
		let handle = registry
			.submit(fractal.request()?)
			.with_context(|| format!("Rejected {name}"))?;
		pending.push((name, fractal.color(), handle));
	}

	for (name, color, handle) in pending {
		let built = handle.wait().with_context(|| format!("Building {name}"))?;
		let id = registry.register_with(built, name.as_str(), color);
		let instance = registry.get(id)?;

		if !args.dry_run {
			obj::write_instance(&output_dir, &name, instance.mesh(), instance.color())?;
		}
		println!(
			"  ✓ {name} ({}, depth {}, {} leaves, {} triangles, {:.1} ms)",
			instance.kind(),
			instance.max_depth(),
			instance.stats().leaves,
			instance.mesh().triangle_count(),
			instance.stats().build_time_us as f64 / 1000.0
		);
		log::debug!("{name} pivot at {}", instance.pivot());
	}

	if args.dry_run {
		println!("\nDone! Dry run, nothing written.");
		return Ok(());
	}
	println!("\nDone! Output written to: {}", output_dir.display());

	Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` flags pick the level.
fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
