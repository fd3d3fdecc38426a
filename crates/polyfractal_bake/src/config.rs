//! Scene configuration for fractal baking.

use anyhow::{Context, Result};
use glam::Vec3;
use polyfractal::{BuildRequest, Color, FractalKind, Scheduling};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Root configuration for a bake run.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Output directory relative to the config file.
	#[serde(default = "default_output_dir")]
	pub output_dir: String,
	/// Subdivision scheduling for every build.
	#[serde(default)]
	pub scheduling: SchedulingConfig,
	/// Fractals to bake, one OBJ each.
	#[serde(rename = "fractal")]
	pub fractals: Vec<FractalConfig>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingConfig {
	Sequential,
	#[default]
	Parallel,
}

impl From<SchedulingConfig> for Scheduling {
	fn from(value: SchedulingConfig) -> Self {
		match value {
			SchedulingConfig::Sequential => Scheduling::Sequential,
			SchedulingConfig::Parallel => Scheduling::Parallel,
		}
	}
}

/// One fractal instance in the scene.
#[derive(Debug, Deserialize)]
pub struct FractalConfig {
	/// Output file stem; defaults to the kind's name.
	pub name: Option<String>,
	/// Kind name, e.g. "tetrahedron" or "inverse-pyramid".
	pub kind: String,
	#[serde(default)]
	pub origin: [f32; 3],
	#[serde(default = "default_edge_length")]
	pub edge_length: f32,
	#[serde(default = "default_max_depth")]
	pub max_depth: u32,
	/// Linear RGB color 0.0-1.0.
	#[serde(default = "default_color")]
	pub color: [f32; 3],
}

fn default_output_dir() -> String {
	"baked".to_string()
}

fn default_edge_length() -> f32 {
	50.0
}

fn default_max_depth() -> u32 {
	2
}

fn default_color() -> [f32; 3] {
	[1.0, 1.0, 1.0]
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate configuration TOML.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config = toml::from_str(content).with_context(|| "Failed to parse config TOML")?;

		if config.fractals.is_empty() {
			anyhow::bail!("Config must have at least one [[fractal]]");
		}
		let mut stems = HashSet::new();
		for fractal in &config.fractals {
			fractal.kind()?;
			let stem = fractal.name()?;
			if !is_plain_stem(&stem) {
				anyhow::bail!("Fractal name {stem:?} must be a plain file name");
			}
			// Case-insensitive file systems would still collide.
			if !stems.insert(stem.to_lowercase()) {
				anyhow::bail!("Two fractals would both be written as {stem:?}; give them distinct names");
			}
		}

		Ok(config)
	}
}

/// Non-empty, no path separators, not `.`/`..`.
fn is_plain_stem(stem: &str) -> bool {
	!stem.is_empty() && stem != "." && stem != ".." && !stem.contains(['/', '\\', ':'])
}

impl FractalConfig {
	pub fn kind(&self) -> Result<FractalKind> {
		self
			.kind
			.parse()
			.with_context(|| format!("Fractal {:?} has an unsupported kind", self.kind))
	}

	/// File stem used for this fractal's output.
	pub fn name(&self) -> Result<String> {
		match &self.name {
			Some(name) => Ok(name.clone()),
			None => Ok(self.kind()?.leaf_shape_name().to_string()),
		}
	}

	pub fn request(&self) -> Result<BuildRequest> {
		Ok(BuildRequest::new(
			self.kind()?,
			Vec3::from_array(self.origin),
			self.edge_length,
			self.max_depth,
		))
	}

	pub fn color(&self) -> Color {
		let [r, g, b] = self.color;
		Color::rgb(r, g, b)
	}
}
