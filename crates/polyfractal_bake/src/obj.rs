//! Wavefront OBJ/MTL export for combined fractal meshes.
//!
//! Layout of one baked instance:
//! - `<name>.obj`: positions, normals, 1-based `f v//vn` faces
//! - `<name>.mtl`: single material carrying the instance color as `Kd`

use anyhow::{Context, Result};
use polyfractal::{Color, CombinedMesh};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `mesh` as `<dir>/<name>.obj` plus its material file.
pub fn write_instance(dir: &Path, name: &str, mesh: &CombinedMesh, color: Color) -> Result<()> {
	let mtl_path = dir.join(format!("{name}.mtl"));
	let file = File::create(&mtl_path).with_context(|| format!("Failed to create {}", mtl_path.display()))?;
	write_mtl(&mut BufWriter::new(file), name, color).with_context(|| format!("Writing {}", mtl_path.display()))?;

	let obj_path = dir.join(format!("{name}.obj"));
	let file = File::create(&obj_path).with_context(|| format!("Failed to create {}", obj_path.display()))?;
	let mut out = BufWriter::new(file);
	write_obj(&mut out, name, mesh).with_context(|| format!("Writing {}", obj_path.display()))?;
	out.flush()?;
	Ok(())
}

pub fn write_obj(out: &mut impl Write, name: &str, mesh: &CombinedMesh) -> std::io::Result<()> {
	writeln!(out, "# {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count())?;
	writeln!(out, "mtllib {name}.mtl")?;
	writeln!(out, "o {name}")?;
	for p in &mesh.positions {
		writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
	}
	for n in &mesh.normals {
		writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
	}
	writeln!(out, "usemtl {name}")?;
	for tri in mesh.indices.chunks_exact(3) {
		let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
		writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
	}
	Ok(())
}

pub fn write_mtl(out: &mut impl Write, name: &str, color: Color) -> std::io::Result<()> {
	writeln!(out, "newmtl {name}")?;
	writeln!(out, "Kd {} {} {}", color.r, color.g, color.b)?;
	writeln!(out, "d {}", color.a)?;
	out.flush()
}
