/// ASCII PLY export of a point store snapshot
use crate::error::ExportError;
use crate::store::{PointStore, Vertex};
use constants::export::{PLY_END_HEADER, PLY_FORMAT, PLY_MAGIC, PLY_VERTEX_PROPERTIES};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Encodes `vertices` as an ASCII PLY document, one line per vertex in the given order.
/// The document has no trailing newline.
pub fn encode_ply(vertices: &[Vertex]) -> Result<String, ExportError> {
    let lines: Vec<String> = vertices.par_iter().map(format_vertex).collect();

    let mut ply = String::with_capacity(256 + lines.iter().map(|l| l.len() + 1).sum::<usize>());
    ply.push_str(PLY_MAGIC);
    ply.push('\n');
    ply.push_str(PLY_FORMAT);
    ply.push('\n');
    ply.push_str(&format!("element vertex {}", vertices.len()));
    for property in PLY_VERTEX_PROPERTIES {
        ply.push('\n');
        ply.push_str(property);
    }
    ply.push('\n');
    ply.push_str(PLY_END_HEADER);

    for line in &lines {
        ply.push('\n');
        ply.push_str(line);
    }

    ensure_ascii(ply)
}

/// Snapshots `store`, encodes it and writes the document to `path`.
/// Nothing is written when encoding fails.
pub fn export_to_file(store: &PointStore, path: &Path) -> Result<PathBuf, ExportError> {
    let snapshot = store.snapshot();
    let ply = encode_ply(&snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, ply)?;

    info!(points = snapshot.len(), path = %path.display(), "exported point cloud");
    Ok(path.to_path_buf())
}

/// Colour channel as a byte: clamp to [0, 1], scale, truncate.
pub fn channel_to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).floor() as u8
}

fn format_vertex(vertex: &Vertex) -> String {
    let [x, y, z] = vertex.position;
    let [r, g, b, a] = vertex.color.map(channel_to_byte);
    format!("{x:?} {y:?} {z:?} {r} {g} {b} {a}")
}

fn ensure_ascii(text: String) -> Result<String, ExportError> {
    if text.is_ascii() {
        Ok(text)
    } else {
        Err(ExportError::Encoding)
    }
}
