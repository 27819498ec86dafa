//! OBJ file loader for triangle meshes
//!
//! Reads positions, normals, texture coordinates and polygon faces, plus the
//! common `v x y z r g b [a]` vertex color extension. Faces are
//! fan-triangulated; indices may be 1-based or negative (relative to the
//! end of the list). `o` and `g` statements start a new group, and each
//! non-empty group becomes one [`MeshBuffers`]. A group carries normals,
//! texture coordinates or colors when any of its vertices references one;
//! the other vertices get defaults.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use super::SceneImporter;
use crate::foundation::math::Vec3;
use crate::nodes::{MeshBuffers, TriangleMesh};
use crate::scene::{NodeId, SceneError, SceneGraph, SceneResult};

/// OBJ loading errors
#[derive(Error, Debug)]
pub enum ObjError {
    /// Reading the source failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A statement could not be parsed
    #[error("Parse error on line {line}: {reason}")]
    ParseError {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },
    /// The file parsed but holds nothing usable
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// One `o`/`g` section of an OBJ file
#[derive(Debug, Clone, PartialEq)]
pub struct ObjGroup {
    /// Group name, `None` for faces before the first `o`/`g`
    pub name: Option<String>,
    /// Triangulated geometry
    pub buffers: MeshBuffers,
}

/// Vertex of a face: position, texcoord and normal indices (0-based)
type Corner = (usize, Option<usize>, Option<usize>);

#[derive(Default)]
struct GroupBuilder {
    name: Option<String>,
    buffers: MeshBuffers,
    /// Per-vertex attributes as referenced, settled in `finish`
    normals: Vec<Option<Vec3>>,
    texcoords: Vec<Option<[f32; 2]>>,
    colors: Vec<Option<[f32; 4]>>,
    corners: HashMap<Corner, u32>,
}

impl GroupBuilder {
    fn named(name: Option<String>) -> Self {
        Self { name, ..Self::default() }
    }

    fn vertex(&mut self, corner: Corner, data: &ObjData, line: usize) -> Result<u32, ObjError> {
        if let Some(&index) = self.corners.get(&corner) {
            return Ok(index);
        }
        let (pos, tex, normal) = corner;
        let index = u32::try_from(self.buffers.vertices.len()).map_err(|_| ObjError::ParseError {
            line,
            reason: "too many vertices in one group".to_string(),
        })?;
        self.buffers.vertices.push(data.positions[pos]);
        self.colors.push(data.colors[pos]);
        self.normals.push(normal.map(|i| data.normals[i]));
        self.texcoords.push(tex.map(|i| data.tex_coords[i]));
        self.corners.insert(corner, index);
        Ok(index)
    }

    /// Keep an attribute array only if some vertex references it
    fn settle<T: Copy>(values: Vec<Option<T>>, default: T) -> Vec<T> {
        if values.iter().all(Option::is_none) {
            return Vec::new();
        }
        values.into_iter().map(|v| v.unwrap_or(default)).collect()
    }

    fn finish(mut self, groups: &mut Vec<ObjGroup>) {
        if self.buffers.indices.is_empty() {
            return;
        }
        self.buffers.normals = Self::settle(self.normals, Vec3::new(0.0, 1.0, 0.0));
        self.buffers.texcoords = Self::settle(self.texcoords, [0.0, 0.0]);
        self.buffers.colors = Self::settle(self.colors, [1.0, 1.0, 1.0, 1.0]);
        groups.push(ObjGroup { name: self.name, buffers: self.buffers });
    }
}

#[derive(Default)]
struct ObjData {
    positions: Vec<Vec3>,
    /// RGB(A) following the position on a `v` line
    colors: Vec<Option<[f32; 4]>>,
    normals: Vec<Vec3>,
    tex_coords: Vec<[f32; 2]>,
}

impl ObjData {
    fn push_vertex(&mut self, parts: &[&str], line: usize) -> Result<(), ObjError> {
        self.positions.push(Vec3::from(parse_floats::<3>(parts, line, "vertex")?));
        let color = match parts.len() {
            3 | 4 => None,
            6 | 7 => {
                let [r, g, b] = parse_floats::<3>(&parts[3..], line, "vertex color")?;
                let a = match parts.get(6) {
                    Some(_) => parse_floats::<1>(&parts[6..], line, "vertex alpha")?[0],
                    None => 1.0,
                };
                Some([r, g, b, a])
            }
            n => {
                return Err(ObjError::ParseError { line, reason: format!("vertex has {n} components") });
            }
        };
        self.colors.push(color);
        Ok(())
    }
}

fn parse_floats<const N: usize>(parts: &[&str], line: usize, what: &str) -> Result<[f32; N], ObjError> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let text = parts.get(i).ok_or_else(|| ObjError::ParseError {
            line,
            reason: format!("{what} needs {N} components"),
        })?;
        *slot = text.parse().map_err(|_| ObjError::ParseError {
            line,
            reason: format!("invalid {what} component '{text}'"),
        })?;
    }
    Ok(out)
}

/// Resolve a 1-based or negative OBJ index against a list of `len` entries
fn resolve_index(text: &str, len: usize, line: usize) -> Result<usize, ObjError> {
    let raw: i64 = text.parse().map_err(|_| ObjError::ParseError {
        line,
        reason: format!("invalid index '{text}'"),
    })?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => usize::try_from(r - 1).ok(),
        r => usize::try_from(len as i64 + r).ok(),
    };
    resolved.filter(|i| *i < len).ok_or_else(|| ObjError::ParseError {
        line,
        reason: format!("index {raw} out of range for {len} entries"),
    })
}

/// OBJ parser
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file and return its groups
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Vec<ObjGroup>, ObjError> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    /// Parse OBJ text
    pub fn parse_str(text: &str) -> Result<Vec<ObjGroup>, ObjError> {
        Self::parse(text.as_bytes())
    }

    /// Parse OBJ data from any buffered reader
    pub fn parse<R: BufRead>(reader: R) -> Result<Vec<ObjGroup>, ObjError> {
        let mut data = ObjData::default();
        let mut groups = Vec::new();
        let mut current = GroupBuilder::default();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = number + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "v" => data.push_vertex(&parts[1..], line_no)?,
                "vn" => data.normals.push(Vec3::from(parse_floats::<3>(&parts[1..], line_no, "normal")?)),
                "vt" => data.tex_coords.push(parse_floats::<2>(&parts[1..], line_no, "texcoord")?),
                "o" | "g" => {
                    let name = parts.get(1..).map(|rest| rest.join(" ")).filter(|n| !n.is_empty());
                    std::mem::replace(&mut current, GroupBuilder::named(name)).finish(&mut groups);
                }
                "f" => {
                    if parts.len() < 4 {
                        return Err(ObjError::ParseError {
                            line: line_no,
                            reason: "face needs at least 3 vertices".to_string(),
                        });
                    }
                    let mut face = Vec::with_capacity(parts.len() - 1);
                    for vertex_data in &parts[1..] {
                        let mut fields = vertex_data.split('/');
                        let pos = resolve_index(fields.next().unwrap_or(""), data.positions.len(), line_no)?;
                        let tex = match fields.next() {
                            Some(t) if !t.is_empty() => Some(resolve_index(t, data.tex_coords.len(), line_no)?),
                            _ => None,
                        };
                        let normal = match fields.next() {
                            Some(n) if !n.is_empty() => Some(resolve_index(n, data.normals.len(), line_no)?),
                            _ => None,
                        };
                        face.push(current.vertex((pos, tex, normal), &data, line_no)?);
                    }

                    // Fan triangulation
                    for i in 1..face.len() - 1 {
                        current.buffers.indices.push([face[0], face[i], face[i + 1]]);
                    }
                }
                _ => {
                    // Materials, smoothing groups and curves are ignored
                }
            }
        }
        current.finish(&mut groups);

        if groups.is_empty() {
            return Err(ObjError::InvalidFormat("No faces found in OBJ data".to_string()));
        }
        Ok(groups)
    }
}

/// Importer turning each OBJ group into a `TriangleMesh` child
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl ObjImporter {
    /// Add one mesh per group under `world`, returning the child names
    pub fn add_groups(graph: &mut SceneGraph, world: NodeId, groups: Vec<ObjGroup>) -> SceneResult<Vec<String>> {
        let mut added = Vec::with_capacity(groups.len());
        for (n, group) in groups.into_iter().enumerate() {
            let name = match group.name {
                Some(name) if graph.node(world)?.child(&name).is_none() => name,
                _ => format!("mesh_{n}"),
            };
            let mesh = graph.create_child(world, &name, "TriangleMesh")?;
            TriangleMesh::set_buffers(graph, mesh, group.buffers)?;
            added.push(name);
        }
        Ok(added)
    }
}

impl SceneImporter for ObjImporter {
    fn import_into(&self, graph: &mut SceneGraph, world: NodeId, locator: &str) -> SceneResult<()> {
        let groups = ObjLoader::load_obj(locator).map_err(|e| SceneError::Import {
            locator: locator.to_string(),
            reason: e.to_string(),
        })?;
        let added = Self::add_groups(graph, world, groups)?;
        log::info!("Imported {} mesh(es) from {locator}", added.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_AND_TRIANGLE: &str = "\
# two groups
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
o quad
f 1//1 2//1 3//1 4//1
g
f -4 -3 -2
";

    #[test]
    fn test_groups_and_fan_triangulation() {
        let groups = ObjLoader::parse_str(QUAD_AND_TRIANGLE).unwrap();
        assert_eq!(groups.len(), 2);

        let quad = &groups[0];
        assert_eq!(quad.name.as_deref(), Some("quad"));
        assert_eq!(quad.buffers.indices, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(quad.buffers.vertices.len(), 4);
        assert_eq!(quad.buffers.normals.len(), 4);

        let tri = &groups[1];
        assert_eq!(tri.name, None);
        assert_eq!(tri.buffers.vertices[2], Vec3::new(1.0, 1.0, 0.0));
        assert!(tri.buffers.validate().is_ok());
    }

    #[test]
    fn test_shared_corners_are_deduplicated() {
        let groups = ObjLoader::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n").unwrap();
        assert_eq!(groups[0].buffers.vertices.len(), 4);
        assert_eq!(groups[0].buffers.indices.len(), 2);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert!(matches!(
            ObjLoader::parse_str("v 0 0 0\nf 1 2 3\n"),
            Err(ObjError::ParseError { line: 2, .. })
        ));
        assert!(matches!(ObjLoader::parse_str("v 0 x 0\n"), Err(ObjError::ParseError { line: 1, .. })));
        assert!(matches!(ObjLoader::parse_str("v 0 0 0\n"), Err(ObjError::InvalidFormat(_))));
    }

    #[test]
    fn test_add_groups_names_children() {
        let mut graph = SceneGraph::new();
        let world = graph.create("World", "world").unwrap();
        graph.create_child(world, "quad", "Group").unwrap();

        let groups = ObjLoader::parse_str(QUAD_AND_TRIANGLE).unwrap();
        let added = ObjImporter::add_groups(&mut graph, world, groups).unwrap();

        assert_eq!(added, ["mesh_0", "mesh_1"]);
        let mesh = graph.get_child(world, "mesh_1").unwrap();
        assert_eq!(graph.behavior::<TriangleMesh>(mesh).unwrap().buffers().indices.len(), 1);
    }

    #[test]
    fn test_normals_declared_after_earlier_faces() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nvn 0 0 1\nv 1 1 0\nf 1 2 4//1\n";
        let groups = ObjLoader::parse_str(text).unwrap();
        let buffers = &groups[0].buffers;

        assert_eq!(buffers.vertices.len(), 4);
        assert_eq!(buffers.normals.len(), 4);
        assert_eq!(buffers.normals[0], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(buffers.normals[3], Vec3::new(0.0, 0.0, 1.0));
        assert!(buffers.validate().is_ok());
    }

    #[test]
    fn test_attributes_are_decided_per_group() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.5\no plain\nf 1 2 3\no textured\nf 1/1 2/1 3/1\n";
        let groups = ObjLoader::parse_str(text).unwrap();

        assert!(groups[0].buffers.texcoords.is_empty());
        assert_eq!(groups[1].buffers.texcoords, vec![[0.5, 0.5]; 3]);
    }

    #[test]
    fn test_vertex_colors() {
        let text = "v 0 0 0 1 0 0\nv 1 0 0 0 1 0 0.5\nv 0 1 0\nf 1 2 3\n";
        let groups = ObjLoader::parse_str(text).unwrap();
        let colors = &groups[0].buffers.colors;

        assert_eq!(colors, &vec![[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 0.5], [1.0, 1.0, 1.0, 1.0]]);
        assert!(matches!(ObjLoader::parse_str("v 0 0 0 1 0\n"), Err(ObjError::ParseError { line: 1, .. })));
    }
}
