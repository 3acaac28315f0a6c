//! Autodesk FBX reader (binary node records and the ASCII form).
//!
//! Only the object graph is read: every `Objects/Geometry` node whose class
//! is `Mesh` becomes a mesh. Uncompressed vertex and polygon arrays are
//! decoded; zlib-compressed arrays only contribute their element counts.

use super::{ImportError, ImportedMesh, ImportedScene};
use byteorder::{LittleEndian, ReadBytesExt};
use regex::Regex;
use std::io::Cursor;
use std::sync::OnceLock;

const FORMAT: &str = "FBX";

/// "Kaydara FBX Binary  \0" followed by 0x1A 0x00.
const BINARY_MAGIC: &[u8] = b"Kaydara FBX Binary  \x00\x1a\x00";

/// Node records switch from 32-bit to 64-bit offsets at this version.
const WIDE_RECORD_VERSION: u32 = 7500;

const MAX_DEPTH: usize = 64;

pub(super) fn parse(bytes: &[u8]) -> Result<ImportedScene, ImportError> {
    if bytes.starts_with(BINARY_MAGIC) {
        parse_binary(bytes)
    } else {
        parse_ascii(bytes)
    }
}

// =============================================================================
// Binary
// =============================================================================

#[derive(Debug)]
enum Property {
    Scalar,
    Str(String),
    Array {
        count: usize,
        /// Raw little-endian elements, only for uncompressed arrays.
        payload: Option<Vec<u8>>,
        element: u8,
    },
}

#[derive(Debug)]
struct Node {
    name: String,
    properties: Vec<Property>,
    children: Vec<Node>,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn last_string(&self) -> Option<&str> {
        self.properties.iter().rev().find_map(|p| match p {
            Property::Str(s) => Some(s.as_str()),
            _ => None,
        })
    }

    fn first_array(&self) -> Option<(usize, Option<&[u8]>, u8)> {
        self.properties.iter().find_map(|p| match p {
            Property::Array {
                count,
                payload,
                element,
            } => Some((*count, payload.as_deref(), *element)),
            _ => None,
        })
    }
}

struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
    wide: bool,
}

fn parse_binary(bytes: &[u8]) -> Result<ImportedScene, ImportError> {
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(BINARY_MAGIC.len() as u64);
    let version = cursor.read_u32::<LittleEndian>().map_err(truncated)?;

    let mut reader = BinaryReader {
        cursor,
        wide: version >= WIDE_RECORD_VERSION,
    };

    let mut top_level = Vec::new();
    while (reader.cursor.position() as usize) < bytes.len() {
        match reader.read_node(0)? {
            Some(node) => top_level.push(node),
            None => break,
        }
    }

    let mut scene = ImportedScene::default();
    if let Some(objects) = top_level.iter().find(|n| n.name == "Objects") {
        for geometry in objects.children.iter().filter(|n| n.name == "Geometry") {
            if geometry.last_string() == Some("Mesh") {
                scene.meshes.push(mesh_from_geometry(geometry)?);
            }
        }
    }
    Ok(scene)
}

impl<'a> BinaryReader<'a> {
    fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    fn read_offset(&mut self) -> Result<u64, ImportError> {
        if self.wide {
            self.cursor.read_u64::<LittleEndian>().map_err(truncated)
        } else {
            self.cursor
                .read_u32::<LittleEndian>()
                .map(u64::from)
                .map_err(truncated)
        }
    }

    /// Reads one node record, or `None` for the null record that ends a list.
    fn read_node(&mut self, depth: usize) -> Result<Option<Node>, ImportError> {
        if depth > MAX_DEPTH {
            return Err(ImportError::malformed(FORMAT, "node nesting too deep"));
        }

        let end_offset = self.read_offset()? as usize;
        let property_count = self.read_offset()? as usize;
        let property_bytes = self.read_offset()? as usize;
        let name_len = self.cursor.read_u8().map_err(truncated)? as usize;

        if end_offset == 0 && property_count == 0 && property_bytes == 0 && name_len == 0 {
            return Ok(None);
        }
        if end_offset > self.len() || end_offset <= self.cursor.position() as usize {
            return Err(ImportError::malformed(
                FORMAT,
                format!("node end offset {} out of range", end_offset),
            ));
        }

        let name = String::from_utf8_lossy(self.take(name_len)?).into_owned();

        let properties_start = self.cursor.position() as usize;
        let properties_end = properties_start
            .checked_add(property_bytes)
            .filter(|&end| end <= end_offset)
            .ok_or_else(|| {
                ImportError::malformed(
                    FORMAT,
                    format!("property list of '{}' overruns the node", name),
                )
            })?;

        let mut properties = Vec::with_capacity(property_count.min(64));
        for _ in 0..property_count {
            properties.push(self.read_property()?);
        }
        if self.cursor.position() as usize != properties_end {
            return Err(ImportError::malformed(
                FORMAT,
                format!("property list of '{}' has inconsistent length", name),
            ));
        }

        let mut children = Vec::new();
        while (self.cursor.position() as usize) < end_offset {
            match self.read_node(depth + 1)? {
                Some(child) => children.push(child),
                None => break,
            }
        }
        if self.cursor.position() as usize > end_offset {
            return Err(ImportError::malformed(
                FORMAT,
                format!("children of '{}' overrun the node", name),
            ));
        }
        self.cursor.set_position(end_offset as u64);

        Ok(Some(Node {
            name,
            properties,
            children,
        }))
    }

    fn read_property(&mut self) -> Result<Property, ImportError> {
        let code = self.cursor.read_u8().map_err(truncated)?;
        let scalar_len = match code {
            b'C' => Some(1),
            b'Y' => Some(2),
            b'I' | b'F' => Some(4),
            b'D' | b'L' => Some(8),
            _ => None,
        };
        if let Some(len) = scalar_len {
            self.take(len)?;
            return Ok(Property::Scalar);
        }

        match code {
            b'S' | b'R' => {
                let len = self.cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
                let data = self.take(len)?;
                if code == b'S' {
                    Ok(Property::Str(String::from_utf8_lossy(data).into_owned()))
                } else {
                    Ok(Property::Scalar)
                }
            }
            b'f' | b'd' | b'l' | b'i' | b'b' => {
                let count = self.cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
                let encoding = self.cursor.read_u32::<LittleEndian>().map_err(truncated)?;
                let stored = self.cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
                let data = self.take(stored)?;

                let payload = match encoding {
                    0 => {
                        if count.checked_mul(element_size(code)) != Some(stored) {
                            return Err(ImportError::malformed(
                                FORMAT,
                                "uncompressed array length does not match element count",
                            ));
                        }
                        Some(data.to_vec())
                    }
                    1 => None,
                    other => {
                        return Err(ImportError::malformed(
                            FORMAT,
                            format!("unknown array encoding {}", other),
                        ))
                    }
                };
                Ok(Property::Array {
                    count,
                    payload,
                    element: code,
                })
            }
            other => Err(ImportError::malformed(
                FORMAT,
                format!("unknown property type 0x{:02x}", other),
            )),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ImportError> {
        let start = self.cursor.position() as usize;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.len())
            .ok_or_else(|| ImportError::malformed(FORMAT, "unexpected end of file"))?;
        self.cursor.set_position(end as u64);
        let data: &'a [u8] = *self.cursor.get_ref();
        Ok(&data[start..end])
    }
}

fn element_size(code: u8) -> usize {
    match code {
        b'b' => 1,
        b'f' | b'i' => 4,
        _ => 8,
    }
}

fn truncated(_: std::io::Error) -> ImportError {
    ImportError::malformed(FORMAT, "unexpected end of file")
}

fn mesh_from_geometry(geometry: &Node) -> Result<ImportedMesh, ImportError> {
    let name = geometry
        .properties
        .iter()
        .find_map(|p| match p {
            Property::Str(s) => Some(display_name(s)),
            _ => None,
        })
        .unwrap_or_default();

    let mut mesh = ImportedMesh {
        name,
        ..ImportedMesh::default()
    };

    if let Some((count, payload, element)) = geometry.child("Vertices").and_then(Node::first_array) {
        mesh.vertex_count = count / 3;
        if let (Some(data), b'd') = (payload, element) {
            mesh.positions = data
                .chunks_exact(24)
                .map(|c| {
                    let mut v = Cursor::new(c);
                    let mut coord = || v.read_f64::<LittleEndian>().unwrap_or(0.0) as f32;
                    [coord(), coord(), coord()]
                })
                .collect();
        }
    }

    if let Some((_, Some(data), b'i')) = geometry.child("PolygonVertexIndex").and_then(Node::first_array) {
        let mut face = Vec::new();
        for chunk in data.chunks_exact(4) {
            let raw = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            // A negative index closes the polygon and encodes !index.
            let (index, closes) = if raw < 0 { (!raw, true) } else { (raw, false) };
            if index as usize >= mesh.vertex_count.max(mesh.positions.len()) {
                return Err(ImportError::malformed(
                    FORMAT,
                    format!("polygon index {} out of range", index),
                ));
            }
            face.push(index as u32);
            if closes {
                mesh.faces.push(std::mem::take(&mut face));
            }
        }
    }

    Ok(mesh)
}

/// FBX object names are stored as "name\0\x01Class".
fn display_name(raw: &str) -> String {
    raw.split("\u{0}\u{1}").next().unwrap_or(raw).to_string()
}

// =============================================================================
// ASCII
// =============================================================================

static MESH_HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
static VERTEX_COUNT_REGEX: OnceLock<Regex> = OnceLock::new();

fn mesh_header_regex() -> &'static Regex {
    MESH_HEADER_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?m)^\s*(?:Geometry:\s*-?\d+\s*,\s*"Geometry::([^"]*)"|Model:\s*"Model::([^"]*)")\s*,\s*"Mesh""#,
        )
        .expect("invalid regex pattern")
    })
}

fn vertex_count_regex() -> &'static Regex {
    VERTEX_COUNT_REGEX
        .get_or_init(|| Regex::new(r"(?m)^\s*Vertices:\s*\*(\d+)").expect("invalid regex pattern"))
}

fn parse_ascii(bytes: &[u8]) -> Result<ImportedScene, ImportError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ImportError::malformed(FORMAT, "neither binary FBX nor UTF-8 text"))?;
    if !text.contains("FBXHeaderExtension") {
        return Err(ImportError::malformed(FORMAT, "missing FBX header"));
    }

    let headers: Vec<_> = mesh_header_regex().captures_iter(text).collect();
    let mut scene = ImportedScene::default();
    for (i, caps) in headers.iter().enumerate() {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        let vertex_count = vertex_count_regex()
            .captures(&text[start..end])
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .map(|n| n / 3)
            .unwrap_or(0);

        scene.meshes.push(ImportedMesh {
            name,
            vertex_count,
            ..ImportedMesh::default()
        });
    }
    Ok(scene)
}
