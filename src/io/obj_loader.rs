use crate::core::geometry::{MeshData, VertexLayout};
use log::{error, info};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Which raw attribute list a face index points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position,
    Texcoord,
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::Texcoord => "texcoord",
            Attribute::Normal => "normal",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("Unable to read mesh file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}: malformed `{tag}` record: {reason}")]
    MalformedRecord {
        line: usize,
        tag: &'static str,
        reason: String,
    },
    #[error("Line {line}: face has {found} corners, only triangles are supported")]
    NonTriangularFace { line: usize, found: usize },
    #[error("Line {line}: malformed face corner '{corner}', expected `{expected}`")]
    MalformedCorner {
        line: usize,
        corner: String,
        expected: &'static str,
    },
    #[error("Line {line}: {attribute} index {index} out of range 1..={available}")]
    IndexOutOfRange {
        line: usize,
        attribute: Attribute,
        index: i64,
        available: usize,
    },
}

/// Loads a mesh file and face-expands it into the requested `layout`.
pub fn load_obj(path: impl AsRef<Path>, layout: VertexLayout) -> Result<MeshData, ObjError> {
    let path = path.as_ref();
    let io_err = |source| ObjError::Io {
        path: path.to_path_buf(),
        source,
    };

    info!("Loading mesh file: {}", path.display());
    let file = File::open(path).map_err(io_err)?;

    let mesh = parse_obj(BufReader::new(file), layout).map_err(|e| match e {
        // Read errors surface from the reader without a path attached.
        ObjError::Io { source, .. } => io_err(source),
        other => other,
    });

    if let Err(e) = &mesh {
        error!("Failed to load '{}': {}", path.display(), e);
    }
    mesh
}

/// Parses OBJ-style text from any buffered reader.
///
/// Recognised tags are `v`, `vt`, `vn` and `f`; everything else is skipped. Only
/// the channels enabled in `layout` are collected, and the face corner syntax is
/// dictated by `layout`.
pub fn parse_obj<R: BufRead>(reader: R, layout: VertexLayout) -> Result<MeshData, ObjError> {
    let format = CornerFormat::from(layout);

    let mut raw_positions: Vec<[f32; 3]> = Vec::new();
    let mut raw_texcoords: Vec<[f32; 2]> = Vec::new();
    let mut raw_normals: Vec<[f32; 3]> = Vec::new();

    let mut positions = Vec::new();
    let mut texcoords = Vec::new();
    let mut normals = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| ObjError::Io {
            path: PathBuf::new(),
            source,
        })?;

        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };

        match tag {
            "v" => raw_positions.push(parse_floats::<3>(tokens, line_no, "v")?),
            "vt" if layout.texcoords => {
                let [u, v, _] = parse_texcoord(tokens, line_no)?;
                raw_texcoords.push([u, v]);
            }
            "vn" if layout.normals => raw_normals.push(parse_floats::<3>(tokens, line_no, "vn")?),
            "f" => {
                let corners: Vec<&str> = tokens.collect();
                if corners.len() != 3 {
                    return Err(ObjError::NonTriangularFace {
                        line: line_no,
                        found: corners.len(),
                    });
                }

                for corner in corners {
                    let refs = format.parse(corner, line_no)?;

                    let p = resolve(&raw_positions, refs.position, Attribute::Position, line_no)?;
                    positions.push(p);

                    if let Some(t) = refs.texcoord {
                        texcoords.push(resolve(&raw_texcoords, t, Attribute::Texcoord, line_no)?);
                    }
                    if let Some(n) = refs.normal {
                        normals.push(resolve(&raw_normals, n, Attribute::Normal, line_no)?);
                    }
                }
            }
            _ => {}
        }
    }

    info!(
        "Parsed mesh: {} positions, {} texcoords, {} normals -> {} triangles",
        raw_positions.len(),
        raw_texcoords.len(),
        raw_normals.len(),
        positions.len() / 3
    );

    Ok(MeshData {
        layout,
        positions,
        normals,
        texcoords,
    })
}

/// Looks up a 1-based OBJ index. Zero and negative (relative) indices are rejected.
fn resolve<T: Copy>(
    raw: &[T],
    index: i64,
    attribute: Attribute,
    line: usize,
) -> Result<T, ObjError> {
    index
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| raw.get(i).copied())
        .ok_or(ObjError::IndexOutOfRange {
            line,
            attribute,
            index,
            available: raw.len(),
        })
}

fn parse_floats<'a, const N: usize>(
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
    tag: &'static str,
) -> Result<[f32; N], ObjError> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| ObjError::MalformedRecord {
            line,
            tag,
            reason: format!("expected {N} values, found {i}"),
        })?;
        *slot = parse_float(token, line, tag)?;
    }
    if let Some(extra) = tokens.next() {
        return Err(ObjError::MalformedRecord {
            line,
            tag,
            reason: format!("unexpected trailing value '{extra}'"),
        });
    }
    Ok(out)
}

/// `vt u v [w]`
fn parse_texcoord<'a>(
    tokens: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[f32; 3], ObjError> {
    let values: Vec<&str> = tokens.collect();
    match values.as_slice() {
        [u, v] => Ok([parse_float(u, line, "vt")?, parse_float(v, line, "vt")?, 0.0]),
        [u, v, w] => Ok([
            parse_float(u, line, "vt")?,
            parse_float(v, line, "vt")?,
            parse_float(w, line, "vt")?,
        ]),
        other => Err(ObjError::MalformedRecord {
            line,
            tag: "vt",
            reason: format!("expected 2 or 3 values, found {}", other.len()),
        }),
    }
}

fn parse_float(token: &str, line: usize, tag: &'static str) -> Result<f32, ObjError> {
    token.parse().map_err(|_| ObjError::MalformedRecord {
        line,
        tag,
        reason: format!("'{token}' is not a number"),
    })
}

/// Raw 1-based indices referenced by one face corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CornerRefs {
    position: i64,
    texcoord: Option<i64>,
    normal: Option<i64>,
}

/// The face corner syntax expected for a given layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CornerFormat {
    /// `v`
    Position,
    /// `v/n` or `v//n`
    PositionNormal,
    /// `v/t`
    PositionTexcoord,
    /// `v/t/n`
    Full,
}

impl From<VertexLayout> for CornerFormat {
    fn from(layout: VertexLayout) -> Self {
        match (layout.texcoords, layout.normals) {
            (false, false) => CornerFormat::Position,
            (false, true) => CornerFormat::PositionNormal,
            (true, false) => CornerFormat::PositionTexcoord,
            (true, true) => CornerFormat::Full,
        }
    }
}

impl CornerFormat {
    fn syntax(self) -> &'static str {
        match self {
            CornerFormat::Position => "v",
            CornerFormat::PositionNormal => "v/n",
            CornerFormat::PositionTexcoord => "v/t",
            CornerFormat::Full => "v/t/n",
        }
    }

    fn parse(self, corner: &str, line: usize) -> Result<CornerRefs, ObjError> {
        let malformed = || ObjError::MalformedCorner {
            line,
            corner: corner.to_string(),
            expected: self.syntax(),
        };
        let int = |s: &str| s.parse::<i64>().map_err(|_| malformed());

        let fields: Vec<&str> = corner.split('/').collect();
        let refs = match (self, fields.as_slice()) {
            (CornerFormat::Position, [v]) => CornerRefs {
                position: int(*v)?,
                texcoord: None,
                normal: None,
            },
            (CornerFormat::PositionNormal, [v, n]) | (CornerFormat::PositionNormal, [v, "", n]) => {
                CornerRefs {
                    position: int(*v)?,
                    texcoord: None,
                    normal: Some(int(*n)?),
                }
            }
            (CornerFormat::PositionTexcoord, [v, t]) => CornerRefs {
                position: int(*v)?,
                texcoord: Some(int(*t)?),
                normal: None,
            },
            (CornerFormat::Full, [v, t, n]) => CornerRefs {
                position: int(*v)?,
                texcoord: Some(int(*t)?),
                normal: Some(int(*n)?),
            },
            _ => return Err(malformed()),
        };
        Ok(refs)
    }
}
