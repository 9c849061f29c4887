//! Volume ingestion from a `.npy`-style typed-array container.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult};

/// A dense 3D scalar field with dimensions `(nx, ny, nz)` in C-order: the
/// element at `(x, y, z)` lies at linear offset `z*ny*nx + y*nx + x`.
#[derive(Debug, Clone)]
pub struct Volume {
    /// Extent along x (fastest-varying axis).
    pub nx: u32,
    /// Extent along y.
    pub ny: u32,
    /// Extent along z (slowest-varying axis).
    pub nz: u32,
    /// Flattened samples, `len() == nx * ny * nz`.
    pub data: Vec<f32>,
}

impl Volume {
    /// Looks up the sample at `(x, y, z)`.
    #[must_use]
    pub fn get(&self, x: u32, y: u32, z: u32) -> f32 {
        self.data[self.index(x, y, z)]
    }

    /// Computes the linear C-order offset of `(x, y, z)`.
    #[must_use]
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        (z as usize * self.ny as usize + y as usize) * self.nx as usize + x as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DType {
    F4,
    I2,
    I4,
    U1,
}

impl DType {
    fn elem_size(self) -> usize {
        match self {
            DType::F4 | DType::I4 => 4,
            DType::I2 => 2,
            DType::U1 => 1,
        }
    }

    fn parse(descr_tail: &str) -> Option<Self> {
        match descr_tail {
            "f4" => Some(DType::F4),
            "i2" => Some(DType::I2),
            "i4" => Some(DType::I4),
            "u1" => Some(DType::U1),
            _ => None,
        }
    }
}

struct NpyHeader {
    dtype: DType,
    big_endian: bool,
    shape: Vec<usize>,
    data_offset: usize,
}

/// Loads a volume from the `.npy` file at `path`.
///
/// # Errors
/// Returns [`LoadError`] if the file cannot be opened, the container fails to
/// parse, the dtype or layout is unsupported, or the shape does not resolve
/// to a rank-3 C-order volume.
pub fn load_volume(path: impl AsRef<Path>) -> LoadResult<Volume> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_volume_from_bytes(&bytes, path)
}

fn load_volume_from_bytes(bytes: &[u8], path: &Path) -> LoadResult<Volume> {
    let header = parse_header(bytes, path)?;
    let count: usize = header.shape.iter().product();

    let raw = bytes
        .get(header.data_offset..header.data_offset + count * header.dtype.elem_size())
        .ok_or_else(|| LoadError::Format {
            path: path.to_path_buf(),
            reason: "data section shorter than declared shape".to_string(),
        })?;

    let data = widen_to_f32(raw, header.dtype, header.big_endian);
    log::debug!(
        "loaded volume '{}': dtype={:?} big_endian={} shape={:?}",
        path.display(),
        header.dtype,
        header.big_endian,
        header.shape
    );

    let (nx, ny, nz) = normalize_shape(&header.shape, path)?;
    if data.len() != (nx as usize) * (ny as usize) * (nz as usize) {
        return Err(LoadError::Shape {
            path: path.to_path_buf(),
            reason: format!(
                "element count {} does not match shape product {}",
                data.len(),
                (nx as usize) * (ny as usize) * (nz as usize)
            ),
        });
    }

    Ok(Volume { nx, ny, nz, data })
}

fn normalize_shape(shape: &[usize], path: &Path) -> LoadResult<(u32, u32, u32)> {
    let dims: Vec<usize> = match shape.len() {
        3 => shape.to_vec(),
        4 if shape[0] == 1 => shape[1..].to_vec(),
        _ => {
            return Err(LoadError::Shape {
                path: path.to_path_buf(),
                reason: format!(
                    "expected rank 3, or rank 4 with a leading singleton axis, got {shape:?}"
                ),
            })
        }
    };
    // dims is (nz, ny, nx) in row-major nesting order.
    let nz = dims[0] as u32;
    let ny = dims[1] as u32;
    let nx = dims[2] as u32;
    Ok((nx, ny, nz))
}

fn parse_header(bytes: &[u8], path: &Path) -> LoadResult<NpyHeader> {
    let fail = |reason: &str| LoadError::Format {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if bytes.len() < 8 || &bytes[0..6] != b"\x93NUMPY" {
        return Err(fail("missing NUMPY magic"));
    }
    let major = bytes[6];
    let (header_len, header_start) = if major == 1 {
        let len = bytes
            .get(8..10)
            .ok_or_else(|| fail("truncated v1 header length"))?;
        (u16::from_le_bytes([len[0], len[1]]) as usize, 10)
    } else {
        let len = bytes
            .get(8..12)
            .ok_or_else(|| fail("truncated v2+ header length"))?;
        (
            u32::from_le_bytes([len[0], len[1], len[2], len[3]]) as usize,
            12,
        )
    };

    let header_bytes = bytes
        .get(header_start..header_start + header_len)
        .ok_or_else(|| fail("header length exceeds file size"))?;
    let header_str = std::str::from_utf8(header_bytes).map_err(|_| fail("header is not UTF-8"))?;

    let descr = extract_quoted_value(header_str, "descr").ok_or_else(|| fail("missing descr"))?;
    let fortran_order = extract_bool_value(header_str, "fortran_order");
    let shape = extract_shape(header_str).ok_or_else(|| fail("missing or malformed shape"))?;

    if fortran_order {
        return Err(LoadError::UnsupportedLayout {
            path: path.to_path_buf(),
        });
    }
    if shape.is_empty() {
        return Err(fail("shape is empty"));
    }

    let mut chars = descr.chars();
    let first = chars.clone().next();
    let big_endian = matches!(first, Some('>') | Some('!'));
    if matches!(first, Some('<') | Some('>') | Some('|') | Some('=') | Some('!')) {
        chars.next();
    }
    let tail: String = chars.collect();
    let dtype = DType::parse(&tail).ok_or_else(|| LoadError::UnsupportedDtype {
        path: path.to_path_buf(),
        descr: descr.clone(),
    })?;

    Ok(NpyHeader {
        dtype,
        big_endian,
        shape,
        data_offset: header_start + header_len,
    })
}

/// Finds `'key': 'value'` or `"key": "value"` and returns `value`, tolerant of
/// either quote style. A targeted scanner suffices; this does not attempt a
/// full embedded-language evaluator.
fn extract_quoted_value(header: &str, key: &str) -> Option<String> {
    let key_pos = find_key(header, key)?;
    let colon = header[key_pos..].find(':')? + key_pos;
    let rest = header[colon + 1..].trim_start();
    let quote = rest.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let rest = &rest[quote.len_utf8()..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

fn extract_bool_value(header: &str, key: &str) -> bool {
    let Some(key_pos) = find_key(header, key) else {
        return false;
    };
    let Some(colon_rel) = header[key_pos..].find(':') else {
        return false;
    };
    let rest = header[key_pos + colon_rel + 1..].trim_start();
    rest.starts_with("True") || rest.starts_with("true")
}

fn extract_shape(header: &str) -> Option<Vec<usize>> {
    let key_pos = find_key(header, "shape")?;
    let colon = header[key_pos..].find(':')? + key_pos;
    let open = header[colon..].find('(')? + colon;
    let close = header[open..].find(')')? + open;
    let inner = &header[open + 1..close];
    let mut dims = Vec::new();
    for part in inner.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        dims.push(part.parse::<usize>().ok()?);
    }
    Some(dims)
}

fn find_key(header: &str, key: &str) -> Option<usize> {
    header
        .find(&format!("'{key}'"))
        .or_else(|| header.find(&format!("\"{key}\"")))
}

fn widen_to_f32(raw: &[u8], dtype: DType, big_endian: bool) -> Vec<f32> {
    let elem_size = dtype.elem_size();
    let count = raw.len() / elem_size;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let mut buf = [0u8; 4];
        let chunk = &raw[i * elem_size..(i + 1) * elem_size];
        buf[..elem_size].copy_from_slice(chunk);
        if big_endian && elem_size > 1 {
            buf[..elem_size].reverse();
        }
        let value = match dtype {
            DType::F4 => f32::from_le_bytes(buf),
            DType::I4 => i32::from_le_bytes(buf) as f32,
            DType::I2 => i16::from_le_bytes([buf[0], buf[1]]) as f32,
            DType::U1 => buf[0] as f32,
        };
        out.push(value);
    }
    out
}
