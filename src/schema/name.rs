//! Name-suffix decoding into a typed schema
//!
//! A DSM variable's name carries its whole schema: the final character
//! selects the scalar type (`B`, `S`, `L`, `F`, `D`, `X`, or a digit run
//! introduced by `C` for fixed-length strings), and `_V<digits>_` markers
//! anywhere in the name add array dimensions, outermost first.

use serde::{Deserialize, Serialize};

use crate::error::{DsmError, Result};

/// Scalar element kinds encoded by a name's type suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseType {
    /// Signed 8-bit integer, suffix `B`
    Byte,
    /// Signed 16-bit integer, suffix `S`
    Short,
    /// Signed 32-bit integer, suffix `L`
    Long,
    /// 32-bit floating point, suffix `F`
    Float,
    /// 64-bit floating point, suffix `D`
    Double,
    /// Fixed-length character buffer, suffix `C<digits>`
    String,
    /// Aggregate of independently typed members, suffix `X`
    Structure,
}

impl BaseType {
    /// Fixed element size in bytes, or `None` for types whose size comes
    /// from the dimension vector (`String`) or from their members
    /// (`Structure`)
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            BaseType::Byte => Some(1),
            BaseType::Short => Some(2),
            BaseType::Long | BaseType::Float => Some(4),
            BaseType::Double => Some(8),
            BaseType::String | BaseType::Structure => None,
        }
    }

    /// Human-readable name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Short => "short",
            BaseType::Long => "long",
            BaseType::Float => "float",
            BaseType::Double => "double",
            BaseType::String => "string",
            BaseType::Structure => "structure",
        }
    }
}

/// Options controlling name decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameOptions {
    /// Skip `_V` markers whose digit run is not terminated by `_`, instead
    /// of rejecting the whole name.
    ///
    /// The deployed name matcher has always skipped such markers, so the
    /// lenient behavior is the default; disable it to surface malformed
    /// markers as [`DsmError::IllegalName`].
    pub lenient_dim_markers: bool,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            lenient_dim_markers: true,
        }
    }
}

impl NameOptions {
    /// Strict variant that rejects malformed dimension markers
    pub fn strict() -> Self {
        Self {
            lenient_dim_markers: false,
        }
    }
}

/// Decoded schema for a variable name: scalar kind plus dimension vector,
/// outermost dimension first.
///
/// For `String`, the last entry of `dims` is the fixed character-buffer
/// length rather than an enumerable axis; [`Schema::array_dims`] strips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Scalar element kind
    pub base: BaseType,
    /// Axis lengths, outermost first (string length last for `String`)
    pub dims: Vec<usize>,
}

impl Schema {
    /// Decode a case-normalized (uppercase) name into its schema
    pub fn decode(name: &str, options: &NameOptions) -> Result<Schema> {
        let bytes = name.as_bytes();
        let last = *bytes
            .last()
            .ok_or_else(|| DsmError::illegal_name(name))?;

        let base = match last {
            b'B' => BaseType::Byte,
            b'S' => BaseType::Short,
            b'L' => BaseType::Long,
            b'F' => BaseType::Float,
            b'D' => BaseType::Double,
            // Structures carry no dimension markers; decoding stops here.
            b'X' => {
                return Ok(Schema {
                    base: BaseType::Structure,
                    dims: Vec::new(),
                })
            }
            b'0'..=b'9' => BaseType::String,
            _ => return Err(DsmError::illegal_name(name)),
        };

        let string_len = if base == BaseType::String {
            Some(decode_string_length(name, bytes)?)
        } else {
            None
        };

        let mut dims = scan_dim_markers(name, options)?;
        if let Some(len) = string_len {
            // Array dimensions precede the buffer-length entry.
            dims.push(len);
        }
        if dims.iter().any(|&d| d == 0) {
            return Err(DsmError::illegal_name(name));
        }

        tracing::trace!(name, base = base.name(), ?dims, "decoded variable name");
        Ok(Schema { base, dims })
    }

    /// Enumerable axis lengths: the whole dimension vector, minus the
    /// trailing buffer-length entry for `String`
    pub fn array_dims(&self) -> &[usize] {
        match self.base {
            BaseType::String if !self.dims.is_empty() => &self.dims[..self.dims.len() - 1],
            _ => &self.dims,
        }
    }

    /// Reduced rank: number of enumerable axes (0 for scalars and plain
    /// strings)
    pub fn rank(&self) -> usize {
        self.array_dims().len()
    }
}

/// Locate the `C` marker and parse the trailing digit run as the fixed
/// string length.
fn decode_string_length(name: &str, bytes: &[u8]) -> Result<usize> {
    if bytes.len() < 2 {
        return Err(DsmError::illegal_name(name));
    }
    // Scan backward from the second-to-last character; the C must not be
    // the first character of the name.
    let mut i = bytes.len() - 2;
    while i > 0 && bytes[i] != b'C' {
        i -= 1;
    }
    if i == 0 {
        return Err(DsmError::illegal_name(name));
    }
    let run = &bytes[i + 1..];
    if run.is_empty() || !run.iter().all(u8::is_ascii_digit) {
        return Err(DsmError::illegal_name(name));
    }
    std::str::from_utf8(run)
        .ok()
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| DsmError::illegal_name(name))
}

/// Collect `_V<digits>_` markers left to right.
///
/// A `_V` not followed by a digit is never a marker (ordinary names such as
/// `SOME_VAR_B` contain the pair). A digit run not terminated by `_` is
/// skipped in lenient mode and rejected in strict mode.
fn scan_dim_markers(name: &str, options: &NameOptions) -> Result<Vec<usize>> {
    let bytes = name.as_bytes();
    let mut dims = Vec::new();
    let mut pos = 0;
    while let Some(found) = name[pos..].find("_V") {
        let marker = pos + found;
        // The terminating underscore may itself start the next marker.
        pos = marker + 1;
        let run_start = marker + 2;
        let run_len = bytes[run_start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if run_len == 0 {
            continue;
        }
        if bytes.get(run_start + run_len) != Some(&b'_') {
            if options.lenient_dim_markers {
                continue;
            }
            return Err(DsmError::illegal_name(name));
        }
        let dim = std::str::from_utf8(&bytes[run_start..run_start + run_len])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| DsmError::illegal_name(name))?;
        dims.push(dim);
    }
    Ok(dims)
}
