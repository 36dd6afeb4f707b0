//! OSC 1.0 message codec (panic-free).
//!
//! Wire layout of a message:
//! - address: UTF-8, NUL-terminated, zero-padded to a 4-byte boundary
//! - type tag string: `,` + one tag per argument, NUL-terminated, padded
//! - arguments, big-endian: `i` int32, `f` float32, `s` padded string
//!
//! Decoding reads through a shrinking `&[u8]` cursor with a length check before
//! every field, so truncated or hostile datagrams become `MalformedPacket`.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OscRelayError, Result};

/// Every OSC field is aligned to this many bytes.
pub const OSC_ALIGN: usize = 4;

const BUNDLE_TAG: &[u8] = b"#bundle";

/// One typed OSC argument.
///
/// Serializes as a bare JSON value (number or string), which is the shape
/// subscribers receive inside an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    Str(String),
}

impl OscArg {
    /// Wire type tag for this argument.
    pub fn type_tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::Str(_) => 's',
        }
    }

    /// Integer argument, clamped into the int32 range.
    pub fn from_i64(v: i64) -> Self {
        OscArg::Int(v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    /// Float argument, narrowed to 32 bits.
    pub fn from_f64(v: f64) -> Self {
        OscArg::Float(v as f32)
    }

    /// Map a loosely typed JSON value onto an argument.
    ///
    /// Integers clamp, floats narrow, strings pass through; anything else
    /// (null, bool, array, object) becomes `Float(0.0)`.
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    OscArg::from_i64(i)
                } else if n.is_u64() {
                    OscArg::Int(i32::MAX)
                } else {
                    OscArg::from_f64(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => OscArg::Str(s.clone()),
            _ => OscArg::Float(0.0),
        }
    }

    /// Parse a command-line style token: integer, then finite float, else string.
    pub fn parse_loose(token: &str) -> Self {
        if let Ok(i) = token.parse::<i64>() {
            return OscArg::from_i64(i);
        }
        match token.parse::<f64>() {
            Ok(f) if f.is_finite() => OscArg::from_f64(f),
            _ => OscArg::Str(token.to_string()),
        }
    }
}

impl From<i32> for OscArg {
    fn from(v: i32) -> Self {
        OscArg::Int(v)
    }
}

impl From<i64> for OscArg {
    fn from(v: i64) -> Self {
        OscArg::from_i64(v)
    }
}

impl From<f32> for OscArg {
    fn from(v: f32) -> Self {
        OscArg::Float(v)
    }
}

impl From<f64> for OscArg {
    fn from(v: f64) -> Self {
        OscArg::from_f64(v)
    }
}

impl From<&str> for OscArg {
    fn from(v: &str) -> Self {
        OscArg::Str(v.to_string())
    }
}

impl From<String> for OscArg {
    fn from(v: String) -> Self {
        OscArg::Str(v)
    }
}

/// Decoded (or to-be-encoded) OSC message.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    /// Address, always starting with `/` and free of `,`.
    pub address: String,
    /// Arguments in wire order.
    pub args: Vec<OscArg>,
}

impl OscMessage {
    /// Build a message, normalizing the address.
    pub fn new(address: &str, args: Vec<OscArg>) -> Self {
        Self {
            address: normalize_address(address),
            args,
        }
    }

    /// Type tag string (`,` + one tag per argument).
    pub fn type_tags(&self) -> String {
        type_tags(&self.args)
    }

    /// Encode into a UDP-ready packet.
    pub fn encode(&self) -> Bytes {
        encode(&self.address, &self.args)
    }
}

/// Ensure a leading `/` and drop anything from the first `,` onward.
pub fn normalize_address(address: &str) -> String {
    let head = address.split(',').next().unwrap_or_default();
    if head.starts_with('/') {
        head.to_string()
    } else {
        format!("/{head}")
    }
}

fn type_tags(args: &[OscArg]) -> String {
    let mut tags = String::with_capacity(args.len() + 1);
    tags.push(',');
    tags.extend(args.iter().map(OscArg::type_tag));
    tags
}

/// Length of a NUL-terminated field of `content_len` bytes once padded.
fn padded_len(content_len: usize) -> usize {
    (content_len + 1 + (OSC_ALIGN - 1)) & !(OSC_ALIGN - 1)
}

/// Append string bytes + NUL + zero padding. Content after an interior NUL
/// cannot be represented on the wire and is cut off.
fn put_padded_str(buf: &mut BytesMut, s: &str) {
    let bytes = s.as_bytes();
    let content = bytes.split(|b| *b == 0).next().unwrap_or_default();
    buf.put_slice(content);
    buf.put_bytes(0, padded_len(content.len()) - content.len());
}

/// Encode an OSC message.
///
/// Infallible: the address is normalized, and the output length is always a
/// multiple of [`OSC_ALIGN`].
pub fn encode(address: &str, args: &[OscArg]) -> Bytes {
    let address = normalize_address(address);
    let tags = type_tags(args);

    let payload_len: usize = args
        .iter()
        .map(|a| match a {
            OscArg::Str(s) => padded_len(s.len()),
            _ => 4,
        })
        .sum();
    let mut buf =
        BytesMut::with_capacity(padded_len(address.len()) + padded_len(tags.len()) + payload_len);

    put_padded_str(&mut buf, &address);
    put_padded_str(&mut buf, &tags);

    for arg in args {
        match arg {
            OscArg::Int(v) => buf.put_i32(*v),
            OscArg::Float(v) => buf.put_f32(*v),
            OscArg::Str(s) => put_padded_str(&mut buf, s),
        }
    }

    buf.freeze()
}

/// Read a NUL-terminated, padded string and advance past its padding.
fn read_padded_str(buf: &mut &[u8], what: &str) -> Result<String> {
    let chunk: &[u8] = buf;
    let nul = chunk
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| OscRelayError::malformed(format!("{what} is not NUL-terminated")))?;

    let raw = chunk
        .get(..nul)
        .ok_or_else(|| OscRelayError::malformed(format!("{what} out of bounds")))?;
    let s = std::str::from_utf8(raw)
        .map_err(|e| OscRelayError::malformed(format!("{what} is not UTF-8: {e}")))?
        .to_owned();

    let total = padded_len(nul);
    if buf.remaining() < total {
        return Err(OscRelayError::malformed(format!("{what} padding truncated")));
    }
    buf.advance(total);
    Ok(s)
}

fn need(buf: &[u8], n: usize, what: &str) -> Result<()> {
    if buf.remaining() < n {
        return Err(OscRelayError::malformed(format!(
            "{what} argument needs {n} bytes, {} left",
            buf.remaining()
        )));
    }
    Ok(())
}

/// Decode one OSC message from a UDP datagram.
pub fn decode(datagram: &[u8]) -> Result<OscMessage> {
    let mut buf = datagram;

    if !buf.has_remaining() {
        return Err(OscRelayError::malformed("empty datagram"));
    }
    if buf.starts_with(BUNDLE_TAG) {
        return Err(OscRelayError::malformed("OSC bundles are not supported"));
    }

    let address = read_padded_str(&mut buf, "address")?;
    if !address.starts_with('/') {
        return Err(OscRelayError::malformed("address must start with '/'"));
    }
    if address.contains(',') {
        return Err(OscRelayError::malformed("address must not contain ','"));
    }

    // Address-only datagram: no type tag string, no arguments.
    if !buf.has_remaining() {
        return Ok(OscMessage {
            address,
            args: Vec::new(),
        });
    }

    let tags = read_padded_str(&mut buf, "type tag string")?;
    let tags = tags
        .strip_prefix(',')
        .ok_or_else(|| OscRelayError::malformed("type tag string must start with ','"))?;

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => {
                need(buf, 4, "int32")?;
                OscArg::Int(buf.get_i32())
            }
            'f' => {
                need(buf, 4, "float32")?;
                OscArg::Float(buf.get_f32())
            }
            's' => OscArg::Str(read_padded_str(&mut buf, "string argument")?),
            other => {
                return Err(OscRelayError::malformed(format!(
                    "unsupported type tag '{other}'"
                )))
            }
        };
        args.push(arg);
    }

    if buf.has_remaining() {
        tracing::debug!(
            address = %address,
            trailing = buf.remaining(),
            "ignoring trailing bytes after OSC arguments"
        );
    }

    Ok(OscMessage { address, args })
}
