//! Wire format of one command exchange.
//!
//! Every message is a self-contained, versioned, length-prefixed frame:
//!
//! ```text
//! frame    := len:u32 payload            (big endian length, in bytes)
//! payload  := version:u8 kind:u8 body
//! request  := str(email) str(line)
//! response := tag:u8 str(message) str(email) song:u8 [song fields]
//! str      := len:u32 utf8 bytes
//! ```

use std::io::Cursor;

use bytes::Buf;
use thiserror::Error as ThisError;

use crate::audio::{AudioFormat, StreamableSong};
use crate::commands::CommandType;

pub const PROTOCOL_VERSION: u8 = 1;

const HEADER_SIZE: usize = 4;
const KIND_REQUEST: u8 = 0x01;
const KIND_RESPONSE: u8 = 0x02;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),
    #[error("invalid message kind: {0}")]
    InvalidMessageKind(u8),
    #[error("invalid command tag: {0}")]
    InvalidCommandTag(u8),
    #[error("frame length mismatch: declared {declared} bytes, parsed {parsed} bytes")]
    LengthMismatch { declared: usize, parsed: usize },
    /// The header declared the payload complete, so running out of bytes (or
    /// hitting malformed ones) inside the body means corrupt data rather than
    /// a short read.
    #[error("invalid frame format")]
    InvalidFormat,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Request(Request),
    Response(Response),
}

/// What a client sends: its identity (empty until it has logged in) and one
/// raw command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub email: String,
    pub line: String,
}

/// What the server sends back for each request.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub command: CommandType,
    pub message: String,
    pub email: String,
    pub song: Option<StreamableSong>,
}

impl Response {
    pub fn new(command: CommandType, message: impl Into<String>) -> Response {
        Response {
            command,
            message: message.into(),
            email: String::new(),
            song: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Response {
        self.email = email.into();
        self
    }

    pub fn with_song(mut self, song: StreamableSong) -> Response {
        self.song = Some(song);
        self
    }
}

impl Frame {
    /// Parses one frame out of `src`, leaving the cursor just past it.
    /// `Incomplete` means more bytes are needed, not that the data is bad.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Frame, Error> {
        if src.remaining() < HEADER_SIZE {
            return Err(Error::Incomplete);
        }
        let declared = src.get_u32() as usize;
        if src.remaining() < declared {
            return Err(Error::Incomplete);
        }

        let payload_start = src.position() as usize;
        let payload = &src.get_ref()[payload_start..payload_start + declared];

        let mut body = Cursor::new(payload);
        let frame = Frame::parse_payload(&mut body)?;
        if body.has_remaining() {
            return Err(Error::LengthMismatch {
                declared,
                parsed: declared - body.remaining(),
            });
        }

        src.set_position((payload_start + declared) as u64);
        Ok(frame)
    }

    fn parse_payload(src: &mut Cursor<&[u8]>) -> Result<Frame, Error> {
        let version = get_u8(src)?;
        if version != PROTOCOL_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        match get_u8(src)? {
            KIND_REQUEST => {
                let email = get_string(src)?;
                let line = get_string(src)?;
                Ok(Frame::Request(Request { email, line }))
            }
            KIND_RESPONSE => {
                let command = CommandType::try_from(get_u8(src)?)?;
                let message = get_string(src)?;
                let email = get_string(src)?;
                let song = match get_u8(src)? {
                    0 => None,
                    1 => Some(get_song(src)?),
                    _ => return Err(Error::InvalidFormat),
                };
                Ok(Frame::Response(Response {
                    command,
                    message,
                    email,
                    song,
                }))
            }
            kind => Err(Error::InvalidMessageKind(kind)),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut payload = vec![PROTOCOL_VERSION];

        match self {
            Frame::Request(request) => {
                payload.push(KIND_REQUEST);
                put_string(&mut payload, &request.email);
                put_string(&mut payload, &request.line);
            }
            Frame::Response(response) => {
                payload.push(KIND_RESPONSE);
                payload.push(u8::from(response.command));
                put_string(&mut payload, &response.message);
                put_string(&mut payload, &response.email);
                match &response.song {
                    None => payload.push(0),
                    Some(song) => {
                        payload.push(1);
                        put_song(&mut payload, song);
                    }
                }
            }
        }

        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&payload);
        bytes
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

fn get_song(src: &mut Cursor<&[u8]>) -> Result<StreamableSong, Error> {
    let name = get_string(src)?;
    let path = get_string(src)?;
    let encoding = get_string(src)?;
    let sample_rate = get_f32(src)?;
    let sample_bits = get_u16(src)?;
    let channels = get_u16(src)?;
    let frame_size = get_u16(src)?;
    let frame_rate = get_f32(src)?;
    let big_endian = match get_u8(src)? {
        0 => false,
        1 => true,
        _ => return Err(Error::InvalidFormat),
    };

    Ok(StreamableSong {
        name,
        path,
        format: AudioFormat {
            encoding,
            sample_rate,
            sample_bits,
            channels,
            frame_size,
            frame_rate,
            big_endian,
        },
    })
}

fn put_song(dst: &mut Vec<u8>, song: &StreamableSong) {
    put_string(dst, &song.name);
    put_string(dst, &song.path);
    put_string(dst, &song.format.encoding);
    dst.extend_from_slice(&song.format.sample_rate.to_bits().to_be_bytes());
    dst.extend_from_slice(&song.format.sample_bits.to_be_bytes());
    dst.extend_from_slice(&song.format.channels.to_be_bytes());
    dst.extend_from_slice(&song.format.frame_size.to_be_bytes());
    dst.extend_from_slice(&song.format.frame_rate.to_bits().to_be_bytes());
    dst.push(u8::from(song.format.big_endian));
}

fn put_string(dst: &mut Vec<u8>, value: &str) {
    dst.extend_from_slice(&(value.len() as u32).to_be_bytes());
    dst.extend_from_slice(value.as_bytes());
}

fn get_string(src: &mut Cursor<&[u8]>) -> Result<String, Error> {
    let len = get_u32(src)? as usize;
    if src.remaining() < len {
        return Err(Error::InvalidFormat);
    }

    let start = src.position() as usize;
    let bytes = src.get_ref()[start..start + len].to_vec();
    src.advance(len);

    String::from_utf8(bytes).map_err(|_| Error::InvalidFormat)
}

fn get_u8(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::InvalidFormat);
    }
    Ok(src.get_u8())
}

fn get_u16(src: &mut Cursor<&[u8]>) -> Result<u16, Error> {
    if src.remaining() < 2 {
        return Err(Error::InvalidFormat);
    }
    Ok(src.get_u16())
}

fn get_u32(src: &mut Cursor<&[u8]>) -> Result<u32, Error> {
    if src.remaining() < 4 {
        return Err(Error::InvalidFormat);
    }
    Ok(src.get_u32())
}

fn get_f32(src: &mut Cursor<&[u8]>) -> Result<f32, Error> {
    Ok(f32::from_bits(get_u32(src)?))
}
