/*!
# Aplasta: Codec

Decoding is handled by the `png` crate; everything on the way back out
(filtering, chunking, and zlib compression at a chosen level, strategy, and
window) is handled here so every knob is in reach.
*/

mod chunk;
mod decode;
mod encode;
mod filter;
mod header;
mod meta;
mod transform;
mod zlib;

pub(crate) use chunk::{
	Chunk,
	Chunks,
	MAX_CHUNK_LEN,
	SIGNATURE,
};
#[cfg(test)] pub(crate) use chunk::{
	crc32,
	write_chunk,
};
pub(crate) use decode::Decoder;
pub(crate) use encode::{
	Encoder,
	EncoderConfig,
};
pub(crate) use header::{
	ColorType,
	Header,
};
pub(crate) use meta::Metadata;
pub(crate) use transform::{
	Transform,
	TransformOptions,
};
