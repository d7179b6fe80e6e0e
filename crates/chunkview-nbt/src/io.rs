use crate::tag::Tag;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::collections::HashMap;
use std::io::{self, Read, Write};

/// Nesting deeper than this is rejected instead of recursing further.
const MAX_DEPTH: usize = 512;
/// Array elements read per step. Lengths come from the input, so storage
/// grows only as fast as the payload actually arrives.
const READ_CHUNK: usize = 4096;

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn read_len<R: Read>(reader: &mut R) -> io::Result<usize> {
    let length = reader.read_i32::<BigEndian>()?;
    usize::try_from(length).map_err(|_| invalid(format!("Negative array length: {}", length)))
}

fn read_array<R: Read, T: Copy + Default>(
    reader: &mut R,
    len: usize,
    mut fill: impl FnMut(&mut R, &mut [T]) -> io::Result<()>,
) -> io::Result<Vec<T>> {
    let mut values = Vec::with_capacity(len.min(READ_CHUNK));
    let mut buffer = [T::default(); READ_CHUNK];
    while values.len() < len {
        let n = (len - values.len()).min(READ_CHUNK);
        fill(reader, &mut buffer[..n])?;
        values.extend_from_slice(&buffer[..n]);
    }
    Ok(values)
}

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let length = reader.read_u16::<BigEndian>()?;
    let mut bytes = vec![0u8; length as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| invalid(e.to_string()))
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let length = u16::try_from(value.len())
        .map_err(|_| invalid(format!("String too long: {} bytes", value.len())))?;
    writer.write_u16::<BigEndian>(length)?;
    writer.write_all(value.as_bytes())
}

impl Tag {
    /// Reads one named tag. A lone `End` yields an empty name.
    pub fn read<R: Read>(reader: &mut R) -> io::Result<(String, Tag)> {
        Self::read_named(reader, 0)
    }

    fn read_named<R: Read>(reader: &mut R, depth: usize) -> io::Result<(String, Tag)> {
        let type_id = reader.read_u8()?;
        if type_id == 0 {
            return Ok((String::new(), Tag::End));
        }
        let name = read_string(reader)?;
        let tag = Tag::read_payload(reader, type_id, depth)?;
        Ok((name, tag))
    }

    fn read_payload<R: Read>(reader: &mut R, type_id: u8, depth: usize) -> io::Result<Tag> {
        if depth > MAX_DEPTH {
            return Err(invalid(format!("Tag nesting exceeds {}", MAX_DEPTH)));
        }
        match type_id {
            0 => Ok(Tag::End),
            1 => Ok(Tag::Byte(reader.read_i8()?)),
            2 => Ok(Tag::Short(reader.read_i16::<BigEndian>()?)),
            3 => Ok(Tag::Int(reader.read_i32::<BigEndian>()?)),
            4 => Ok(Tag::Long(reader.read_i64::<BigEndian>()?)),
            5 => Ok(Tag::Float(reader.read_f32::<BigEndian>()?)),
            6 => Ok(Tag::Double(reader.read_f64::<BigEndian>()?)),
            7 => {
                let len = read_len(reader)?;
                Ok(Tag::ByteArray(read_array(reader, len, |r, buf| r.read_i8_into(buf))?))
            }
            8 => Ok(Tag::String(read_string(reader)?)),
            9 => {
                let list_type = reader.read_u8()?;
                let length = read_len(reader)?;
                if list_type == 0 && length > 0 {
                    return Err(invalid(format!("List of {} End tags", length)));
                }
                let mut list = Vec::with_capacity(length.min(READ_CHUNK));
                for _ in 0..length {
                    list.push(Tag::read_payload(reader, list_type, depth + 1)?);
                }
                Ok(Tag::List(list))
            }
            10 => {
                let mut compound = HashMap::new();
                loop {
                    let (name, tag) = Tag::read_named(reader, depth + 1)?;
                    if let Tag::End = tag {
                        break;
                    }
                    compound.insert(name, tag);
                }
                Ok(Tag::Compound(compound))
            }
            11 => {
                let len = read_len(reader)?;
                let ints = read_array(reader, len, |r, buf| r.read_i32_into::<BigEndian>(buf))?;
                Ok(Tag::IntArray(ints))
            }
            12 => {
                let len = read_len(reader)?;
                let longs = read_array(reader, len, |r, buf| r.read_i64_into::<BigEndian>(buf))?;
                Ok(Tag::LongArray(longs))
            }
            _ => Err(invalid(format!("Invalid tag type: {}", type_id))),
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W, name: &str) -> io::Result<()> {
        writer.write_u8(self.get_type_id())?;
        if !matches!(self, Tag::End) {
            write_string(writer, name)?;
        }
        self.write_payload(writer)
    }

    fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Tag::End => Ok(()),
            Tag::Byte(v) => writer.write_i8(*v),
            Tag::Short(v) => writer.write_i16::<BigEndian>(*v),
            Tag::Int(v) => writer.write_i32::<BigEndian>(*v),
            Tag::Long(v) => writer.write_i64::<BigEndian>(*v),
            Tag::Float(v) => writer.write_f32::<BigEndian>(*v),
            Tag::Double(v) => writer.write_f64::<BigEndian>(*v),
            Tag::ByteArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                v.iter().try_for_each(|&b| writer.write_i8(b))
            }
            Tag::String(v) => write_string(writer, v),
            Tag::List(v) => {
                // Lists are homogeneous; an empty one is typed as End.
                writer.write_u8(v.first().map_or(0, Tag::get_type_id))?;
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                v.iter().try_for_each(|tag| tag.write_payload(writer))
            }
            Tag::Compound(v) => {
                for (name, tag) in v {
                    tag.write(writer, name)?;
                }
                Tag::End.write(writer, "")
            }
            Tag::IntArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                v.iter().try_for_each(|&i| writer.write_i32::<BigEndian>(i))
            }
            Tag::LongArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                v.iter().try_for_each(|&l| writer.write_i64::<BigEndian>(l))
            }
        }
    }
}

/// How a serialized tree is wrapped on disk or inside a region sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zlib,
}

/// A named root tag, e.g. one chunk record.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtFile {
    pub root: Tag,
    pub name: String,
}

impl NbtFile {
    pub fn new(name: String, root: Tag) -> Self {
        NbtFile { root, name }
    }

    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        let (name, root) = Tag::read(reader)?;
        Ok(NbtFile { root, name })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.root.write(writer, &self.name)
    }

    pub fn read_compressed<R: Read>(reader: &mut R, compression: Compression) -> io::Result<Self> {
        match compression {
            Compression::None => Self::read(reader),
            Compression::Gzip => Self::read(&mut GzDecoder::new(reader)),
            Compression::Zlib => Self::read(&mut ZlibDecoder::new(reader)),
        }
    }

    pub fn write_compressed<W: Write>(&self, writer: &mut W, compression: Compression) -> io::Result<()> {
        match compression {
            Compression::None => self.write(writer),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(writer, flate2::Compression::default());
                self.write(&mut encoder)?;
                encoder.finish().map(drop)
            }
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(writer, flate2::Compression::default());
                self.write(&mut encoder)?;
                encoder.finish().map(drop)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_chunk() -> Tag {
        Tag::compound([
            ("DataVersion", Tag::Int(2230)),
            (
                "Level",
                Tag::compound([
                    ("Status", Tag::String("full".to_owned())),
                    (
                        "Sections",
                        Tag::List(vec![Tag::compound([
                            ("Y", Tag::Byte(3)),
                            ("BlockStates", Tag::LongArray(vec![1, -2, i64::MAX])),
                            ("Blocks", Tag::ByteArray(vec![0, -1, 127])),
                        ])]),
                    ),
                    ("Biomes", Tag::IntArray(vec![1, 2, 3])),
                    ("TileEntities", Tag::List(vec![])),
                ]),
            ),
        ])
    }

    #[test]
    fn test_chunk_tree_read_write() {
        let tag = sample_chunk();
        let mut buffer = Vec::new();
        tag.write(&mut buffer, "").unwrap();

        let (name, read_tag) = Tag::read(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(name, "");
        assert_eq!(read_tag, tag);
    }

    #[test]
    fn test_compressed_files() {
        let original = NbtFile::new("chunk".to_owned(), sample_chunk());
        for compression in [Compression::None, Compression::Gzip, Compression::Zlib] {
            let mut buffer = Vec::new();
            original.write_compressed(&mut buffer, compression).unwrap();
            let read = NbtFile::read_compressed(&mut Cursor::new(buffer), compression).unwrap();
            assert_eq!(read, original);
        }
    }

    #[test]
    fn test_invalid_tag_type() {
        let result = Tag::read_payload(&mut Cursor::new(vec![255u8]), 255, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_array_length() {
        // TAG_Byte_Array named "a" with length -1
        let bytes = vec![7u8, 0, 1, b'a', 0xFF, 0xFF, 0xFF, 0xFF];
        let err = Tag::read(&mut Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated_long_array() {
        // TAG_Long_Array named "" claiming 2 longs but carrying 1
        let mut bytes = vec![12u8, 0, 0, 0, 0, 0, 2];
        bytes.extend_from_slice(&[0; 8]);
        assert!(Tag::read(&mut Cursor::new(bytes)).is_err());
    }

    #[test]
    fn test_huge_length_without_payload() {
        // each array type claiming i32::MAX elements, followed by nothing
        for type_id in [7u8, 11, 12] {
            let bytes = vec![type_id, 0, 0, 0x7F, 0xFF, 0xFF, 0xFF];
            let err = Tag::read(&mut Cursor::new(bytes)).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        }
        // a long list of End tags carries no payload to run out of
        let bytes = vec![9u8, 0, 0, 0, 0x7F, 0xFF, 0xFF, 0xFF];
        let err = Tag::read(&mut Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_array_longer_than_one_step() {
        let longs: Vec<i64> = (0..READ_CHUNK as i64 * 2 + 5).collect();
        let tag = Tag::LongArray(longs);
        let mut buffer = Vec::new();
        tag.write(&mut buffer, "states").unwrap();
        let (_, read_tag) = Tag::read(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(read_tag, tag);
    }

    #[test]
    fn test_empty_list() {
        let tag = Tag::List(vec![]);
        let mut buffer = Vec::new();
        tag.write(&mut buffer, "empty").unwrap();

        let (name, read_tag) = Tag::read(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(name, "empty");
        assert_eq!(read_tag, tag);
    }
}
