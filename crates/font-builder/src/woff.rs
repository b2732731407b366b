//! WOFF 1.0 wrapping of an sfnt binary.

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};
use log::debug;
use read_fonts::FontRef;

use crate::error::{Error, Result};

const SIGNATURE: u32 = 0x774F_4646; // "wOFF"
const HEADER_SIZE: usize = 44;
const DIRECTORY_ENTRY_SIZE: usize = 20;
const SFNT_HEADER_SIZE: usize = 12;
const SFNT_ENTRY_SIZE: usize = 16;

struct Table {
    tag: [u8; 4],
    checksum: u32,
    original_length: u32,
    data: Vec<u8>,
}

/// Compress a TrueType/OpenType binary into WOFF 1.0.
///
/// Each table is zlib-compressed; tables that do not shrink are stored raw.
pub fn compress(sfnt: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(sfnt)?;
    let flavor = font.table_directory.sfnt_version();

    let mut tables = Vec::new();
    for record in font.table_directory.table_records() {
        let start = record.offset() as usize;
        let end = start + record.length() as usize;
        let raw = sfnt.get(start..end).ok_or_else(|| {
            Error::Compress(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("table {} extends past end of font", record.tag()),
            ))
        })?;

        let compressed = deflate(raw)?;
        let data = if compressed.len() < raw.len() { compressed } else { raw.to_vec() };
        tables.push(Table {
            tag: record.tag().to_be_bytes(),
            checksum: record.checksum(),
            original_length: raw.len() as u32,
            data,
        });
    }
    tables.sort_by_key(|t| t.tag);

    let total_sfnt_size = SFNT_HEADER_SIZE
        + SFNT_ENTRY_SIZE * tables.len()
        + tables.iter().map(|t| pad4(t.original_length as usize)).sum::<usize>();

    let mut offset = HEADER_SIZE + DIRECTORY_ENTRY_SIZE * tables.len();
    let mut directory = Vec::with_capacity(DIRECTORY_ENTRY_SIZE * tables.len());
    let mut body = Vec::new();
    for table in &tables {
        directory.extend_from_slice(&table.tag);
        directory.extend_from_slice(&(offset as u32).to_be_bytes());
        directory.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        directory.extend_from_slice(&table.original_length.to_be_bytes());
        directory.extend_from_slice(&table.checksum.to_be_bytes());

        body.extend_from_slice(&table.data);
        body.resize(pad4(body.len()), 0);
        offset = HEADER_SIZE + DIRECTORY_ENTRY_SIZE * tables.len() + body.len();
    }

    let length = HEADER_SIZE + directory.len() + body.len();
    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(&SIGNATURE.to_be_bytes());
    out.extend_from_slice(&flavor.to_be_bytes());
    out.extend_from_slice(&(length as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    out.extend_from_slice(&[0; 20]); // no metadata or private blocks
    out.extend_from_slice(&directory);
    out.extend_from_slice(&body);

    debug!("WOFF: {} -> {} bytes", sfnt.len(), out.len());
    Ok(out)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn pad4(len: usize) -> usize {
    (len + 3) & !3
}
