//! Info command implementation.

use crate::utils::space_savings;
use oxigz_gzip::{GzipHeader, GzipReader};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// JSON serializable header and size data for one member.
#[derive(Debug, Serialize, Deserialize)]
struct MemberJson {
    /// 1-based position in the stream.
    index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    mtime: u32,
    text: bool,
    xfl: u8,
    os: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra_len: Option<usize>,
    header_crc: bool,
    size: u64,
}

impl MemberJson {
    fn from_header(index: u64, header: &GzipHeader) -> Self {
        Self {
            index,
            filename: header.filename_str().map(|s| s.into_owned()),
            comment: header.comment_str().map(|s| s.into_owned()),
            mtime: header.mtime,
            text: header.text,
            xfl: header.xfl,
            os: header.os,
            extra_len: header.extra.as_ref().map(Vec::len),
            header_crc: header.header_crc,
            size: 0,
        }
    }
}

/// JSON output for a GZIP file.
#[derive(Debug, Serialize, Deserialize)]
struct InfoJson {
    file: String,
    members: u64,
    compressed_size: u64,
    decompressed_size: u64,
    ratio: f64,
    headers: Vec<MemberJson>,
}

pub fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(input)?;
    let mut reader = GzipReader::new(BufReader::new(file));
    let headers = scan_members(&mut reader)?;

    let decompressed_size: u64 = headers.iter().map(|m| m.size).sum();
    let info = InfoJson {
        file: input.display().to_string(),
        members: reader.member_count(),
        compressed_size: reader.total_in(),
        decompressed_size,
        ratio: space_savings(decompressed_size, reader.total_in()),
        headers,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("GZIP Information");
    println!("================");
    println!("File: {}", info.file);
    println!("Members: {}", info.members);
    println!("Compressed size: {} bytes", info.compressed_size);
    println!("Decompressed size: {} bytes", info.decompressed_size);
    if info.decompressed_size > 0 {
        println!("Compression ratio: {:.1}%", info.ratio);
    }

    for member in &info.headers {
        println!();
        println!("Member {}:", member.index);
        if let Some(name) = &member.filename {
            println!("  Original filename: {}", name);
        }
        if let Some(comment) = &member.comment {
            println!("  Comment: {}", comment);
        }
        if member.mtime > 0 {
            println!("  Modification time: {} (Unix timestamp)", member.mtime);
        }
        println!("  Text: {}", member.text);
        println!("  Extra flags: {}", member.xfl);
        println!("  OS: {}", member.os);
        if let Some(len) = member.extra_len {
            println!("  Extra field: {} bytes", len);
        }
        println!("  Header CRC: {}", member.header_crc);
        println!("  Size: {} bytes", member.size);
    }

    Ok(())
}

/// Decode the whole stream, recording every member header that becomes
/// current and the bytes decompressed under it.
///
/// Empty members that directly follow another member are decoded within a
/// single read, so their headers are never current and are only counted.
fn scan_members<R: Read>(
    reader: &mut GzipReader<R>,
) -> Result<Vec<MemberJson>, Box<dyn std::error::Error>> {
    let mut members: Vec<MemberJson> = Vec::new();
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = reader.read_data(&mut buf)?;

        let index = reader.member_count();
        if members.last().is_none_or(|m| m.index != index) {
            if let Some(header) = reader.header() {
                members.push(MemberJson::from_header(index, header));
            }
        }
        if let Some(member) = members.last_mut() {
            member.size += n as u64;
        }

        if n == 0 {
            return Ok(members);
        }
    }
}
