//! PNG encoding for RGBA canvases.
//!
//! Quicklooks are colormapped rasters with few distinct colors, so most
//! images fit an indexed PNG (color type 3). Images with more than 256
//! colors fall back to truecolor with alpha (color type 6).

use std::collections::{HashMap, HashSet};
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};

pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const MAX_PALETTE_SIZE: usize = 256;

/// Pixel count above which palette extraction runs on the rayon pool.
const PARALLEL_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorType {
    Indexed = 3,
    Rgba = 6,
}

/// Distinct colors of an image and the per-pixel index into them.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub colors: Vec<[u8; 4]>,
    pub indices: Vec<u8>,
}

/// Encode RGBA bytes, picking indexed or truecolor by color count.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_len(pixels, width, height)?;

    let palette = if width * height >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette(pixels)
    };

    match palette {
        Some(palette) => encode_indexed(&palette, width, height),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode as color type 6.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_len(pixels, width, height)?;
    let mut png = header(width, height, ColorType::Rgba);
    let idat = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode as color type 3 with a `tRNS` chunk when any entry is translucent.
pub fn encode_indexed(palette: &Palette, width: usize, height: usize) -> RenderResult<Vec<u8>> {
    if palette.indices.len() != width * height {
        return Err(RenderError::Encode(format!(
            "{} palette indices for a {}x{} image",
            palette.indices.len(),
            width,
            height
        )));
    }

    let mut png = header(width, height, ColorType::Indexed);

    let plte: Vec<u8> = palette.colors.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.colors.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.colors.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(&palette.indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_len(pixels: &[u8], width: usize, height: usize) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::Encode(format!("empty image {}x{}", width, height)));
    }
    if pixels.len() != width * height * 4 {
        return Err(RenderError::Encode(format!(
            "{} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }
    Ok(())
}

/// Signature plus IHDR, 8 bits per sample, no interlace.
fn header(width: usize, height: usize, color_type: ColorType) -> Vec<u8> {
    let mut png = PNG_SIGNATURE.to_vec();
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type as u8, 0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);
    png
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Palette in first-seen order, or `None` past 256 colors.
pub fn extract_palette(pixels: &[u8]) -> Option<Palette> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if colors.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let i = colors.len() as u8;
                colors.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }

    Some(Palette { colors, indices })
}

/// Same result set as [`extract_palette`], built on the rayon pool.
///
/// Colors are collected per chunk, merged and sorted so the palette order
/// does not depend on scheduling, then pixels are mapped in parallel.
pub fn extract_palette_parallel(pixels: &[u8]) -> Option<Palette> {
    let chunk_size = (pixels.len() / 4 / rayon::current_num_threads()).max(256) * 4;

    let per_chunk: Vec<HashSet<u32>> = pixels
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack(px));
                if seen.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            seen
        })
        .collect();

    let mut keys: HashSet<u32> = HashSet::with_capacity(MAX_PALETTE_SIZE);
    for seen in per_chunk {
        keys.extend(seen);
        if keys.len() > MAX_PALETTE_SIZE {
            return None;
        }
    }

    let mut keys: Vec<u32> = keys.into_iter().collect();
    keys.sort_unstable();
    let lookup: HashMap<u32, u8> = keys
        .iter()
        .enumerate()
        .map(|(i, &k)| (k, i as u8))
        .collect();

    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
        .collect();
    let colors = keys.into_iter().map(u32::to_le_bytes).collect();

    Some(Palette { colors, indices })
}

/// Zlib-compress rows of `row_len` bytes, each prefixed by filter type 0.
fn deflate_scanlines(data: &[u8], row_len: usize, height: usize) -> RenderResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (row_len + 1));
    for row in data.chunks_exact(row_len).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    let failed = |e: std::io::Error| RenderError::Encode(format!("IDAT compression failed: {}", e));
    encoder.write_all(&raw).map_err(failed)?;
    encoder.finish().map_err(failed)
}

/// Append length, type, data and the CRC over type + data.
fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);
    png.extend_from_slice(&crc.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_types(png: &[u8]) -> Vec<String> {
        let mut types = Vec::new();
        let mut pos = PNG_SIGNATURE.len();
        while pos + 8 <= png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            types.push(String::from_utf8_lossy(&png[pos + 4..pos + 8]).into_owned());
            pos += 12 + len;
        }
        types
    }

    #[test]
    fn test_palette_first_seen_order() {
        let pixels = [
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            255, 0, 0, 255,
        ];
        let palette = extract_palette(&pixels).unwrap();
        assert_eq!(palette.colors, vec![[255, 0, 0, 255], [0, 255, 0, 255]]);
        assert_eq!(palette.indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32).flat_map(|i| [i as u8, (i >> 8) as u8, 0, 255]).collect();
        assert!(extract_palette(&pixels).is_none());
        assert!(extract_palette_parallel(&pixels).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential_colors() {
        let pixels: Vec<u8> = (0..128 * 128)
            .flat_map(|i: usize| {
                let c = ((i % 128) / 8 + (i / 128) / 8) as u8;
                [c * 4, 100, 200 - c, 255]
            })
            .collect();

        let seq = extract_palette(&pixels).unwrap();
        let par = extract_palette_parallel(&pixels).unwrap();
        assert_eq!(seq.colors.len(), par.colors.len());
        for (i, px) in pixels.chunks_exact(4).enumerate() {
            assert_eq!(&par.colors[par.indices[i] as usize][..], px);
        }
    }

    #[test]
    fn test_indexed_chunk_layout() {
        let pixels = [0, 0, 0, 255, 255, 255, 255, 0];
        let png = encode_auto(&pixels, 2, 1).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(chunk_types(&png), vec!["IHDR", "PLTE", "tRNS", "IDAT", "IEND"]);
        assert_eq!(png[8 + 8 + 9], 3);
    }

    #[test]
    fn test_rgba_fallback() {
        let pixels: Vec<u8> = (0..20 * 20u32).flat_map(|i| [i as u8, (i / 7) as u8, 9, 255]).collect();
        let png = encode_auto(&pixels, 20, 20).unwrap();
        assert_eq!(chunk_types(&png), vec!["IHDR", "IDAT", "IEND"]);
        assert_eq!(png[8 + 8 + 9], 6);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        assert!(matches!(encode_rgba(&[0; 12], 2, 2), Err(RenderError::Encode(_))));
        assert!(encode_auto(&[], 0, 0).is_err());
    }
}
