// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local PNG encoding — the always-valid output path. The encoder embeds no
// timestamps or other varying metadata, so identical scenes produce
// byte-identical files.

use std::io::Cursor;

use image::ImageFormat;
use tracing::debug;

use codesnap_core::{Result, SnapError};
use codesnap_render::RasterImage;

/// Encode the scene to PNG bytes in memory.
pub fn encode_png(scene: &RasterImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    scene
        .as_rgba()
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| SnapError::Image(format!("PNG encoding failed: {err}")))?;
    debug!(bytes = buffer.len(), "scene encoded");
    Ok(buffer)
}

/// Read pixel dimensions back out of encoded image bytes.
///
/// The final artifact's dimensions are always decoded from the bytes being
/// returned — external compression may rewrite container metadata, so the
/// scene's in-memory dimensions are not trusted.
pub fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| SnapError::Image(format!("cannot decode artifact: {err}")))?;
    Ok((image.width(), image.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn checkered(width: u32, height: u32) -> RasterImage {
        RasterImage::new(RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 30, 30, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }))
    }

    #[test]
    fn dimensions_survive_the_round_trip() {
        let scene = checkered(37, 21);
        let bytes = encode_png(&scene).unwrap();
        assert_eq!(decode_dimensions(&bytes).unwrap(), (37, 21));
    }

    #[test]
    fn encoding_is_deterministic() {
        let scene = checkered(64, 48);
        let first = encode_png(&scene).unwrap();
        let second = encode_png(&scene).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn garbage_bytes_do_not_decode() {
        assert!(matches!(
            decode_dimensions(b"definitely not a png"),
            Err(SnapError::Image(_))
        ));
    }

    #[test]
    fn output_is_png() {
        let bytes = encode_png(&checkered(4, 4)).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
