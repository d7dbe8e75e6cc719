//! Monochrome BMP encoding.
//!
//! Writes a BITMAPINFOHEADER file at 1 bit per pixel with a two-entry
//! palette (index 0 black, index 1 white), bottom-up rows padded to four
//! bytes. This is the format e-paper frames expect.

use super::canvas::Canvas;

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
const PALETTE_LEN: u32 = 8;
const PIXEL_OFFSET: u32 = FILE_HEADER_LEN + INFO_HEADER_LEN + PALETTE_LEN;

/// Bytes per stored row, including padding to a multiple of four.
fn stride(width: u32) -> u32 {
    width.div_ceil(32) * 4
}

/// Encode `canvas` as a 1-bpp BMP. Encoding into memory cannot fail.
pub fn encode(canvas: &Canvas) -> Vec<u8> {
    let stride = stride(canvas.width());
    let image_len = stride * canvas.height();
    let file_len = PIXEL_OFFSET + image_len;

    let mut out = Vec::with_capacity(file_len as usize);

    // BITMAPFILEHEADER
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_len.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&PIXEL_OFFSET.to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&INFO_HEADER_LEN.to_le_bytes());
    out.extend_from_slice(&(canvas.width() as i32).to_le_bytes());
    out.extend_from_slice(&(canvas.height() as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&1u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&image_len.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes()); // x pixels per meter
    out.extend_from_slice(&0i32.to_le_bytes()); // y pixels per meter
    out.extend_from_slice(&2u32.to_le_bytes()); // colors used
    out.extend_from_slice(&2u32.to_le_bytes()); // important colors

    // Palette, BGRA
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x00]);

    for y in (0..canvas.height()).rev() {
        let mut row = canvas.packed_row(y);
        row.resize(stride as usize, 0);
        out.extend_from_slice(&row);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::canvas::INK;

    fn u32_at(b: &[u8], off: usize) -> u32 {
        u32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
    }

    #[test]
    fn header_describes_canvas() {
        let bytes = encode(&Canvas::new(800, 480));
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(u32_at(&bytes, 2) as usize, bytes.len());
        assert_eq!(u32_at(&bytes, 10), 62);
        assert_eq!(u32_at(&bytes, 18), 800);
        assert_eq!(u32_at(&bytes, 22), 480);
        assert_eq!(u16::from_le_bytes([bytes[28], bytes[29]]), 1);
        // 800 px = 100 bytes, already a multiple of four
        assert_eq!(bytes.len(), 62 + 100 * 480);
    }

    #[test]
    fn rows_are_padded_and_bottom_up() {
        let mut c = Canvas::new(3, 2);
        c.set(0, 0, INK); // top-left is the last stored row
        let bytes = encode(&c);
        assert_eq!(bytes.len(), 62 + 4 * 2);
        let bottom = &bytes[62..66];
        let top = &bytes[66..70];
        assert_eq!(bottom, &[0xFF, 0, 0, 0]);
        assert_eq!(top, &[0x7F, 0, 0, 0]);
    }
}
