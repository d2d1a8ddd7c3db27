//! Headless capture: PNG screenshots of a decoded frame.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use crate::error::CaptureError;
use crate::exchange::FrameView;

/// Save `frame` as an 8-bit RGBA PNG file.
pub fn save_screenshot(frame: &FrameView<'_>, path: &Path) -> Result<(), CaptureError> {
    let file = fs::File::create(path)?;
    let w = BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, frame.width(), frame.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.to_rgba8())?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::FrameExchange;

    #[test]
    fn writes_decodable_png() {
        let ex = FrameExchange::new(4, 2);
        ex.write_pixel(3, 1, [0.0, 1.0, 0.0]);
        ex.publish_frame();
        let (view, _) = ex.acquire();

        let path =
            std::env::temp_dir().join(format!("board-runtime-capture-{}.png", std::process::id()));
        save_screenshot(&view, &path).expect("save");

        let decoder = png::Decoder::new(fs::File::open(&path).expect("open"));
        let mut reader = decoder.read_info().expect("header");
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).expect("frame");
        assert_eq!((info.width, info.height), (4, 2));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        // Last pixel of the second row.
        let last = (info.width as usize * 2 - 1) * 4;
        assert_eq!(&buf[last..last + 4], &[0, 255, 0, 255]);
        assert_eq!(&buf[0..4], &[0, 0, 0, 255]);

        let _ = fs::remove_file(&path);
    }
}
