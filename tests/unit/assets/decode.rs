use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([100, 50, 200, 128]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_pixels() {
    let loaded = decode_image(&png_bytes(3, 2)).unwrap();
    assert_eq!(loaded.source, SourceImage::new(3, 2).unwrap());
    assert_eq!(loaded.pixels.get_pixel(2, 1).0, [100, 50, 200, 128]);
    assert_eq!(loaded.file_bytes, None);
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn load_from_file_records_size() {
    let dir = std::path::PathBuf::from("target").join("unit_decode");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("src.png");
    let bytes = png_bytes(4, 4);
    std::fs::write(&path, &bytes).unwrap();

    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded.file_bytes, Some(bytes.len() as u64));
    assert!(load_image(&dir.join("missing.png")).is_err());
}
