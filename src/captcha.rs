use chrono::Duration;
use image::{Rgb, RgbImage};
use rand::Rng;
use std::io::Cursor;

/// challenge lifetime; an unanswered captcha silently lapses after this
pub const CHALLENGE_TTL: Duration = Duration::minutes(5);
/// wrong answers allowed before the join attempt is abandoned
pub const MAX_ATTEMPTS: u8 = 3;

const DIGITS: u32 = 4;
const WIDTH: u32 = 160;
const HEIGHT: u32 = 60;
const GLYPH_SCALE: u32 = 6;

/// 5x7 bitmaps for '0'..'9'; one row per byte, low 5 bits used
const GLYPHS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // 2
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // 3
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 5
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 7
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 9
];

/// generates a digit challenge and its rendered png.
/// rendering failures cannot happen with an in-memory target, so the image
/// is returned directly.
pub fn generate_captcha() -> (String, Vec<u8>) {
    let mut rng = rand::thread_rng();
    let text: String = (0..DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    let png = render_png(&text, &mut rng);
    (text, png)
}

fn render_png<R: Rng>(text: &str, rng: &mut R) -> Vec<u8> {
    let mut image = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([255, 255, 255]));

    for (i, ch) in text.chars().enumerate() {
        let digit = ch.to_digit(10).expect("challenge text is digits") as usize;
        // keep glyph colors dark enough to stay readable over the noise
        let color = Rgb([
            rng.gen_range(0..200u8),
            rng.gen_range(0..200u8),
            rng.gen_range(0..200u8),
        ]);
        let offset_x = (WIDTH / DIGITS) * i as u32 + 8;
        let offset_y = 6 + rng.gen_range(0..8u32);
        draw_glyph(&mut image, &GLYPHS[digit], offset_x, offset_y, color);
    }

    // speckle noise over ~5% of the pixels
    for _ in 0..(WIDTH * HEIGHT / 20) {
        let x = rng.gen_range(0..WIDTH);
        let y = rng.gen_range(0..HEIGHT);
        image.put_pixel(x, y, Rgb([rng.gen(), rng.gen(), rng.gen()]));
    }

    // a few crossing lines
    for _ in 0..5 {
        let start = (rng.gen_range(0..WIDTH) as i64, rng.gen_range(0..HEIGHT) as i64);
        let end = (rng.gen_range(0..WIDTH) as i64, rng.gen_range(0..HEIGHT) as i64);
        let color = Rgb([rng.gen(), rng.gen(), rng.gen()]);
        draw_line(&mut image, start, end, color);
    }

    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("png encoding to memory");
    buffer.into_inner()
}

fn draw_glyph(image: &mut RgbImage, glyph: &[u8; 7], x0: u32, y0: u32, color: Rgb<u8>) {
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..5u32 {
            if bits & (1 << (4 - col)) == 0 {
                continue;
            }
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    let x = x0 + col * GLYPH_SCALE + dx;
                    let y = y0 + row as u32 * GLYPH_SCALE + dy;
                    if x < WIDTH && y < HEIGHT {
                        image.put_pixel(x, y, color);
                    }
                }
            }
        }
    }
}

fn draw_line(image: &mut RgbImage, start: (i64, i64), end: (i64, i64), color: Rgb<u8>) {
    let steps = (end.0 - start.0).abs().max((end.1 - start.1).abs()).max(1);
    for step in 0..=steps {
        let x = start.0 + (end.0 - start.0) * step / steps;
        let y = start.1 + (end.1 - start.1) * step / steps;
        if (0..WIDTH as i64).contains(&x) && (0..HEIGHT as i64).contains(&y) {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_is_four_digits() {
        let (text, _) = generate_captcha();
        assert_eq!(text.len(), DIGITS as usize);
        assert!(text.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn rendered_image_is_valid_png() {
        let (_, png) = generate_captcha();
        let decoded = image::load_from_memory(&png).expect("decodable png");
        assert_eq!(decoded.width(), WIDTH);
        assert_eq!(decoded.height(), HEIGHT);
    }
}
