use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::avatar::{AvatarGenerator, GeneratedAvatar};
use crate::infra::config::AvatarConfig;

const GRID: u32 = 5;
// Columns 0..=2 are drawn, 3 and 4 mirror 1 and 0.
const HALF: u32 = GRID / 2 + 1;

/// Symmetric 5x5 identicon seeded by a BLAKE3 hash, rendered to PNG on a
/// transparent background.
pub struct IdenticonGenerator {
    size: u32,
    padding: f32,
}

impl IdenticonGenerator {
    pub fn new(config: &AvatarConfig) -> Self {
        Self {
            size: config.size,
            padding: config.padding.clamp(0.0, 0.4),
        }
    }

    fn cells(hash: &[u8; 32]) -> [[bool; GRID as usize]; GRID as usize] {
        let mut cells = [[false; GRID as usize]; GRID as usize];
        let mut any = false;

        for row in 0..GRID {
            for col in 0..HALF {
                let bit = (row * HALF + col) as usize;
                let on = hash[bit / 8 + 4] >> (bit % 8) & 1 == 1;
                cells[row as usize][col as usize] = on;
                cells[row as usize][(GRID - 1 - col) as usize] = on;
                any |= on;
            }
        }

        if !any {
            cells[(GRID / 2) as usize][(GRID / 2) as usize] = true;
        }
        cells
    }

    fn colour(hash: &[u8; 32]) -> Rgba<u8> {
        let hue = u16::from_le_bytes([hash[0], hash[1]]) as f32 / u16::MAX as f32;
        let (r, g, b) = hsl_to_rgb(hue, 0.5, 0.55);
        Rgba([r, g, b, 255])
    }

    fn render(&self, seed: &str) -> AppResult<RgbaImage> {
        let pad = (self.size as f32 * self.padding).round() as u32;
        let inner = self.size.saturating_sub(pad * 2);
        if inner < GRID {
            return Err(AppError::AvatarGenerationError(format!(
                "avatar size {} is too small",
                self.size
            )));
        }

        let hash = blake3::hash(seed.as_bytes());
        let cells = Self::cells(hash.as_bytes());
        let colour = Self::colour(hash.as_bytes());
        let cell = inner as f32 / GRID as f32;

        let mut img = RgbaImage::from_pixel(self.size, self.size, Rgba([0, 0, 0, 0]));
        for (row, line) in cells.iter().enumerate() {
            for (col, on) in line.iter().enumerate() {
                if !on {
                    continue;
                }
                let x0 = pad + (col as f32 * cell).round() as u32;
                let x1 = pad + ((col + 1) as f32 * cell).round() as u32;
                let y0 = pad + (row as f32 * cell).round() as u32;
                let y1 = pad + ((row + 1) as f32 * cell).round() as u32;
                for y in y0..y1 {
                    for x in x0..x1 {
                        img.put_pixel(x, y, colour);
                    }
                }
            }
        }
        Ok(img)
    }
}

impl AvatarGenerator for IdenticonGenerator {
    fn generate(&self, seed: &str) -> AppResult<GeneratedAvatar> {
        let img = self.render(seed)?;

        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| AppError::AvatarGenerationError(e.to_string()))?;

        Ok(GeneratedAvatar {
            data: Bytes::from(buf),
            content_type: "image/png",
            ext: "png",
        })
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r), to_u8(g), to_u8(b))
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::IdenticonGenerator;
    use crate::application::app_error::AppError;
    use crate::application::interface::avatar::AvatarGenerator;
    use crate::infra::config::AvatarConfig;

    const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[fixture]
    fn generator() -> IdenticonGenerator {
        IdenticonGenerator::new(&AvatarConfig::default())
    }

    #[rstest]
    fn test_generates_png_of_configured_size(generator: IdenticonGenerator) {
        let avatar = generator.generate("fox").unwrap();

        assert_eq!(avatar.content_type, "image/png");
        assert_eq!(avatar.ext, "png");
        assert!(avatar.data.starts_with(PNG_SIGNATURE));

        let decoded = image::load_from_memory(&avatar.data).unwrap();
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 200);
    }

    #[rstest]
    fn test_same_seed_same_image(generator: IdenticonGenerator) {
        let first = generator.generate("fox").unwrap();
        let second = generator.generate("fox").unwrap();
        assert_eq!(first.data, second.data);
    }

    #[rstest]
    fn test_different_seeds_differ(generator: IdenticonGenerator) {
        let fox = generator.generate("fox").unwrap();
        let vixen = generator.generate("vixen").unwrap();
        assert_ne!(fox.data, vixen.data);
    }

    #[rstest]
    fn test_image_is_mirrored(generator: IdenticonGenerator) {
        let img = generator.render("symmetry").unwrap();
        let width = img.width();
        for y in 0..img.height() {
            for x in 0..width / 2 {
                assert_eq!(img.get_pixel(x, y), img.get_pixel(width - 1 - x, y));
            }
        }
    }

    #[test]
    fn test_too_small_size_fails() {
        let generator = IdenticonGenerator::new(&AvatarConfig { size: 3, padding: 0.0 });
        assert!(matches!(
            generator.generate("fox").unwrap_err(),
            AppError::AvatarGenerationError(_)
        ));
    }
}
