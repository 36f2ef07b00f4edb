use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};
use moodlens_core::landmarks::mesh;
use moodlens_core::LandmarkSet;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

const BACKGROUND: Rgb<u8> = Rgb([16, 16, 24]);
const MESH_COLOR: Rgb<u8> = Rgb([111, 212, 255]);
const FEATURE_COLOR: Rgb<u8> = Rgb([255, 196, 0]);

/// Points the feature extractor reads; drawn larger so they stand out.
const FEATURE_POINTS: [usize; 11] = [
    mesh::LEFT_EYE_TOP,
    mesh::LEFT_EYE_BOTTOM,
    mesh::LEFT_EYE_OUTER,
    mesh::LEFT_EYE_INNER,
    mesh::RIGHT_EYE_TOP,
    mesh::RIGHT_EYE_BOTTOM,
    mesh::RIGHT_EYE_INNER,
    mesh::RIGHT_EYE_OUTER,
    mesh::MOUTH_LEFT,
    mesh::MOUTH_RIGHT,
    mesh::UPPER_LIP,
];

/// Render normalized landmarks onto a `width` x `height` canvas.
pub fn render(landmarks: &LandmarkSet, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    for p in landmarks.points() {
        dot(&mut img, p.x, p.y, 0, MESH_COLOR);
    }
    for &idx in &FEATURE_POINTS {
        let p = landmarks.point(idx);
        dot(&mut img, p.x, p.y, 2, FEATURE_COLOR);
    }
    img
}

/// Render at the default camera resolution and write a PNG.
pub fn save(landmarks: &LandmarkSet, path: &Path) -> ImageResult<()> {
    render(landmarks, WIDTH, HEIGHT).save(path)?;
    tracing::info!(path = %path.display(), "overlay written");
    Ok(())
}

/// Square of side `2 * radius + 1` centred on a normalized point, clipped to the canvas.
fn dot(img: &mut RgbImage, x: f64, y: f64, radius: i64, color: Rgb<u8>) {
    let cx = (x * f64::from(img.width())).round() as i64;
    let cy = (y * f64::from(img.height())).round() as i64;
    for py in cy - radius..=cy + radius {
        for px in cx - radius..=cx + radius {
            if px >= 0 && py >= 0 && px < i64::from(img.width()) && py < i64::from(img.height()) {
                img.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodlens_core::Point;

    fn landmarks() -> LandmarkSet {
        let mut pts = vec![Point::new(0.5, 0.5); mesh::FACE_MESH_POINTS];
        pts[mesh::MOUTH_LEFT] = Point::new(0.25, 0.75);
        // off-canvas points are clipped, not a panic
        pts[0] = Point::new(-0.2, 1.4);
        LandmarkSet::new(pts).unwrap()
    }

    #[test]
    fn test_render_marks_points() {
        let img = render(&landmarks(), WIDTH, HEIGHT);
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        assert_eq!(*img.get_pixel(160, 360), FEATURE_COLOR);
        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn test_save_png() {
        let path = std::env::temp_dir().join(format!(
            "moodlens-overlay-{}.png",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        save(&landmarks(), &path).unwrap();
        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.width(), WIDTH);
        std::fs::remove_file(&path).unwrap();
    }
}
