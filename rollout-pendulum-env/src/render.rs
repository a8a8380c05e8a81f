//! Software rendering of the pendulum.
use ndarray::Array3;

const BACKGROUND: [u8; 3] = [255, 255, 255];
const ROD: [u8; 3] = [204, 77, 77];
const AXLE: [u8; 3] = [0, 0, 0];

/// Draws the pendulum at angle `theta` into an RGB image of shape `(h, w, 3)`.
///
/// `theta = 0` points upwards and the angle grows counterclockwise.
pub fn draw(theta: f32, h: usize, w: usize) -> Array3<u8> {
    let mut img = Array3::<u8>::zeros((h, w, 3));
    let scale = h.min(w) as f32;
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let len = 0.4 * scale;
    let half_width = (0.04 * scale).max(1.0);
    let axle = (0.025 * scale).max(1.0);

    // Tip of the rod in image coordinates, y pointing down
    let (tx, ty) = (cx - len * theta.sin(), cy - len * theta.cos());

    for y in 0..h {
        for x in 0..w {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let color = if (px - cx).hypot(py - cy) <= axle {
                AXLE
            } else if dist_to_segment(px, py, cx, cy, tx, ty) <= half_width {
                ROD
            } else {
                BACKGROUND
            };
            for (c, v) in color.iter().enumerate() {
                img[[y, x, c]] = *v;
            }
        }
    }
    img
}

fn dist_to_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (px - (ax + t * dx)).hypot(py - (ay + t * dy))
}
