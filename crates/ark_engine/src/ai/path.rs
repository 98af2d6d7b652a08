use crate::geometry::Vec2;

pub const MAX_PATH_STEPS: usize = 1000;

/// Integer Bresenham line from `start` to `end` (both rounded), capped at
/// [`MAX_PATH_STEPS`] points, with the exact `end` appended. Obstacles are not considered.
pub fn line_path(start: Vec2, end: Vec2) -> Vec<Vec2> {
    let (mut x, mut y) = (round_coord(start.x), round_coord(start.y));
    let (end_x, end_y) = (round_coord(end.x), round_coord(end.y));

    let dx = (end_x - x).abs();
    let dy = (end_y - y).abs();
    let step_x = if x < end_x { 1 } else { -1 };
    let step_y = if y < end_y { 1 } else { -1 };
    let mut err = dx - dy;

    let mut path = Vec::new();
    while (x != end_x || y != end_y) && path.len() < MAX_PATH_STEPS {
        path.push(Vec2::new(x as f32, y as f32));
        let doubled = err * 2;
        if doubled > -dy {
            err -= dy;
            x += step_x;
        }
        if doubled < dx {
            err += dx;
            y += step_y;
        }
    }
    path.push(end);
    path
}

/// Rounded coordinates are kept within this magnitude so the error terms cannot overflow.
const COORD_LIMIT: f32 = 1_000_000.0;

fn round_coord(value: f32) -> i64 {
    if value.is_finite() {
        value.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_visits_every_pixel_then_destination() {
        let path = line_path(Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0));
        assert_eq!(
            path,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(3.0, 0.0),
            ]
        );
    }

    #[test]
    fn diagonal_moves_both_axes() {
        let path = line_path(Vec2::new(0.0, 0.0), Vec2::new(-2.0, 2.0));
        assert_eq!(path[1], Vec2::new(-1.0, 1.0));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn same_point_yields_only_destination() {
        let end = Vec2::new(10.2, 9.8);
        assert_eq!(line_path(Vec2::new(10.0, 10.0), end), vec![end]);
    }

    #[test]
    fn far_away_destinations_do_not_overflow() {
        let end = Vec2::new(1e30, 0.0);
        let path = line_path(Vec2::new(600.0, 300.0), end);
        assert_eq!(path.len(), MAX_PATH_STEPS + 1);
        assert_eq!(path[1], Vec2::new(601.0, 300.0));
        assert_eq!(path.last(), Some(&end));

        let path = line_path(Vec2::new(-1e30, 1e30), Vec2::ZERO);
        assert_eq!(path.len(), MAX_PATH_STEPS + 1);
    }

    #[test]
    fn long_lines_are_truncated_but_keep_destination() {
        let end = Vec2::new(5000.0, 0.0);
        let path = line_path(Vec2::ZERO, end);
        assert_eq!(path.len(), MAX_PATH_STEPS + 1);
        assert_eq!(path.last(), Some(&end));
    }
}
