use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Gate for opening a drag session: the pointer must travel a minimum
/// distance from its press origin before a press becomes a drag, so
/// plain clicks never open sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationThreshold {
    origin: Point,
    distance: f64,
}

impl ActivationThreshold {
    pub fn new(origin: Point, distance: f64) -> Self {
        Self { origin, distance }
    }

    pub fn exceeded(&self, current: Point) -> bool {
        self.origin.distance_sq(current) >= self.distance * self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.9, 9.9)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
        assert!(!rect.contains(Point::new(-0.1, 5.0)));
    }

    #[test]
    fn test_activation_threshold_boundary() {
        let activation = ActivationThreshold::new(Point::new(0.0, 0.0), 8.0);
        assert!(!activation.exceeded(Point::new(7.9, 0.0)));
        assert!(activation.exceeded(Point::new(8.0, 0.0)));
        assert!(activation.exceeded(Point::new(6.0, 6.0)));
    }

    #[test]
    fn test_center() {
        let rect = Rect::new(10.0, 20.0, 4.0, 6.0);
        assert_eq!(rect.center(), Point::new(12.0, 23.0));
    }
}
