use geo::Point;

/// Single location sample from the positioning source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    /// Position (x = longitude, y = latitude)
    pub position: Point<f64>,
    /// Horizontal accuracy radius in meters, when reported
    pub accuracy_m: Option<f32>,
    pub speed_mps: Option<f32>,
    /// Heading in degrees clockwise from north
    pub bearing_deg: Option<f32>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::at(Point::new(longitude, latitude))
    }

    pub fn at(position: Point<f64>) -> Self {
        Self {
            position,
            accuracy_m: None,
            speed_mps: None,
            bearing_deg: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f32) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    pub fn with_speed(mut self, speed_mps: f32) -> Self {
        self.speed_mps = Some(speed_mps);
        self
    }

    pub fn with_bearing(mut self, bearing_deg: f32) -> Self {
        self.bearing_deg = Some(bearing_deg);
        self
    }

    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    pub fn longitude(&self) -> f64 {
        self.position.x()
    }
}
