use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

pub const EARTH_GRAVITY_MPS2: f64 = 9.81;
pub const PREDICTION_SAMPLES: usize = 200;

/// Lower bound on the sampled flight time so near-flat launches still get a
/// few preview points before the ground cut.
const MIN_PREDICTION_TIME_S: f64 = 0.01;

/// (x, y) in meters, origin at the launch point, y up.
pub type WorldPoint = (f64, f64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Mercury,
    Venus,
    Earth,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    pub const ALL: [Planet; 10] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Earth,
        Planet::Moon,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    pub fn gravity_mps2(self) -> f64 {
        match self {
            Planet::Mercury => 3.7,
            Planet::Venus => 8.87,
            Planet::Earth => EARTH_GRAVITY_MPS2,
            Planet::Moon => 1.62,
            Planet::Mars => 3.71,
            Planet::Jupiter => 24.79,
            Planet::Saturn => 10.44,
            Planet::Uranus => 8.69,
            Planet::Neptune => 11.15,
            Planet::Pluto => 0.62,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Earth => "Earth",
            Planet::Moon => "Moon",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|planet| planet.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl Default for Planet {
    fn default() -> Self {
        Planet::Earth
    }
}

/// Where the gravitational acceleration comes from: a named body or a value
/// typed in by the user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GravitySetting {
    Preset(Planet),
    Custom(f64),
}

impl GravitySetting {
    /// Custom values pass through untouched; a bad one must block the launch
    /// rather than be swapped for Earth gravity.
    pub fn resolve(self) -> f64 {
        match self {
            GravitySetting::Preset(planet) => planet.gravity_mps2(),
            GravitySetting::Custom(value) => value,
        }
    }

    pub fn label(self) -> String {
        match self {
            GravitySetting::Preset(planet) => planet.name().to_string(),
            GravitySetting::Custom(_) => "Custom".to_string(),
        }
    }
}

impl Default for GravitySetting {
    fn default() -> Self {
        GravitySetting::Preset(Planet::Earth)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub angle_rad: f64,
    pub speed_mps: f64,
    pub mass_kg: f64,
    pub gravity_mps2: f64,
}

impl LaunchParams {
    pub fn from_degrees(angle_deg: f64, speed_mps: f64, mass_kg: f64, gravity_mps2: f64) -> Self {
        Self {
            angle_rad: angle_deg.to_radians(),
            speed_mps,
            mass_kg,
            gravity_mps2,
        }
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_rad.to_degrees()
    }

    pub fn is_valid(&self) -> bool {
        self.angle_rad.is_finite()
            && self.speed_mps.is_finite()
            && self.mass_kg.is_finite()
            && self.gravity_mps2.is_finite()
            && self.angle_rad > 0.0
            // Degree round trips can land a hair above pi/2.
            && self.angle_rad <= FRAC_PI_2 + 1e-12
            && self.speed_mps > 0.0
            && self.mass_kg > 0.0
            && self.gravity_mps2 > 0.0
    }

    pub fn velocity_components(&self) -> (f64, f64) {
        velocity_components(self.speed_mps, self.angle_rad)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub time_of_flight_s: f64,
    pub max_height_m: f64,
    pub range_m: f64,
}

impl Analytics {
    pub fn is_valid(&self) -> bool {
        self.time_of_flight_s.is_finite() && self.max_height_m.is_finite() && self.range_m.is_finite()
    }
}

/// One instant of a live flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightSample {
    pub elapsed_s: f64,
    pub position: WorldPoint,
    pub velocity: (f64, f64),
    pub landed: bool,
}

pub fn velocity_components(speed_mps: f64, angle_rad: f64) -> (f64, f64) {
    (speed_mps * angle_rad.cos(), speed_mps * angle_rad.sin())
}

pub fn trajectory_at_time(speed_mps: f64, angle_rad: f64, gravity_mps2: f64, time_s: f64) -> WorldPoint {
    let (vx, vy) = velocity_components(speed_mps, angle_rad);
    let x = vx * time_s;
    let y = (vy * time_s) - (0.5 * gravity_mps2 * time_s * time_s);
    (x, y)
}

/// Closed-form flight from ground level. Gravity that is not strictly
/// positive yields infinite values; callers check `Analytics::is_valid`.
pub fn compute_analytics(speed_mps: f64, angle_rad: f64, gravity_mps2: f64) -> Analytics {
    if gravity_mps2.is_nan() || gravity_mps2 <= 0.0 {
        return Analytics {
            time_of_flight_s: f64::INFINITY,
            max_height_m: f64::INFINITY,
            range_m: f64::INFINITY,
        };
    }

    let (_, vy) = velocity_components(speed_mps, angle_rad);
    let time_of_flight_s = (2.0 * vy) / gravity_mps2;
    let max_height_m = (vy * vy) / (2.0 * gravity_mps2);
    let range_m = (speed_mps * speed_mps * (2.0 * angle_rad).sin()) / gravity_mps2;

    Analytics {
        time_of_flight_s: time_of_flight_s.max(0.0),
        max_height_m: max_height_m.max(0.0),
        range_m: range_m.max(0.0),
    }
}

/// Samples the analytic trajectory uniformly in time. The first sample that
/// dips below ground ends the path without being included.
pub fn predict_path(
    speed_mps: f64,
    angle_rad: f64,
    gravity_mps2: f64,
    sample_count: usize,
) -> Vec<WorldPoint> {
    let analytics = compute_analytics(speed_mps, angle_rad, gravity_mps2);
    if !analytics.is_valid() || !speed_mps.is_finite() || !angle_rad.is_finite() {
        return Vec::new();
    }

    let steps = sample_count.max(1);
    let total_s = analytics.time_of_flight_s.max(MIN_PREDICTION_TIME_S);
    let mut points = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = (i as f64 / steps as f64) * total_s;
        let point = trajectory_at_time(speed_mps, angle_rad, gravity_mps2, t);
        if point.1 < 0.0 && i > 0 {
            break;
        }
        points.push(point);
    }
    points
}

/// Position and velocity at `elapsed_s + dt`, evaluated directly from the
/// closed form so long runs do not accumulate integration error.
pub fn advance(elapsed_s: f64, dt: f64, params: &LaunchParams) -> FlightSample {
    let t = elapsed_s + dt;
    let position = trajectory_at_time(params.speed_mps, params.angle_rad, params.gravity_mps2, t);
    let (vx, vy) = params.velocity_components();
    let velocity = (vx, vy - params.gravity_mps2 * t);
    FlightSample {
        elapsed_s: t,
        position,
        velocity,
        landed: position.1 < 0.0,
    }
}

pub fn kinetic_energy(mass_kg: f64, velocity: (f64, f64)) -> f64 {
    0.5 * mass_kg * (velocity.0 * velocity.0 + velocity.1 * velocity.1)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual={actual}, expected={expected}, tolerance={tolerance}"
        );
    }

    #[test]
    fn computes_known_flight_for_earth_launch() {
        let analytics = compute_analytics(20.0, FRAC_PI_4, 9.81);

        // 2 v sin(theta) / g
        assert_close(analytics.time_of_flight_s, 2.0 * 20.0 * FRAC_PI_4.sin() / 9.81, 1e-12);
        assert_close(analytics.time_of_flight_s, 2.883, 0.001);
        assert_close(analytics.max_height_m, 10.20, 0.01);
        assert_close(analytics.range_m, 40.77, 0.01);
    }

    #[test]
    fn range_matches_closed_form_and_peaks_at_forty_five_degrees() {
        let (speed, gravity) = (35.0, 3.71);
        let best = compute_analytics(speed, FRAC_PI_4, gravity).range_m;

        for deg in [5.0f64, 15.0, 30.0, 44.0, 46.0, 60.0, 75.0, 89.0] {
            let theta = deg.to_radians();
            let range = compute_analytics(speed, theta, gravity).range_m;
            assert_close(range, speed * speed * (2.0 * theta).sin() / gravity, 1e-9);
            assert!(range < best, "range at {deg} deg should be below the 45 deg range");
        }
    }

    #[test]
    fn non_positive_gravity_is_marked_non_finite() {
        for gravity in [0.0, -9.81, f64::NAN] {
            let analytics = compute_analytics(20.0, FRAC_PI_4, gravity);
            assert!(!analytics.is_valid());
            assert!(analytics.time_of_flight_s.is_infinite());
        }
        assert!(predict_path(20.0, FRAC_PI_4, 0.0, PREDICTION_SAMPLES).is_empty());
    }

    #[test]
    fn predicted_path_stays_above_ground_with_monotone_x() {
        for deg in [0.5f64, 10.0, 45.0, 80.0, 89.99] {
            let path = predict_path(25.0, deg.to_radians(), 9.81, PREDICTION_SAMPLES);
            assert!(!path.is_empty());
            assert!(path.len() <= PREDICTION_SAMPLES + 1);
            assert_eq!(path[0], (0.0, 0.0));
            for pair in path.windows(2) {
                assert!(pair[1].0 >= pair[0].0);
            }
            let last = path[path.len() - 1];
            assert!(last.1 >= -1e-9, "last point {last:?} at {deg} deg");
        }
    }

    #[test]
    fn predicted_path_ends_near_the_analytic_range() {
        let path = predict_path(20.0, FRAC_PI_4, 9.81, PREDICTION_SAMPLES);
        let analytics = compute_analytics(20.0, FRAC_PI_4, 9.81);
        let (last_x, _) = path[path.len() - 1];

        assert_close(last_x, analytics.range_m, analytics.range_m / PREDICTION_SAMPLES as f64 + 1e-6);
    }

    #[test]
    fn advance_follows_closed_form_without_drift() {
        let params = LaunchParams::from_degrees(60.0, 30.0, 2.0, 1.62);
        let mut elapsed = 0.0;
        for _ in 0..1000 {
            elapsed = advance(elapsed, 0.016, &params).elapsed_s;
        }
        let sample = advance(elapsed, 0.0, &params);
        let expected = trajectory_at_time(30.0, 60f64.to_radians(), 1.62, 16.0);

        assert_close(sample.elapsed_s, 16.0, 1e-9);
        assert_close(sample.position.0, expected.0, 1e-6);
        assert_close(sample.position.1, expected.1, 1e-6);
    }

    #[test]
    fn advance_reports_landing_below_ground() {
        let params = LaunchParams::from_degrees(45.0, 20.0, 1.0, 9.81);
        let before = advance(2.8, 0.0, &params);
        let after = advance(2.8, 0.1, &params);

        assert!(!before.landed);
        assert!(after.landed);
        assert!(after.velocity.1 < 0.0);
    }

    #[test]
    fn kinetic_energy_is_half_m_v_squared() {
        assert_close(kinetic_energy(2.0, (3.0, 4.0)), 25.0, 1e-12);

        let params = LaunchParams::from_degrees(30.0, 12.0, 1.5, 9.81);
        let launch = advance(0.0, 0.0, &params);
        assert_close(kinetic_energy(params.mass_kg, launch.velocity), 0.5 * 1.5 * 144.0, 1e-9);
    }

    #[test]
    fn validates_launch_parameters() {
        assert!(LaunchParams::from_degrees(45.0, 20.0, 1.0, 9.81).is_valid());
        assert!(LaunchParams::from_degrees(90.0, 20.0, 1.0, 9.81).is_valid());
        assert!(!LaunchParams::from_degrees(45.0, 0.0, 1.0, 9.81).is_valid());
        assert!(!LaunchParams::from_degrees(45.0, 20.0, 1.0, 0.0).is_valid());
        assert!(!LaunchParams::from_degrees(45.0, 20.0, 1.0, -3.0).is_valid());
        assert!(!LaunchParams::from_degrees(0.0, 20.0, 1.0, 9.81).is_valid());
        assert!(!LaunchParams::from_degrees(45.0, f64::NAN, 1.0, 9.81).is_valid());
        assert!(!LaunchParams {
            angle_rad: FRAC_PI_2 + 0.1,
            speed_mps: 20.0,
            mass_kg: 1.0,
            gravity_mps2: 9.81,
        }
        .is_valid());
    }

    #[test]
    fn planet_table_and_custom_gravity() {
        assert_close(Planet::Jupiter.gravity_mps2(), 24.79, 1e-12);
        assert_close(Planet::Pluto.gravity_mps2(), 0.62, 1e-12);
        assert_eq!(Planet::from_name(" mars "), Some(Planet::Mars));
        assert_eq!(Planet::from_name("Vulcan"), None);
        assert_close(GravitySetting::Preset(Planet::Moon).resolve(), 1.62, 1e-12);
        assert_close(GravitySetting::Custom(-2.0).resolve(), -2.0, 1e-12);
        assert_eq!(GravitySetting::Custom(4.0).label(), "Custom");
    }
}
