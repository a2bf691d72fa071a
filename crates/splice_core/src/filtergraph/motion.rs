//! Rectangular perimeter motion for the moving logo.
//!
//! One cycle has four equal phases: along the top edge to the right, down the
//! right edge, back along the bottom edge, up the left edge. Position is
//! linear within a phase.

/// Cycles at or below this length leave the logo static at the origin.
pub const MIN_ANIMATED_CYCLE: f64 = 0.5;

/// Multiplier applied to the configured blur intensity.
pub const BLUR_SCALE: f64 = 5.0;

const MIN_TOTAL: f64 = 0.1;
const MIN_PHASE: f64 = 1e-6;
const SPEED_EPSILON: f64 = 1e-6;

const TRAVEL_X: &str = "(W-overlay_w)";
const TRAVEL_Y: &str = "(H-overlay_h)";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPath {
    cycle: f64,
}

impl MotionPath {
    /// Path completing `speed` laps over `total_duration` seconds.
    ///
    /// Non-positive or non-finite speeds are treated as 1.0.
    pub fn rectangular(total_duration: f64, speed: f64) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            1.0
        };
        Self {
            cycle: total_duration.max(MIN_TOTAL) / speed,
        }
    }

    pub fn cycle(&self) -> f64 {
        self.cycle
    }

    pub fn is_animated(&self) -> bool {
        self.cycle > MIN_ANIMATED_CYCLE
    }

    fn phase(&self) -> f64 {
        (self.cycle / 4.0).max(MIN_PHASE)
    }

    fn breakpoints(&self) -> [f64; 3] {
        [self.cycle / 4.0, self.cycle / 2.0, 3.0 * self.cycle / 4.0]
    }

    fn time_in_cycle(&self) -> String {
        format!("mod(t,{:.6})", self.cycle)
    }

    /// Overlay `x` expression.
    pub fn x_expr(&self) -> String {
        if !self.is_animated() {
            return "0".to_string();
        }
        let tv = self.time_in_cycle();
        let seg = self.phase();
        let [_, t2, _] = self.breakpoints();
        self.piecewise([
            format!("{TRAVEL_X}*({tv}/{seg:.6})"),
            TRAVEL_X.to_string(),
            format!("{TRAVEL_X}*(1-(({tv}-{t2:.6})/{seg:.6}))"),
            "0".to_string(),
        ])
    }

    /// Overlay `y` expression.
    pub fn y_expr(&self) -> String {
        if !self.is_animated() {
            return "0".to_string();
        }
        let tv = self.time_in_cycle();
        let seg = self.phase();
        let [t1, _, t3] = self.breakpoints();
        self.piecewise([
            "0".to_string(),
            format!("{TRAVEL_Y}*(({tv}-{t1:.6})/{seg:.6})"),
            TRAVEL_Y.to_string(),
            format!("{TRAVEL_Y}*(1-(({tv}-{t3:.6})/{seg:.6}))"),
        ])
    }

    fn piecewise(&self, [p1, p2, p3, p4]: [String; 4]) -> String {
        let tv = self.time_in_cycle();
        let [t1, t2, t3] = self.breakpoints();
        format!(
            "if(lt({tv},{t1:.6}),{p1},if(lt({tv},{t2:.6}),{p2},if(lt({tv},{t3:.6}),{p3},{p4})))"
        )
    }

    /// Position at time `t` as fractions of the travel range, matching the expressions.
    pub fn normalized_position(&self, t: f64) -> (f64, f64) {
        if !self.is_animated() {
            return (0.0, 0.0);
        }
        let tv = t.rem_euclid(self.cycle);
        let seg = self.phase();
        let [t1, t2, t3] = self.breakpoints();
        if tv < t1 {
            (tv / seg, 0.0)
        } else if tv < t2 {
            (1.0, (tv - t1) / seg)
        } else if tv < t3 {
            (1.0 - (tv - t2) / seg, 1.0)
        } else {
            (0.0, 1.0 - (tv - t3) / seg)
        }
    }

    /// Frame count for the temporal blur.
    ///
    /// Scales with intensity and frame rate, inversely with on-screen speed
    /// (larger frame dimension covered in half a cycle). Static paths get 1.
    pub fn blur_frames(&self, intensity: f64, fps: f64, width: u32, height: u32) -> u32 {
        if !self.is_animated() || fps <= 0.0 {
            return 1;
        }
        let pixels_per_second = f64::from(width.max(height)) / (self.cycle / 2.0);
        let frames = intensity * BLUR_SCALE * fps / pixels_per_second.max(SPEED_EPSILON);
        let rounded = frames.round();
        if rounded.is_finite() && rounded > 1.0 {
            rounded.min(f64::from(u32::MAX)) as u32
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_divides_duration_by_speed() {
        assert_eq!(MotionPath::rectangular(100.0, 2.0).cycle(), 50.0);
        assert_eq!(MotionPath::rectangular(100.0, 0.0).cycle(), 100.0);
        assert_eq!(MotionPath::rectangular(100.0, -3.0).cycle(), 100.0);
        assert_eq!(MotionPath::rectangular(100.0, f64::NAN).cycle(), 100.0);
        assert_eq!(MotionPath::rectangular(0.0, 1.0).cycle(), 0.1);
    }

    #[test]
    fn short_cycle_is_static() {
        let path = MotionPath::rectangular(1.0, 2.0);
        assert!(!path.is_animated());
        assert_eq!(path.x_expr(), "0");
        assert_eq!(path.y_expr(), "0");
        assert_eq!(path.blur_frames(10.0, 25.0, 1920, 1080), 1);
    }

    #[test]
    fn expressions_have_nested_phases() {
        let path = MotionPath::rectangular(40.0, 1.0);
        assert_eq!(
            path.x_expr(),
            "if(lt(mod(t,40.000000),10.000000),(W-overlay_w)*(mod(t,40.000000)/10.000000),\
             if(lt(mod(t,40.000000),20.000000),(W-overlay_w),\
             if(lt(mod(t,40.000000),30.000000),(W-overlay_w)*(1-((mod(t,40.000000)-20.000000)/10.000000)),0)))"
        );
        assert_eq!(
            path.y_expr(),
            "if(lt(mod(t,40.000000),10.000000),0,\
             if(lt(mod(t,40.000000),20.000000),(H-overlay_h)*((mod(t,40.000000)-10.000000)/10.000000),\
             if(lt(mod(t,40.000000),30.000000),(H-overlay_h),(H-overlay_h)*(1-((mod(t,40.000000)-30.000000)/10.000000)))))"
        );
    }

    #[test]
    fn path_visits_corners_in_order() {
        let path = MotionPath::rectangular(40.0, 1.0);
        assert_eq!(path.normalized_position(0.0), (0.0, 0.0));
        assert_eq!(path.normalized_position(5.0), (0.5, 0.0));
        assert_eq!(path.normalized_position(10.0), (1.0, 0.0));
        assert_eq!(path.normalized_position(20.0), (1.0, 1.0));
        assert_eq!(path.normalized_position(30.0), (0.0, 1.0));
        assert_eq!(path.normalized_position(35.0), (0.0, 0.5));
        assert_eq!(path.normalized_position(40.0), (0.0, 0.0));
    }

    #[test]
    fn blur_scales_with_intensity_and_speed() {
        // 1920 px in 10 s → 192 px/s; 1.0 * 5 * 25 / 192 ≈ 0.65 → no blur
        let slow = MotionPath::rectangular(20.0, 1.0);
        assert_eq!(slow.blur_frames(1.0, 25.0, 1920, 1080), 1);

        // 4.0 * 5 * 25 / 192 ≈ 2.6 → 3 frames
        assert_eq!(slow.blur_frames(4.0, 25.0, 1920, 1080), 3);

        // Faster path means fewer frames for the same intensity
        let fast = MotionPath::rectangular(2.0, 1.0);
        assert_eq!(fast.blur_frames(4.0, 25.0, 1920, 1080), 1);
    }
}
