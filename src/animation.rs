//! Frame clock and the damped-spring entrance driver.


pub const ENTER_DAMPING: f64 = 200.0;
pub const ENTER_DURATION_FRAMES: f64 = 5.0;

const REST_THRESHOLD: f64 = 0.005;
const REST_CONFIRM_FRAMES: u32 = 20;
const MAX_STEP_MS: f64 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    pub fps: u32,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self { fps }
    }

    pub fn elapsed_ms(&self, frame: u32) -> f64 {
        f64::from(frame) / f64::from(self.fps) * 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub damping: f64,
    pub mass: f64,
    pub stiffness: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 10.0,
            mass: 1.0,
            stiffness: 100.0,
        }
    }
}

impl SpringConfig {
    pub fn with_damping(damping: f64) -> Self {
        Self {
            damping,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SpringState {
    last_timestamp_ms: f64,
    current: f64,
    velocity: f64,
}

impl SpringState {
    const REST: Self = Self {
        last_timestamp_ms: 0.0,
        current: 0.0,
        velocity: 0.0,
    };

    /// Closed-form step of a spring pulling `current` toward 1.
    fn advance(self, now_ms: f64, config: SpringConfig) -> Self {
        let delta_ms = (now_ms - self.last_timestamp_ms).min(MAX_STEP_MS);
        let c = config.damping;
        let m = config.mass;
        let k = config.stiffness;

        let v0 = -self.velocity;
        let x0 = 1.0 - self.current;
        let zeta = c / (2.0 * (k * m).sqrt());
        let omega0 = (k / m).sqrt();
        let t = delta_ms / 1000.0;

        let (current, velocity) = if zeta < 1.0 {
            let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
            let sin1 = (omega1 * t).sin();
            let cos1 = (omega1 * t).cos();
            let envelope = (-zeta * omega0 * t).exp();
            let frag = envelope * (sin1 * ((v0 + zeta * omega0 * x0) / omega1) + x0 * cos1);
            let velocity = zeta * omega0 * frag
                - envelope * (cos1 * (v0 + zeta * omega0 * x0) - omega1 * x0 * sin1);
            (1.0 - frag, velocity)
        } else {
            let envelope = (-omega0 * t).exp();
            let position = 1.0 - envelope * (x0 + (v0 + omega0 * x0) * t);
            let velocity = envelope * (v0 * (t * omega0 - 1.0) + t * x0 * omega0 * omega0);
            (position, velocity)
        };

        Self {
            last_timestamp_ms: now_ms,
            current,
            velocity,
        }
    }
}

/// Value of an untimed spring from 0 to 1 at a (possibly fractional) frame,
/// stepped once per frame like the host compositor does.
pub fn spring_value(frame: f64, fps: u32, config: SpringConfig) -> f64 {
    let frame = frame.max(0.0);
    let whole = frame.floor();
    let remainder = frame - whole;
    let fps = f64::from(fps);

    let mut state = SpringState::REST;
    let mut step = 0.0;
    while step <= whole {
        let at = if step == whole { step + remainder } else { step };
        state = state.advance(at / fps * 1000.0, config);
        step += 1.0;
    }
    state.current
}

/// Frames the spring needs before it stays within the rest threshold.
pub fn natural_duration_frames(fps: u32, config: SpringConfig) -> u32 {
    let distance = |frame: u32| (spring_value(f64::from(frame), fps, config) - 1.0).abs();

    let mut frame = 0;
    while distance(frame) >= REST_THRESHOLD {
        frame += 1;
    }

    let mut finished = frame;
    let mut settled_for = 0;
    while settled_for < REST_CONFIRM_FRAMES {
        frame += 1;
        if distance(frame) >= REST_THRESHOLD {
            settled_for = 0;
            finished = frame + 1;
        } else {
            settled_for += 1;
        }
    }
    finished
}

/// Spring stretched to finish in `duration_frames`; past that it reads exactly 1.
pub fn timed_spring(frame: f64, fps: u32, config: SpringConfig, duration_frames: f64) -> f64 {
    if frame > duration_frames {
        return 1.0;
    }
    let natural = f64::from(natural_duration_frames(fps, config));
    spring_value(frame / (duration_frames / natural), fps, config)
}

/// Pop-in progress for a page shown `frame` frames ago.
pub fn enter_progress(frame: u32, fps: u32) -> f64 {
    timed_spring(
        f64::from(frame),
        fps,
        SpringConfig::with_damping(ENTER_DAMPING),
        ENTER_DURATION_FRAMES,
    )
}

/// Linear remap of `progress` from [0, 1] onto [from, to], clamped at both ends.
pub fn lerp_clamped(progress: f64, from: f64, to: f64) -> f64 {
    let t = progress.clamp(0.0, 1.0);
    from + (to - from) * t
}
