//! Configuration constants for the quiz engine
//!
//! This module contains the limits, default timings, storage keys and
//! animation parameters used throughout the crate so that every component
//! agrees on the same boundaries.

/// Question and attempt limits
pub mod quiz {
    /// Upper bound accepted for a configured question cap
    pub const MAX_QUESTIONS: usize = 1000;
    /// Default number of wrong guesses allowed before the answer is revealed
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Upper bound accepted for a configured attempt budget
    pub const MAX_ATTEMPTS: u32 = 10;
    /// Maximum length of a quiz title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum length of a quiz description in characters
    pub const MAX_DESCRIPTION_LENGTH: usize = 500;
}

/// Feedback and sequencing delays, in milliseconds
pub mod timing {
    /// Hold after a correct answer before the next question
    pub const SUCCESS_HOLD: u64 = 2000;
    /// Hold after a correct answer on a marker quiz (tooltip stays longer)
    pub const POINT_SUCCESS_HOLD: u64 = 2500;
    /// Delay between running out of attempts and requiring the correct click
    pub const REVEAL_DELAY: u64 = 3000;
    /// Reveal delay on a marker quiz
    pub const POINT_REVEAL_DELAY: u64 = 2000;
    /// Period of the flashing animation during a reveal
    pub const FLASH_INTERVAL: u64 = 250;
    /// How long a wrong guess stays styled as wrong
    pub const WRONG_FEEDBACK: u64 = 2000;
    /// How long a wrong guess stays styled as wrong during a forced reveal
    pub const FORCED_WRONG_FEEDBACK: u64 = 1200;
    /// Lifetime of transient tooltips
    pub const TOOLTIP: u64 = 1200;
    /// Period of the elapsed-time display
    pub const TIMER_INTERVAL: u64 = 1000;

    /// Lower bound for any configured feedback delay
    pub const MIN_DELAY: u64 = 0;
    /// Upper bound for any configured feedback delay
    pub const MAX_DELAY: u64 = 10_000;
    /// Lower bound for the flash and timer periods
    pub const MIN_PERIOD: u64 = 50;
}

/// Durable and session storage keys
pub mod storage {
    /// Key of the JSON blob holding every quiz's progress record
    pub const PROGRESS_KEY: &str = "geo_quiz_status";
    /// Prefix of the session key holding wrongly answered question names
    pub const RETEST_KEY_PREFIX: &str = "geo_retest_wrong:";
    /// Query parameter that switches a quiz into retest mode
    pub const RETEST_PARAM: &str = "retest";
    /// Value of [`RETEST_PARAM`] that selects wrong answers only
    pub const RETEST_VALUE: &str = "wrong";
    /// Query parameter selecting a registry entry
    pub const QUIZ_ID_PARAM: &str = "id";
}

/// Ripple and celebration animation parameters
pub mod effects {
    /// Number of concentric ripples
    pub const RIPPLE_COUNT: usize = 4;
    /// Delay between consecutive ripples in milliseconds
    pub const RIPPLE_STAGGER: u64 = 180;
    /// Frames per ripple
    pub const RIPPLE_FRAMES: u32 = 34;
    /// Milliseconds between ripple frames
    pub const RIPPLE_FRAME_INTERVAL: u64 = 30;
    /// Starting radius of a ripple in pixels
    pub const RIPPLE_START_RADIUS: f64 = 10.;
    /// Radius a ripple grows by over its lifetime
    pub const RIPPLE_GROWTH: f64 = 85.;
    /// Default ripple color
    pub const RIPPLE_COLOR: &str = "#2a7fff";

    /// Number of celebration particles
    pub const PARTICLE_COUNT: usize = 20;
    /// Frames per particle
    pub const PARTICLE_FRAMES: u32 = 30;
    /// Milliseconds between particle frames
    pub const PARTICLE_FRAME_INTERVAL: u64 = 20;
    /// Starting radius of a particle in pixels
    pub const PARTICLE_RADIUS: f64 = 4.;
    /// Degrees travelled per frame per unit of velocity
    pub const PARTICLE_STEP: f64 = 0.0005;
    /// Default particle palette
    pub const PARTICLE_COLORS: [&str; 6] = [
        "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff",
    ];
}
