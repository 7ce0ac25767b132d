// Simulcast layers, lowest first.
pub const SIMULCAST_MAX_BITRATES_BPS: [u32; 3] = [100_000, 300_000, 900_000];
pub const SIMULCAST_SCALE_DOWN: [f64; 3] = [4.0, 2.0, 1.0];
pub const SIMULCAST_SCALABILITY_MODE: &str = "L1T3";

// Quality buckets
pub const EXCELLENT_RTT_MS: f64 = 150.0;
pub const EXCELLENT_LOSS: f64 = 0.01;
pub const GOOD_RTT_MS: f64 = 300.0;
pub const GOOD_LOSS: f64 = 0.05;

/// appData tag carried by the screen-share producer.
pub const SCREEN_SOURCE: &str = "screen";
