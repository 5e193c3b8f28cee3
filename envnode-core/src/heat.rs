//! Apparent temperature from air temperature and humidity
//!
//! Uses the NWS formulation: Steadman's simple average below 80 °F and the
//! Rothfusz regression with its two humidity corrections above it. Inputs and
//! output are Celsius; the regression itself is defined in Fahrenheit.

fn c_to_f(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

fn f_to_c(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 0.555_555_6
}

/// Heat index (°C) for `celsius` at `humidity` %RH
pub fn heat_index(celsius: f32, humidity: f32) -> f32 {
    let t = c_to_f(celsius);
    let rh = humidity;

    let mut hi = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);

    if hi > 79.0 {
        hi = -42.379 + 2.049_015_2 * t + 10.143_331 * rh
            - 0.224_755_41 * t * rh
            - 0.006_837_83 * t * t
            - 0.054_817_17 * rh * rh
            + 0.001_228_74 * t * t * rh
            + 0.000_852_82 * t * rh * rh
            - 0.000_001_99 * t * t * rh * rh;

        if rh < 13.0 && (80.0..=112.0).contains(&t) {
            hi -= ((13.0 - rh) * 0.25) * libm::sqrtf((17.0 - libm::fabsf(t - 95.0)) * 0.058_82);
        } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
            hi += ((rh - 85.0) * 0.1) * ((87.0 - t) * 0.2);
        }
    }

    f_to_c(hi)
}
