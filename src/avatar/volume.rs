//! Volume estimation for lip sync.
//!
//! The animator expects samples on a 0-255 scale: the RMS of a decoded
//! audio frame scaled by 255.

/// RMS of normalized float samples (`-1.0..=1.0`), scaled to 0-255.
pub fn rms_volume(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    ((sum / samples.len() as f64).sqrt() * 255.0) as f32
}

/// Same as [`rms_volume`] for 16-bit PCM.
pub fn rms_volume_i16(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .map(|&s| {
            let x = f64::from(s) / 32768.0;
            x * x
        })
        .sum();
    ((sum / samples.len() as f64).sqrt() * 255.0) as f32
}
