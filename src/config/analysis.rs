//! Analysis parameters shared by the batch pipeline and the HTTP server

/// Tunable constants for feature extraction and structure analysis
///
/// `Default` holds the calibrated values; the CLI only exposes the
/// structure knobs a DJ is likely to adjust.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// STFT hop in samples; also the frame step of chroma and RMS
    pub hop_length: usize,
    /// STFT window size in samples
    pub n_fft: usize,
    /// RMS frame size in samples
    pub rms_frame_length: usize,
    /// Upper edge of the bass sub-band in Hz (exclusive)
    pub bass_cutoff_hz: f64,
    /// Median-filter span in seconds
    pub smoothing_secs: f64,
    /// Spacing of segment samples in seconds
    pub segment_interval_secs: f64,
    /// Minimum absolute frame-to-frame jump in normalized bass for a mix point
    pub jump_threshold: f64,
    /// Minimum gap between reported mix points in seconds
    pub debounce_secs: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hop_length: 512,
            n_fft: 2048,
            rms_frame_length: 2048,
            bass_cutoff_hz: 200.0,
            smoothing_secs: 1.0,
            segment_interval_secs: 5.0,
            jump_threshold: 0.3,
            debounce_secs: 10.0,
        }
    }
}

impl AnalysisConfig {
    /// Reject values that would make the analysis meaningless
    pub fn validate(&self) -> Result<(), String> {
        if self.hop_length == 0 {
            return Err("hop length must be greater than zero".to_string());
        }
        if self.n_fft < 2 || self.rms_frame_length == 0 {
            return Err("FFT and RMS frame sizes must be positive".to_string());
        }
        if !(self.segment_interval_secs > 0.0) {
            return Err(format!(
                "segment interval must be positive, got {}",
                self.segment_interval_secs
            ));
        }
        if !(self.jump_threshold >= 0.0) || !(self.debounce_secs >= 0.0) {
            return Err("jump threshold and debounce must be non-negative".to_string());
        }
        if !(self.smoothing_secs > 0.0) || !(self.bass_cutoff_hz > 0.0) {
            return Err("smoothing span and bass cutoff must be positive".to_string());
        }
        Ok(())
    }
}
