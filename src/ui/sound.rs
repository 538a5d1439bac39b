/// Sound engine: procedural sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_gem: Arc<Vec<u8>>,
        sfx_exit_open: Arc<Vec<u8>>,
        sfx_push: Arc<Vec<u8>>,
        sfx_crush: Arc<Vec<u8>>,
        sfx_level: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_gem: Arc::new(make_wav(&gen_gem())),
                sfx_exit_open: Arc::new(make_wav(&gen_exit_open())),
                sfx_push: Arc::new(make_wav(&gen_push())),
                sfx_crush: Arc::new(make_wav(&gen_crush())),
                sfx_level: Arc::new(make_wav(&gen_level())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_gem(&self) { self.play(&self.sfx_gem); }
        pub fn play_exit_open(&self) { self.play(&self.sfx_exit_open); }
        pub fn play_push(&self) { self.play(&self.sfx_push); }
        pub fn play_crush(&self) { self.play(&self.sfx_crush); }
        pub fn play_level(&self) { self.play(&self.sfx_level); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Notes played back to back, each with a decaying envelope.
    /// `harmonics` are (multiple, weight) pairs added to the fundamental.
    fn gen_notes(notes: &[(f32, f32)], harmonics: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let mut wave = (t * freq * TAU).sin();
                for &(mult, weight) in harmonics {
                    wave += (t * freq * mult * TAU).sin() * weight;
                }
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Gem: bright two-note ping
    fn gen_gem() -> Vec<f32> {
        gen_notes(&[(1568.0, 0.04), (2093.0, 0.07)], &[(3.0, 0.3)], 0.2)
    }

    /// Exit open: rising four-note chime
    fn gen_exit_open() -> Vec<f32> {
        gen_notes(
            &[(523.0, 0.07), (659.0, 0.07), (784.0, 0.07), (1047.0, 0.2)],
            &[(2.0, 0.3)],
            0.25,
        )
    }

    /// Push: low thud
    fn gen_push() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.08) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 140.0 - t * 60.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                (ti * freq * TAU).sin() * (1.0 - t).powf(1.5) * 0.35
            })
            .collect()
    }

    /// Crush: noise burst over a falling rumble
    fn gen_crush() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.45) as usize;
        let mut rng: u32 = 0x5eed;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 180.0 - t * 130.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let rumble = (ti * freq * TAU).sin();
                // LCG noise
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(1.2);
                (rumble * 0.5 + noise * 0.5) * env * 0.35
            })
            .collect()
    }

    /// Level advance: fanfare with a held final note
    fn gen_level() -> Vec<f32> {
        gen_notes(
            &[(392.0, 0.09), (523.0, 0.09), (659.0, 0.09), (784.0, 0.09), (1047.0, 0.3)],
            &[(2.0, 0.3), (3.0, 0.1)],
            0.25,
        )
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&gen_gem());
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
            assert_eq!(wav.len(), 44 + data_size as usize);
        }

        #[test]
        fn generated_samples_stay_in_range() {
            for samples in [gen_gem(), gen_exit_open(), gen_push(), gen_crush(), gen_level()] {
                assert!(!samples.is_empty());
                assert!(samples.iter().all(|s| s.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_gem(&self) {}
    pub fn play_exit_open(&self) {}
    pub fn play_push(&self) {}
    pub fn play_crush(&self) {}
    pub fn play_level(&self) {}
}
