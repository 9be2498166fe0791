/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_complete: Arc<Vec<u8>>,
        sfx_fanfare: Arc<Vec<u8>>,
        sfx_error: Arc<Vec<u8>>,
        sfx_konami: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_complete: Arc::new(make_wav(&gen_complete())),
                sfx_fanfare: Arc::new(make_wav(&gen_fanfare())),
                sfx_error: Arc::new(make_wav(&gen_error())),
                sfx_konami: Arc::new(make_wav(&gen_konami())),
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

        pub fn play_complete(&self) { self.play(&self.sfx_complete); }
        pub fn play_fanfare(&self) { self.play(&self.sfx_fanfare); }
        pub fn play_error(&self) { self.play(&self.sfx_error); }
        pub fn play_konami(&self) { self.play(&self.sfx_konami); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Render a note sequence: (frequency Hz, duration s) pairs with a
    /// soft square-ish timbre (sine + octave + 3rd harmonic).
    fn gen_notes(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.6
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.1;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Challenge complete: quick ascending arpeggio C6→E6→G6
    fn gen_complete() -> Vec<f32> {
        gen_notes(&[(1047.0, 0.05), (1319.0, 0.05), (1568.0, 0.09)], 0.25)
    }

    /// All challenges complete: victory fanfare with a sustained top note
    fn gen_fanfare() -> Vec<f32> {
        gen_notes(
            &[
                (523.0, 0.1), (659.0, 0.1), (784.0, 0.1),
                (1047.0, 0.12), (784.0, 0.08), (1047.0, 0.3),
            ],
            0.3,
        )
    }

    /// Bad command: low two-tone buzz
    fn gen_error() -> Vec<f32> {
        gen_notes(&[(220.0, 0.08), (185.0, 0.14)], 0.3)
    }

    /// Cheat code accepted: the little jingle it deserves
    fn gen_konami() -> Vec<f32> {
        gen_notes(
            &[
                (659.0, 0.07), (659.0, 0.07), (784.0, 0.07),
                (659.0, 0.07), (880.0, 0.07), (1047.0, 0.16),
            ],
            0.28,
        )
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let clamped = s.max(-1.0).min(1.0);
            let val = (clamped * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_complete(&self) {}
    pub fn play_fanfare(&self) {}
    pub fn play_error(&self) {}
    pub fn play_konami(&self) {}
}
