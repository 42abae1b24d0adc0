//! MP3 → WAV conversion for the dataset's audio directory. Decoded with
//! symphonia, written as 16-bit PCM with hound, keeping the source sample
//! rate and channel count. Conversion failures are per-file: the partial
//! WAV is removed and the run continues.

use anyhow::{anyhow, bail, Context, Result};
use glob::glob;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::{
    fs,
    path::{Path, PathBuf},
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as DecodeError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{error, info, warn};

/// Outcome counts for one conversion run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub converted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ConversionSummary {
    pub fn total(&self) -> usize {
        self.converted + self.failed + self.skipped
    }
}

/// Convert every `*.mp3` directly inside `audio_dir` to WAV files in an
/// `audio_dir/wav/` subdirectory, in sorted filename order. Files whose WAV
/// already exists are skipped unless `force` is set.
pub fn convert_all(audio_dir: &Path, force: bool) -> Result<ConversionSummary> {
    if !audio_dir.is_dir() {
        bail!("audio directory not found: {}", audio_dir.display());
    }
    let wav_dir = audio_dir.join("wav");
    fs::create_dir_all(&wav_dir)
        .with_context(|| format!("creating {}", wav_dir.display()))?;

    let pattern = format!("{}/*.mp3", audio_dir.display());
    let mut mp3s: Vec<PathBuf> = Vec::new();
    if let Ok(entries) = glob(&pattern) {
        for entry in entries {
            match entry {
                Ok(p) if p.is_file() => mp3s.push(p),
                Ok(_) => {}
                Err(e) => warn!("cannot read glob entry: {:?}", e),
            }
        }
    }
    mp3s.sort();

    let mut summary = ConversionSummary::default();
    if mp3s.is_empty() {
        info!("no MP3 files found in {}", audio_dir.display());
        return Ok(summary);
    }
    info!("found {} MP3 files to convert", mp3s.len());
    if force {
        info!("force mode: existing WAV files will be overwritten");
    }

    for mp3 in &mp3s {
        let stem = mp3
            .file_stem()
            .ok_or_else(|| anyhow!("no file stem in {}", mp3.display()))?;
        let wav_path = wav_dir.join(Path::new(stem).with_extension("wav"));

        if wav_path.exists() && !force {
            info!("skipped (already exists): {}", wav_path.display());
            summary.skipped += 1;
            continue;
        }

        match convert_file(mp3, &wav_path) {
            Ok((seconds, sample_rate)) => {
                info!(
                    "converted {} ({:.2}s @ {}Hz)",
                    mp3.display(),
                    seconds,
                    sample_rate
                );
                summary.converted += 1;
            }
            Err(e) => {
                error!("failed to convert {}: {:#}", mp3.display(), e);
                if wav_path.exists() {
                    if let Err(rm) = fs::remove_file(&wav_path) {
                        warn!("could not remove partial {}: {}", wav_path.display(), rm);
                    }
                }
                summary.failed += 1;
            }
        }
    }

    info!(
        "conversion complete: {} converted, {} failed, {} skipped ({} total)",
        summary.converted,
        summary.failed,
        summary.skipped,
        summary.total()
    );
    Ok(summary)
}

/// Decode one MP3 and write it as 16-bit PCM WAV. Returns the decoded
/// duration in seconds and the sample rate.
fn convert_file(mp3_path: &Path, wav_path: &Path) -> Result<(f64, u32)> {
    let (samples, sample_rate, channels) = decode(mp3_path)?;
    if samples.is_empty() {
        bail!("decoded zero samples");
    }

    let spec = WavSpec {
        channels: channels as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(wav_path, spec)
        .with_context(|| format!("creating {}", wav_path.display()))?;
    for s in &samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v)?;
    }
    writer.finalize().context("finalizing WAV")?;

    let seconds = samples.len() as f64 / (sample_rate as f64 * channels as f64);
    Ok((seconds, sample_rate))
}

/// Decode an audio file into interleaved f32 samples.
fn decode(path: &Path) -> Result<(Vec<f32>, u32, usize)> {
    let src = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("probing container format")?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| anyhow!("no default audio track"))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| anyhow!("unknown sample rate"))?;
    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| anyhow!("unknown channel count"))?
        .count();

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("creating decoder")?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(DecodeError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e).context("reading packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            // Corrupt frames are tolerated; the stream may recover.
            Err(DecodeError::DecodeError(_)) | Err(DecodeError::IoError(_)) => continue,
            Err(e) => return Err(e).context("decoding packet"),
        }
    }

    Ok((samples, sample_rate, channels))
}
