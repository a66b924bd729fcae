//! Offline rendering: stream a WAV file through the effect host exactly as
//! a live host would, one frame at a time.

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

use crate::effect::EffectRegistry;
use crate::host::{BLOCK_SIZE, EffectHost};

/// A knob position given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum KnobValue {
    /// Normalised knob position.
    Normalized(f32),
    /// Display text such as `-6 dB`, parsed by the selected effect.
    Text(String),
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub effect: usize,
    /// Knob values applied before rendering, as `(knob, value)`.
    pub knobs: Vec<(usize, KnobValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub effect_name: String,
    pub frames: usize,
    pub sample_rate: u32,
}

pub fn render_file(registry: Arc<EffectRegistry>, options: &RenderOptions) -> Result<RenderSummary> {
    let mut reader = WavReader::open(&options.input)
        .with_context(|| format!("failed to open '{}'", options.input.display()))?;
    let spec = reader.spec();
    if !(1..=2).contains(&spec.channels) {
        bail!(
            "unsupported channel count {} in '{}' (mono or stereo only)",
            spec.channels,
            options.input.display()
        );
    }

    let samples = read_samples(&mut reader)?;
    let frames = split_frames(&samples, spec.channels);
    debug!(
        "Read {} frames at {} Hz from {}",
        frames.len(),
        spec.sample_rate,
        options.input.display()
    );

    let (mut host, handle) = EffectHost::new(registry, options.effect, spec.sample_rate as f32)
        .context("failed to create effect host")?;
    for (knob, value) in &options.knobs {
        let knob = *knob;
        let value = match value {
            KnobValue::Normalized(value) => *value,
            KnobValue::Text(text) => {
                let slot = host.slot();
                if knob >= slot.param_count() {
                    bail!("knob {knob} is not used by '{}'", slot.name());
                }
                slot.unit()
                    .parameter_from_text(knob, text)
                    .with_context(|| {
                        format!("'{text}' is not a valid value for {}", slot.name())
                    })?
            }
        };
        if !handle.set_knob(knob, value) {
            bail!("knob {knob} does not exist");
        }
    }

    let out_spec = WavSpec {
        channels: 2,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&options.output, out_spec)
        .with_context(|| format!("failed to create '{}'", options.output.display()))?;

    // The block adapter delays output by BLOCK_SIZE - 1 frames; pad the tail
    // and skip the head so the result lines up with the input.
    let latency = BLOCK_SIZE - 1;
    let padded = frames
        .iter()
        .copied()
        .chain(std::iter::repeat_n((0.0, 0.0), latency));
    for (n, (left, right)) in padded.enumerate() {
        let (out_l, out_r) = host.process_frame(left, right)?;
        if n >= latency {
            writer.write_sample(out_l)?;
            writer.write_sample(out_r)?;
        }
    }
    writer.finalize().context("failed to finalize output WAV")?;

    let effect_name = handle.slot_info().name.clone();
    info!(
        "Rendered {} frames through '{effect_name}' to {}",
        frames.len(),
        options.output.display()
    );

    Ok(RenderSummary {
        effect_name,
        frames: frames.len(),
        sample_rate: spec.sample_rate,
    })
}

fn read_samples<R: std::io::Read>(reader: &mut WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read float samples")?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
                .context("failed to read integer samples")?
        }
    };
    Ok(samples)
}

fn split_frames(samples: &[f32], channels: u16) -> Vec<(f32, f32)> {
    if channels == 1 {
        samples.iter().map(|&s| (s, s)).collect()
    } else {
        samples
            .chunks_exact(usize::from(channels))
            .map(|frame| (frame[0], frame[1]))
            .collect()
    }
}

/// Parse a `knob=value` argument. Numbers are normalised positions; anything
/// else is kept as display text for the effect to interpret.
pub fn parse_knob(arg: &str) -> Result<(usize, KnobValue)> {
    let (knob, value) = arg
        .split_once('=')
        .with_context(|| format!("expected KNOB=VALUE, got '{arg}'"))?;
    let knob: usize = knob
        .trim()
        .parse()
        .with_context(|| format!("invalid knob index '{knob}'"))?;
    let value = value.trim();
    if value.is_empty() {
        bail!("missing value for knob {knob}");
    }
    let value = value
        .parse::<f32>()
        .map_or_else(|_| KnobValue::Text(value.to_string()), KnobValue::Normalized);
    Ok((knob, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_knob() {
        assert_eq!(parse_knob("0=0.5").unwrap(), (0, KnobValue::Normalized(0.5)));
        assert_eq!(parse_knob(" 3 = 1 ").unwrap(), (3, KnobValue::Normalized(1.0)));
        assert_eq!(
            parse_knob("0=-6 dB").unwrap(),
            (0, KnobValue::Text("-6 dB".to_string()))
        );
        assert!(parse_knob("0").is_err());
        assert!(parse_knob("0= ").is_err());
        assert!(parse_knob("a=0.5").is_err());
    }

    #[test]
    fn test_split_frames_duplicates_mono() {
        assert_eq!(split_frames(&[0.1, 0.2], 1), [(0.1, 0.1), (0.2, 0.2)]);
        assert_eq!(split_frames(&[0.1, 0.2, 0.3, 0.4], 2), [(0.1, 0.2), (0.3, 0.4)]);
    }
}
