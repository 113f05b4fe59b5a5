//! Recorded accelerometer feed
//!
//! Samples come from a text file, one per line: `x,y,z` played back at a
//! fixed rate, or `t_ms,x,y,z` played back at the recorded offsets from
//! the start of the file. Blank lines and `#` comments are skipped.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use stride_core::traits::SampleHandler;
use stride_core::{AccelerationSample, MotionError, MotionSensor};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// One line of a replay file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplaySample {
    /// Offset from the start of playback, if the file records one
    pub at_ms: Option<u64>,
    pub sample: AccelerationSample,
}

/// Parse replay text; errors name the offending line
pub fn parse_samples(text: &str) -> Result<Vec<ReplaySample>> {
    let mut samples = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = index + 1;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let (at_ms, axes) = match fields.as_slice() {
            [x, y, z] => (None, [*x, *y, *z]),
            [t, x, y, z] => {
                let t: u64 = t
                    .parse()
                    .with_context(|| format!("line {line_no}: bad timestamp {t:?}"))?;
                (Some(t), [*x, *y, *z])
            }
            _ => bail!("line {line_no}: expected 3 or 4 comma-separated fields"),
        };
        let mut values = [0f32; 3];
        for (value, text) in values.iter_mut().zip(axes) {
            *value = text
                .parse()
                .with_context(|| format!("line {line_no}: bad axis value {text:?}"))?;
        }
        let [x, y, z] = values;
        samples.push(ReplaySample {
            at_ms,
            sample: AccelerationSample::new(x, y, z),
        });
    }
    Ok(samples)
}

/// [`MotionSensor`] that plays back a recording on the tokio clock
#[derive(Debug)]
pub struct ReplaySensor {
    samples: Arc<[ReplaySample]>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl ReplaySensor {
    /// `rate_hz` paces lines without a timestamp
    pub fn new(samples: Vec<ReplaySample>, rate_hz: u32) -> Self {
        let interval = Duration::from_secs(1) / rate_hz.max(1);
        Self {
            samples: samples.into(),
            interval,
            task: None,
        }
    }

    pub fn from_file(path: &Path, rate_hz: u32) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading samples from {}", path.display()))?;
        let samples =
            parse_samples(&text).with_context(|| format!("parsing {}", path.display()))?;
        tracing::info!(count = samples.len(), path = %path.display(), "loaded replay samples");
        Ok(Self::new(samples, rate_hz))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether playback is still running
    pub fn is_playing(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl MotionSensor for ReplaySensor {
    fn is_available(&self) -> bool {
        !self.samples.is_empty()
    }

    fn start_listening(&mut self, mut on_sample: SampleHandler) -> Result<(), MotionError> {
        self.stop_listening();
        let samples = self.samples.clone();
        let interval = self.interval;
        self.task = Some(tokio::spawn(async move {
            let start = Instant::now();
            let mut due = start;
            for entry in samples.iter() {
                due = match entry.at_ms {
                    Some(at) => start + Duration::from_millis(at),
                    None => due + interval,
                };
                tokio::time::sleep_until(due).await;
                on_sample(entry.sample);
            }
            tracing::info!("replay finished");
        }));
        Ok(())
    }

    fn stop_listening(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ReplaySensor {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

/// Stand-in when no recording is configured; never available
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSensor;

impl MotionSensor for NoSensor {
    fn is_available(&self) -> bool {
        false
    }

    fn start_listening(&mut self, _on_sample: SampleHandler) -> Result<(), MotionError> {
        Err(MotionError::Unavailable)
    }

    fn stop_listening(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_parse_both_forms() {
        let text = "# walk\n0.1, 0.2, 9.8\n\n250,0,0,15.5\n";
        let samples = parse_samples(text).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].at_ms, None);
        assert_eq!(samples[0].sample, AccelerationSample::new(0.1, 0.2, 9.8));
        assert_eq!(samples[1].at_ms, Some(250));
        assert_eq!(samples[1].sample.z, 15.5);
    }

    #[test]
    fn test_parse_reports_line() {
        let err = parse_samples("1,2,3\n1,2\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");

        let err = parse_samples("1,2,x\n").unwrap_err();
        assert!(err.to_string().contains("line 1"), "{err}");
    }

    #[test]
    fn test_empty_recording_unavailable() {
        assert!(!ReplaySensor::new(Vec::new(), 50).is_available());
        assert!(!NoSensor.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_paced() {
        let samples = parse_samples("0,0,1\n0,0,2\n0,0,3\n").unwrap();
        let mut sensor = ReplaySensor::new(samples, 10);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        sensor
            .start_listening(Box::new(move |s| sink.lock().unwrap().push(s.z)))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1.0]);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(!sensor.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_playback() {
        let samples = parse_samples("100,0,0,1\n200,0,0,2\n").unwrap();
        let mut sensor = ReplaySensor::new(samples, 50);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        sensor
            .start_listening(Box::new(move |s| sink.lock().unwrap().push(s.z)))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        sensor.stop_listening();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1.0]);
    }
}
