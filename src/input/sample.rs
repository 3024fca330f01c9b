//! # Joystick Sample Sources
//!
//! The transmitter does not care how readings are acquired. Anything that can
//! hand over one [`JoystickSample`] per iteration implements
//! [`SampleSource`].
//!
//! [`LineSource`] reads whitespace separated readings from any async reader:
//!
//! ```text
//! # throttle lateral longitudinal
//! 1234 900 250
//! 512 512 512
//! ```

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::trace;

use crate::error::{RcLinkError, Result};
use crate::protocol::packet::THROTTLE_MAX;

/// Largest reading of a 10-bit ADC
pub const ADC_MAX: u16 = 1023;

/// One set of joystick readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoystickSample {
    /// Throttle stick magnitude, sent as four digits
    pub throttle: u16,
    /// Lateral axis, selects the steering command
    pub lateral: u16,
    /// Longitudinal axis, selects the speed cap
    pub longitudinal: u16,
}

impl JoystickSample {
    #[must_use]
    pub const fn new(throttle: u16, lateral: u16, longitudinal: u16) -> Self {
        Self {
            throttle,
            lateral,
            longitudinal,
        }
    }

    /// Parse a `throttle lateral longitudinal` line
    ///
    /// # Errors
    ///
    /// Returns `RcLinkError::Sensor` if the line does not hold exactly three
    /// unsigned integers, the throttle exceeds 9999, or an axis exceeds the
    /// ADC range.
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(RcLinkError::Sensor(format!(
                "Expected 3 readings, got {}: {:?}",
                fields.len(),
                line
            )));
        }

        let mut values = [0u16; 3];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field
                .parse()
                .map_err(|e| RcLinkError::Sensor(format!("Invalid reading {:?}: {}", field, e)))?;
        }
        let [throttle, lateral, longitudinal] = values;

        if throttle > THROTTLE_MAX {
            return Err(RcLinkError::Sensor(format!(
                "Throttle {} exceeds {}",
                throttle, THROTTLE_MAX
            )));
        }
        for (name, value) in [("lateral", lateral), ("longitudinal", longitudinal)] {
            if value > ADC_MAX {
                return Err(RcLinkError::Sensor(format!(
                    "{} reading {} exceeds {}",
                    name, value, ADC_MAX
                )));
            }
        }

        Ok(Self::new(throttle, lateral, longitudinal))
    }
}

/// Supplies one joystick sample per control-loop iteration
#[async_trait]
pub trait SampleSource: Send {
    /// Next sample, or `None` once the source is exhausted.
    async fn next_sample(&mut self) -> Result<Option<JoystickSample>>;
}

/// Reads samples as text lines
///
/// Blank lines and lines starting with `#` are skipped.
pub struct LineSource<R> {
    reader: R,
    line: String,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl LineSource<tokio::io::BufReader<tokio::io::Stdin>> {
    /// Line source over standard input.
    pub fn stdin() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> SampleSource for LineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_sample(&mut self) -> Result<Option<JoystickSample>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line).await? == 0 {
                return Ok(None);
            }

            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let sample = JoystickSample::parse(trimmed)?;
            trace!("Sampled {:?}", sample);
            return Ok(Some(sample));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_line() {
        let sample = JoystickSample::parse("1234 900 250").unwrap();
        assert_eq!(sample, JoystickSample::new(1234, 900, 250));
    }

    #[test]
    fn test_parse_extra_whitespace() {
        let sample = JoystickSample::parse("  0\t1023   300 ").unwrap();
        assert_eq!(sample, JoystickSample::new(0, 1023, 300));
    }

    #[test]
    fn test_parse_wrong_field_count() {
        assert!(matches!(JoystickSample::parse("1 2"), Err(RcLinkError::Sensor(_))));
        assert!(matches!(JoystickSample::parse("1 2 3 4"), Err(RcLinkError::Sensor(_))));
    }

    #[test]
    fn test_parse_non_numeric() {
        assert!(JoystickSample::parse("1 two 3").is_err());
        assert!(JoystickSample::parse("-1 2 3").is_err());
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(JoystickSample::parse("10000 500 500").is_err());
        assert!(JoystickSample::parse("9999 1024 500").is_err());
        assert!(JoystickSample::parse("9999 500 1024").is_err());
        assert!(JoystickSample::parse("9999 1023 1023").is_ok());
    }

    #[tokio::test]
    async fn test_line_source_skips_comments_and_blanks() {
        let input: &[u8] = b"# header\n\n1234 900 250\n   \n512 512 512\n";
        let mut source = LineSource::new(input);

        assert_eq!(
            source.next_sample().await.unwrap(),
            Some(JoystickSample::new(1234, 900, 250))
        );
        assert_eq!(
            source.next_sample().await.unwrap(),
            Some(JoystickSample::new(512, 512, 512))
        );
        assert_eq!(source.next_sample().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_source_last_line_without_newline() {
        let input: &[u8] = b"1 2 3";
        let mut source = LineSource::new(input);
        assert_eq!(
            source.next_sample().await.unwrap(),
            Some(JoystickSample::new(1, 2, 3))
        );
        assert_eq!(source.next_sample().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_source_reports_bad_line() {
        let input: &[u8] = b"1 2\n";
        let mut source = LineSource::new(input);
        assert!(source.next_sample().await.is_err());
    }
}
