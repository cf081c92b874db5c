//! Retry Wrapper — bounded retry with backoff for transient capacity errors.
//!
//! Only `LlmError::RateLimited` is retried. Any other failure from the
//! generation capability will not be resolved by waiting, so it fails the
//! invocation immediately.

use std::time::Duration;

use tracing::warn;

use crate::llm_client::{LlmError, TextGenerator};
use crate::pipeline::PipelineError;

/// Total attempts per step invocation, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Invokes the generation capability, retrying rate-limit failures with a
/// bounded backoff.
///
/// The wait between attempts is the provider-stated "try again in N seconds"
/// duration when the error message carries one, otherwise an exponential
/// schedule (1s, 2s, 4s by attempt index). Exhausting `max_attempts` yields
/// `PipelineError::RateLimitExceeded` carrying the attempt count.
pub async fn invoke_with_retry(
    llm: &dyn TextGenerator,
    prompt: &str,
    system: &str,
    max_attempts: u32,
) -> Result<String, PipelineError> {
    for attempt in 1..=max_attempts {
        match llm.generate(prompt, system).await {
            Ok(text) => return Ok(text),
            Err(LlmError::RateLimited { message }) => {
                if attempt == max_attempts {
                    break;
                }
                let delay = parse_retry_after(&message).unwrap_or_else(|| backoff_delay(attempt));
                warn!(
                    "Generation rate limited (attempt {attempt}/{max_attempts}), retrying after {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(PipelineError::Generation(e.to_string())),
        }
    }

    Err(PipelineError::RateLimitExceeded {
        attempts: max_attempts,
    })
}

/// Extracts a provider-stated wait from a "try again in N seconds" style
/// message, with one extra second of slack on top of the stated wait.
fn parse_retry_after(message: &str) -> Option<Duration> {
    let lower = message.to_lowercase();
    let idx = lower.find("try again in ")?;
    let rest = &lower[idx + "try again in ".len()..];

    let digits: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let seconds: f64 = digits.parse().ok()?;

    Some(Duration::from_secs_f64(seconds + 1.0))
}

/// Exponential backoff: 1s, 2s, 4s by attempt index.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << (attempt - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with a rate-limit error `failures` times, then succeeds.
    struct FlakyGenerator {
        failures: u32,
        calls: AtomicU32,
        message: String,
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(LlmError::RateLimited {
                    message: self.message.clone(),
                })
            } else {
                Ok("recovered".to_string())
            }
        }
    }

    struct HardFailGenerator {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for HardFailGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::Api {
                status: 400,
                message: "malformed request".to_string(),
            })
        }
    }

    #[test]
    fn test_parse_retry_after_reads_stated_seconds() {
        let msg = "Rate limit reached. Please try again in 7.5s before retrying.";
        assert_eq!(
            parse_retry_after(msg),
            Some(Duration::from_secs_f64(8.5))
        );
    }

    #[test]
    fn test_parse_retry_after_absent_when_not_stated() {
        assert!(parse_retry_after("429 Too Many Requests").is_none());
        assert!(parse_retry_after("try again in soon").is_none());
    }

    #[test]
    fn test_backoff_schedule_doubles() {
        assert_eq!(backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(backoff_delay(3), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_two_rate_limits() {
        let generator = FlakyGenerator {
            failures: 2,
            calls: AtomicU32::new(0),
            message: String::new(),
        };
        let start = tokio::time::Instant::now();

        let result = invoke_with_retry(&generator, "p", "s", 3).await.unwrap();

        assert_eq!(result, "recovered");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
        // Two backoff sleeps: 1s after the first failure, 2s after the second.
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_honors_provider_stated_wait() {
        let generator = FlakyGenerator {
            failures: 1,
            calls: AtomicU32::new(0),
            message: "Please try again in 7s.".to_string(),
        };
        let start = tokio::time::Instant::now();

        invoke_with_retry(&generator, "p", "s", 3).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_attempt_count() {
        let generator = FlakyGenerator {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
            message: String::new(),
        };

        let err = invoke_with_retry(&generator, "p", "s", 3).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::RateLimitExceeded { attempts: 3 }
        ));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_hard_errors_are_not_retried() {
        let generator = HardFailGenerator {
            calls: AtomicU32::new(0),
        };

        let err = invoke_with_retry(&generator, "p", "s", 3).await.unwrap_err();

        assert!(matches!(err, PipelineError::Generation(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }
}
