use crate::core::cancel::CancellationToken;
use crate::core::oracle::PrimalityOracle;
use crate::domain::model::{Classification, PrimalityVerdict, VerdictReport};
use crate::domain::ports::PrimeService;
use crate::utils::error::{OracleError, Result};
use async_trait::async_trait;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Shown while a check is in flight.
pub const CHECKING_PLACEHOLDER: &str = "Checking...";

/// Shown instead of running the oracle when the field is empty.
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a number.";

/// Async front door to the oracle: runs each check on the blocking pool and
/// turns every outcome, including worker panics, into display text.
#[derive(Debug, Clone)]
pub struct PrimeChecker {
    oracle: Arc<PrimalityOracle>,
}

impl PrimeChecker {
    pub fn new(oracle: PrimalityOracle) -> Self {
        Self {
            oracle: Arc::new(oracle),
        }
    }

    pub fn with_shared(oracle: Arc<PrimalityOracle>) -> Self {
        Self { oracle }
    }

    /// Classifies `input` off the async executor. Dropping the returned future
    /// cancels the worker at its next checkpoint.
    pub async fn examine(&self, input: &str) -> Result<Classification> {
        self.examine_with(input, CancellationToken::new()).await
    }

    /// Like [`examine`](Self::examine), but under a token the caller can also
    /// cancel or observe.
    pub async fn examine_with(&self, input: &str, token: CancellationToken) -> Result<Classification> {
        let oracle = Arc::clone(&self.oracle);
        let input = input.to_owned();
        let worker_token = token.clone();
        let guard = token.drop_guard();

        let outcome =
            tokio::task::spawn_blocking(move || oracle.examine_cancellable(&input, &worker_token))
                .await;
        guard.disarm();

        match outcome {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => Err(OracleError::internal(format!(
                "primality worker panicked: {}",
                panic_message(join_error.into_panic())
            ))),
            Err(join_error) => Err(OracleError::internal(join_error.to_string())),
        }
    }

    pub async fn report(&self, input: &str) -> Result<VerdictReport> {
        if input.is_empty() {
            let mut report =
                VerdictReport::new(input, &Classification::new(PrimalityVerdict::NotANumber));
            report.message = EMPTY_INPUT_MESSAGE.to_string();
            return Ok(report);
        }

        let classification = self.examine(input).await?;
        Ok(VerdictReport::new(input, &classification))
    }

    /// Checks every number with at most `concurrency` in flight; output order matches input order.
    pub async fn check_all(&self, numbers: &[String], concurrency: usize) -> Vec<String> {
        self.run_bounded(numbers, concurrency, |checker, number| async move {
            checker.check_prime(&number).await
        })
        .await
    }

    /// One JSON object for `input`; failures become `{"input", "error"}` objects.
    pub async fn report_line(&self, input: &str) -> String {
        match self.report(input).await.and_then(|report| report.to_json()) {
            Ok(line) => line,
            Err(e) => serde_json::json!({
                "input": input,
                "error": e.user_friendly_message(),
            })
            .to_string(),
        }
    }

    /// JSON line per number, in input order.
    pub async fn report_all(&self, numbers: &[String], concurrency: usize) -> Vec<String> {
        self.run_bounded(numbers, concurrency, |checker, number| async move {
            checker.report_line(&number).await
        })
        .await
    }

    async fn run_bounded<F, Fut>(&self, numbers: &[String], concurrency: usize, job: F) -> Vec<String>
    where
        F: Fn(PrimeChecker, String) -> Fut,
        Fut: Future<Output = String> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, number) in numbers.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let work = job(self.clone(), number.clone());
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, work.await)
            });
        }

        let mut lines: Vec<Option<String>> = vec![None; numbers.len()];
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, line)) => lines[index] = Some(line),
                Err(e) => {
                    tracing::error!("Batch task failed: {}", e);
                    failure = Some(OracleError::internal(format!("batch task failed: {}", e)));
                }
            }
        }

        lines
            .into_iter()
            .map(|line| {
                line.unwrap_or_else(|| match &failure {
                    Some(e) => format!("Error: {}", e.user_friendly_message()),
                    None => "Error: batch task failed".to_string(),
                })
            })
            .collect()
    }

    /// Answers one number per line from `reader` until EOF. Bytes that are not
    /// UTF-8 are replaced rather than ending the session.
    pub async fn serve_lines<R, W>(&self, mut reader: R, writer: &mut W, json: bool) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let raw = String::from_utf8_lossy(&buf);
            let line = raw.trim_end_matches(['\n', '\r']);
            let output = if json {
                format!("{}\n", self.report_line(line).await)
            } else {
                format!("{}\n{}\n", CHECKING_PLACEHOLDER, self.check_prime(line).await)
            };
            writer.write_all(output.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok(())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl PrimeService for PrimeChecker {
    async fn check_prime(&self, number_to_check: &str) -> String {
        if number_to_check.is_empty() {
            return EMPTY_INPUT_MESSAGE.to_string();
        }

        match self.examine(number_to_check).await {
            Ok(classification) => classification.render(),
            Err(e) => {
                tracing::error!(
                    "check_prime failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                format!("Error: {}", e.user_friendly_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_prime_renders_verdicts() {
        let checker = PrimeChecker::new(PrimalityOracle::default());
        assert_eq!(checker.check_prime("97").await, "97 is prime.");
        assert_eq!(
            checker.check_prime("91").await,
            "91 is not prime (divisible by 7)."
        );
        assert_eq!(checker.check_prime("").await, "Please enter a number.");
        assert_eq!(checker.check_prime("  ").await, "Please enter a valid number.");
    }

    #[tokio::test]
    async fn test_check_all_preserves_order() {
        let checker = PrimeChecker::new(PrimalityOracle::default());
        let numbers: Vec<String> = ["4", "7", "x", "1"].iter().map(|s| s.to_string()).collect();
        let lines = checker.check_all(&numbers, 2).await;
        assert_eq!(
            lines,
            vec![
                "4 is not prime (divisible by 2).",
                "7 is prime.",
                "Please enter a valid number.",
                "Number must be greater than 1.",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_batch_task_reports_error_in_its_slot() {
        let checker = PrimeChecker::new(PrimalityOracle::default());
        let numbers: Vec<String> = ["7", "boom", "9"].iter().map(|s| s.to_string()).collect();
        let lines = checker
            .run_bounded(&numbers, 2, |checker, number| async move {
                if number == "boom" {
                    panic!("worker exploded");
                }
                checker.check_prime(&number).await
            })
            .await;

        assert_eq!(lines[0], "7 is prime.");
        assert!(lines[1].starts_with("Error: "), "{}", lines[1]);
        assert_eq!(lines[2], "9 is not prime (divisible by 3).");
    }

    #[tokio::test]
    async fn test_serve_lines_survives_invalid_utf8() {
        let checker = PrimeChecker::new(PrimalityOracle::default());
        let input: &[u8] = b"97\n\xff\xfe\r\n\n91";
        let mut output = Vec::new();

        checker.serve_lines(input, &mut output, false).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Checking...",
                "97 is prime.",
                "Checking...",
                "Please enter a valid number.",
                "Checking...",
                "Please enter a number.",
                "Checking...",
                "91 is not prime (divisible by 7).",
            ]
        );
    }

    #[tokio::test]
    async fn test_serve_lines_json() {
        let checker = PrimeChecker::new(PrimalityOracle::default());
        let input: &[u8] = b"13\n\n";
        let mut output = Vec::new();

        checker.serve_lines(input, &mut output, true).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let reports: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["verdict"], "prime");
        assert_eq!(reports[1]["verdict"], "not_a_number");
        assert_eq!(reports[1]["message"], "Please enter a number.");
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("bang".to_string())), "bang");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic");
    }
}
