use serde::Serialize;

/// Outcome of one recoverable pipeline step.
///
/// Steps report failure as a reason string instead of propagating the error,
/// so the run can carry on with the remaining independent steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step<T> {
    Done(T),
    Failed { reason: String },
}

impl<T> Step<T> {
    pub fn from_result(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Step::Done(value),
            // alternate format keeps the whole context chain
            Err(err) => Step::Failed {
                reason: format!("{err:#}"),
            },
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done(_))
    }

    pub fn done(&self) -> Option<&T> {
        match self {
            Step::Done(value) => Some(value),
            Step::Failed { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Step::Done(_) => None,
            Step::Failed { reason } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn failure_reason_keeps_the_context_chain() {
        let result: anyhow::Result<u32> =
            Err(anyhow!("no such file")).context("reading rides_raw.csv");
        let step = Step::from_result(result);
        assert!(!step.is_done());
        assert_eq!(step.reason(), Some("reading rides_raw.csv: no such file"));
    }

    #[test]
    fn serializes_with_the_variant_name() -> anyhow::Result<()> {
        let done: Step<usize> = Step::Done(3);
        assert_eq!(serde_json::to_string(&done)?, r#"{"done":3}"#);
        let failed: Step<usize> = Step::Failed {
            reason: "boom".into(),
        };
        assert_eq!(
            serde_json::to_string(&failed)?,
            r#"{"failed":{"reason":"boom"}}"#
        );
        Ok(())
    }
}
