// src/dispatch.rs
// Routes a validated operation to its kernel or to the answer adapter

use serde::Serialize;
use tracing::debug;

use crate::answer;
use crate::error::Result;
use crate::kernels;
use crate::llm::AnswerModel;
use crate::operation::Operation;

/// Payload placed in the `data` field of a success envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    Sequence(Vec<u128>),
    Integers(Vec<i128>),
    Number(u64),
    Text(String),
}

/// Run a CPU-bound kernel on the blocking pool so slow inputs never stall
/// the async workers serving other requests
async fn off_runtime<T, F>(kernel: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(kernel).await?)
}

/// Run one operation
pub async fn dispatch(operation: Operation, model: Option<&dyn AnswerModel>) -> Result<OperationOutput> {
    debug!(operation = operation.key(), "Dispatching operation");

    let output = match operation {
        Operation::Fibonacci(n) => {
            OperationOutput::Sequence(off_runtime(move || kernels::fibonacci(n)).await??)
        }
        Operation::Prime(values) => {
            OperationOutput::Integers(off_runtime(move || kernels::filter_primes(&values)).await?)
        }
        Operation::Lcm(values) => {
            OperationOutput::Number(off_runtime(move || kernels::lcm(&values)).await??)
        }
        Operation::Hcf(values) => {
            OperationOutput::Number(off_runtime(move || kernels::hcf(&values)).await??)
        }
        Operation::Ai(question) => OperationOutput::Text(answer::answer(model, &question).await?),
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BfhlError;

    #[tokio::test]
    async fn test_dispatch_numeric_operations() {
        assert_eq!(
            dispatch(Operation::Fibonacci(5), None).await.unwrap(),
            OperationOutput::Sequence(vec![0, 1, 1, 2, 3, 5])
        );
        assert_eq!(
            dispatch(Operation::Prime(vec![2, 4, 7, 9, 11]), None).await.unwrap(),
            OperationOutput::Integers(vec![2, 7, 11])
        );
        assert_eq!(
            dispatch(Operation::Lcm(vec![12, 18, 24]), None).await.unwrap(),
            OperationOutput::Number(72)
        );
        assert_eq!(
            dispatch(Operation::Hcf(vec![24, 36, 60]), None).await.unwrap(),
            OperationOutput::Number(12)
        );
    }

    #[tokio::test]
    async fn test_dispatch_kernel_failure_is_internal() {
        let err = dispatch(Operation::Lcm(vec![u64::MAX, u64::MAX - 1]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BfhlError::Internal(_)));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[tokio::test]
    async fn test_kernel_panic_is_internal() {
        let err = off_runtime(|| -> u64 { panic!("kernel bug") }).await.unwrap_err();
        assert!(matches!(err, BfhlError::Internal(_)));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_slow_kernel_does_not_block_runtime() {
        // 999983 * 1000003: no factor below ~10^6, so every check runs the full trial division
        let semiprimes = vec![999_985_999_949; 200];
        let slow = tokio::spawn(dispatch(Operation::Prime(semiprimes), None));

        // Single worker thread: the timer only fires while the kernel is still
        // running if the kernel is off the async worker
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(!slow.is_finished());

        let output = slow.await.unwrap().unwrap();
        assert_eq!(output, OperationOutput::Integers(vec![]));
    }

    #[tokio::test]
    async fn test_dispatch_ai_without_model() {
        let err = dispatch(Operation::Ai("hello".into()), None).await.unwrap_err();
        assert!(matches!(err, BfhlError::ServiceNotConfigured));
    }

    #[test]
    fn test_output_serialization() {
        assert_eq!(serde_json::to_string(&OperationOutput::Number(72)).unwrap(), "72");
        assert_eq!(
            serde_json::to_string(&OperationOutput::Sequence(vec![0, 1, 1])).unwrap(),
            "[0,1,1]"
        );
        assert_eq!(
            serde_json::to_string(&OperationOutput::Text("Paris".into())).unwrap(),
            r#""Paris""#
        );
    }
}
