//! The LIFO stack behind the stack-based calculator flavor.
//!
//! An operate call detaches its operand window from the top, evaluates, and
//! on failure reattaches the window unchanged, so a failed call leaves the
//! stack exactly as it found it.

use thiserror::Error;

use crate::eval::{self, EvalError};
use crate::ops::Operation;

/// A failed stack mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// An operate call found fewer values than the operation's arity.
    #[error("Error: cannot implement operation {operation}. It requires {required} arguments and the stack has only {size} arguments")]
    NotEnoughOperands {
        operation: String,
        required: usize,
        size: usize,
    },
    /// A remove call asked for more values than the stack holds.
    #[error("Error: cannot remove {count} from the stack. It has only {size} arguments")]
    RemoveExceedsSize { count: usize, size: usize },
    /// The operation itself failed; the stack was left untouched.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Outcome of a successful operate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperateOutcome {
    /// The consumed operands, in evaluation order.
    pub arguments: Vec<i64>,
    /// The computed value. It is not pushed back onto the stack.
    pub result: i64,
    /// Stack size after the operands were consumed.
    pub remaining: usize,
}

/// The calculator stack. Pushing `[a, b, c]` leaves `c` on top.
#[derive(Debug, Default)]
pub struct Stack {
    values: Vec<i64>,
}

impl Stack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current depth.
    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Bottom-to-top copy of the values, for logging and inspection.
    #[must_use]
    pub fn snapshot(&self) -> Vec<i64> {
        self.values.clone()
    }

    /// Appends the values in list order and returns the new size.
    pub fn push_many(&mut self, values: &[i64]) -> usize {
        self.values.extend_from_slice(values);
        self.values.len()
    }

    /// Removes `count` values from the top and returns the new size.
    /// Removing zero is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns `StackError::RemoveExceedsSize` if `count` exceeds the
    /// current depth; nothing is removed in that case.
    pub fn remove_top(&mut self, count: usize) -> Result<usize, StackError> {
        let size = self.values.len();
        if count > size {
            return Err(StackError::RemoveExceedsSize { count, size });
        }
        self.values.truncate(size - count);
        Ok(self.values.len())
    }

    /// Resolves `name`, consumes the operation's operands from the top of
    /// the stack, and evaluates them in stack order (bottom-to-top within
    /// the detached window).
    ///
    /// # Errors
    ///
    /// Returns `StackError` for an unknown name, too few operands, or a
    /// failed evaluation. On any failure the stack is left exactly as it
    /// was before the call.
    pub fn operate(&mut self, name: &str) -> Result<OperateOutcome, StackError> {
        let operation = Operation::resolve(name)
            .ok_or_else(|| EvalError::UnknownOperation(name.to_string()))?;
        let required = operation.arity();
        let size = self.values.len();
        if size < required {
            return Err(StackError::NotEnoughOperands {
                operation: name.to_string(),
                required,
                size,
            });
        }
        let window = self.values.split_off(size - required);
        match eval::execute(operation, name, &window) {
            Ok(result) => Ok(OperateOutcome {
                remaining: self.values.len(),
                arguments: window,
                result,
            }),
            Err(error) => {
                // Reattach the window so the failed call has no effect.
                self.values.extend(window);
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let stack = Stack::new();
        assert_eq!(stack.size(), 0);
        assert!(stack.snapshot().is_empty());
    }

    #[test]
    fn push_appends_in_list_order() {
        let mut stack = Stack::new();
        assert_eq!(stack.push_many(&[1, 2]), 2);
        assert_eq!(stack.push_many(&[3]), 3);
        assert_eq!(stack.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn remove_takes_from_the_top() {
        let mut stack = Stack::new();
        stack.push_many(&[1, 2, 3, 4]);
        assert_eq!(stack.remove_top(2).unwrap(), 2);
        assert_eq!(stack.snapshot(), vec![1, 2]);
    }

    #[test]
    fn remove_zero_is_a_noop() {
        let mut stack = Stack::new();
        stack.push_many(&[9]);
        assert_eq!(stack.remove_top(0).unwrap(), 1);
        assert_eq!(stack.snapshot(), vec![9]);
    }

    #[test]
    fn remove_beyond_size_fails_without_removing() {
        let mut stack = Stack::new();
        stack.push_many(&[1, 2]);
        let error = stack.remove_top(5).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Error: cannot remove 5 from the stack. It has only 2 arguments"
        );
        assert_eq!(stack.snapshot(), vec![1, 2]);
    }

    #[test]
    fn operate_evaluates_the_window_in_stack_order() {
        let mut stack = Stack::new();
        stack.push_many(&[10, 2]);
        let outcome = stack.operate("divide").unwrap();
        assert_eq!(outcome.result, 5);
        assert_eq!(outcome.arguments, vec![10, 2]);
        assert_eq!(outcome.remaining, 0);
    }

    #[test]
    fn operate_result_is_not_pushed_back() {
        let mut stack = Stack::new();
        stack.push_many(&[1, 2, 3]);
        let outcome = stack.operate("plus").unwrap();
        assert_eq!(outcome.result, 5);
        assert_eq!(stack.snapshot(), vec![1]);
    }

    #[test]
    fn operate_unary_consumes_one_value() {
        let mut stack = Stack::new();
        stack.push_many(&[7, -3]);
        let outcome = stack.operate("abs").unwrap();
        assert_eq!(outcome.result, 3);
        assert_eq!(outcome.arguments, vec![-3]);
        assert_eq!(stack.snapshot(), vec![7]);
    }

    #[test]
    fn operate_underflow_reports_arity_and_size() {
        let mut stack = Stack::new();
        stack.push_many(&[1]);
        let error = stack.operate("divide").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Error: cannot implement operation divide. It requires 2 arguments and the stack has only 1 arguments"
        );
        assert_eq!(stack.snapshot(), vec![1]);
    }

    #[test]
    fn operate_unknown_name_keeps_the_stack() {
        let mut stack = Stack::new();
        stack.push_many(&[1, 2]);
        let error = stack.operate("modulo").unwrap_err();
        assert_eq!(error.to_string(), "Error: unknown operation: modulo");
        assert_eq!(stack.snapshot(), vec![1, 2]);
    }

    #[test]
    fn failed_evaluation_restores_the_stack_exactly() {
        let mut stack = Stack::new();
        stack.push_many(&[1, 2, 0]);
        let error = stack.operate("divide").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Error while performing operation Divide: division by 0"
        );
        assert_eq!(stack.snapshot(), vec![1, 2, 0]);
    }

    #[test]
    fn overflow_during_operate_rolls_back() {
        let mut stack = Stack::new();
        stack.push_many(&[i64::MAX, 1]);
        let error = stack.operate("plus").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Error while performing operation plus: integer overflow"
        );
        assert_eq!(stack.snapshot(), vec![i64::MAX, 1]);
    }
}
