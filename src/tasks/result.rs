//! # Captured completion of a unit.
//!
//! [`TaskResult`] is the `(error, …values)` tuple a unit completes with. It is stored
//! on the unit, carried by `Completed`/`Done` events and handed to
//! [`once_done`](crate::Task::once_done) / [`when_done`](crate::Task::when_done) listeners.

use serde_json::Value;

use crate::error::TaskError;

/// The `(error, …values)` tuple captured from a unit's single completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskResult {
    /// Error the unit completed with, if any.
    pub error: Option<TaskError>,
    /// Values the unit completed with.
    pub values: Vec<Value>,
}

impl TaskResult {
    /// A successful result carrying `values`.
    pub fn ok(values: Vec<Value>) -> Self {
        Self {
            error: None,
            values,
        }
    }

    /// A failed result with no values.
    pub fn failed(error: TaskError) -> Self {
        Self {
            error: Some(error),
            values: Vec::new(),
        }
    }

    /// Does this result carry an error?
    #[inline]
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Renders the tuple as a JSON array: `[error-message-or-null, …values]`.
    ///
    /// Groups store each child's result in this shape.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use taskflow::TaskResult;
    ///
    /// let r = TaskResult::ok(vec![json!(5)]);
    /// assert_eq!(r.to_value(), json!([null, 5]));
    /// ```
    pub fn to_value(&self) -> Value {
        let head = match &self.error {
            Some(e) => Value::String(e.to_string()),
            None => Value::Null,
        };
        let mut out = Vec::with_capacity(self.values.len() + 1);
        out.push(head);
        out.extend(self.values.iter().cloned());
        Value::Array(out)
    }
}

impl From<Result<Vec<Value>, TaskError>> for TaskResult {
    fn from(res: Result<Vec<Value>, TaskError>) -> Self {
        match res {
            Ok(values) => TaskResult::ok(values),
            Err(e) => TaskResult::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_renders_message_first() {
        let r = TaskResult::failed(TaskError::fail("boom"));
        assert!(r.is_err());
        assert_eq!(r.to_value(), json!(["execution failed: boom"]));
    }

    #[test]
    fn test_from_result() {
        let r: TaskResult = Ok::<_, TaskError>(vec![json!("a"), json!(2)]).into();
        assert_eq!(r, TaskResult::ok(vec![json!("a"), json!(2)]));
        let r: TaskResult = Err::<Vec<Value>, _>(TaskError::NoRuntime).into();
        assert_eq!(r.error, Some(TaskError::NoRuntime));
    }
}
