use serde_json::Value;

/// What a transform did with its input.
///
/// Transforms degrade softly: bad input yields `Fallback` with the
/// substitute value and a reason instead of an error, so one malformed cell
/// never sinks a record. The mapping engine records fallbacks in its audit.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome {
    /// The transform handled the input; this is the result.
    Applied(Value),
    /// The transform could not handle the input and substituted `value`.
    Fallback { value: Value, reason: String },
}

impl TransformOutcome {
    pub fn applied(value: impl Into<Value>) -> Self {
        TransformOutcome::Applied(value.into())
    }

    pub fn fallback(value: Value, reason: impl Into<String>) -> Self {
        TransformOutcome::Fallback {
            value,
            reason: reason.into(),
        }
    }

    /// The produced value, whichever way it was produced.
    pub fn into_value(self) -> Value {
        match self {
            TransformOutcome::Applied(value) | TransformOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TransformOutcome::Fallback { .. })
    }

    /// The fallback reason, when there is one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            TransformOutcome::Applied(_) => None,
            TransformOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}
