//! Non-fatal findings reported while converting a model.

use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::warn;

#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// An operator attribute that no rule read. Usually harmless metadata.
    UnhandledAttribute {
        op: String,
        op_type: String,
        attr: String,
    },
    /// An int64 tensor value outside the int32 range, saturated on narrowing.
    ValueClamped {
        tensor: String,
        value: i64,
        clamped_to: i32,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Diagnostic::UnhandledAttribute { op, op_type, attr } => write!(
                f,
                "unsupported attribute {attr} for operator {op_type} (\"{op}\")"
            ),
            Diagnostic::ValueClamped {
                tensor,
                value,
                clamped_to,
            } => write!(
                f,
                "clamping out-of-range value {value} in tensor \"{tensor}\" to {clamped_to}"
            ),
        }
    }
}

/// Collects diagnostics, logging each one as it is recorded.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
