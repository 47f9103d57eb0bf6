//! Declared field contract of a stage.

use serde::{Deserialize, Serialize};

/// The fields a stage reads and writes.
///
/// Required fields must be present in the context when the stage runs.
/// Optional fields are handed over when present and skipped otherwise.
/// Output fields are the ones the stage promises to return; the pipeline
/// builder uses them to check data dependencies before anything runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSignature {
    /// Fields that must be present.
    #[serde(default)]
    pub required: Vec<String>,
    /// Fields that are read when present.
    #[serde(default)]
    pub optional: Vec<String>,
    /// Fields the stage contributes to the context.
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl StageSignature {
    /// Creates an empty signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds required input fields.
    #[must_use]
    pub fn requires<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Adds optional input fields.
    #[must_use]
    pub fn accepts<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Adds output fields.
    #[must_use]
    pub fn produces<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Returns every input field, required first.
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_builder() {
        let sig = StageSignature::new()
            .requires(["component"])
            .accepts(["vehicle_id", "estimated_cost"])
            .produces(["order_id"]);

        assert_eq!(sig.required, vec!["component"]);
        assert_eq!(
            sig.inputs().collect::<Vec<_>>(),
            vec!["component", "vehicle_id", "estimated_cost"]
        );
        assert_eq!(sig.outputs, vec!["order_id"]);
    }
}
