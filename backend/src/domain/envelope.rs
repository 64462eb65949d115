//! Fixed response wrapper used by the user endpoints.

use serde::{Deserialize, Serialize};

/// Outcome flag carried by every [`Envelope`], encoded as `1` or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EnvelopeStatus {
    Failure,
    Success,
}

impl From<EnvelopeStatus> for u8 {
    fn from(value: EnvelopeStatus) -> Self {
        match value {
            EnvelopeStatus::Failure => 0,
            EnvelopeStatus::Success => 1,
        }
    }
}

impl TryFrom<u8> for EnvelopeStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Failure),
            1 => Ok(Self::Success),
            other => Err(format!("envelope status must be 0 or 1, got {other}")),
        }
    }
}

/// Response wrapper `{status, message, data?}`.
///
/// ## Invariants
/// - `status` and `message` are always present.
/// - `data` is omitted from the wire form when absent.
///
/// # Examples
/// ```
/// use accounts::domain::Envelope;
/// use serde_json::json;
///
/// let envelope: Envelope<()> = Envelope::failure("user not found");
/// assert_eq!(
///     serde_json::to_value(&envelope).unwrap(),
///     json!({ "status": 0, "message": "user not found" })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    status: EnvelopeStatus,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful outcome without a payload.
    pub fn success(message: impl Into<String>) -> Self {
        Self::build(EnvelopeStatus::Success, message, None)
    }

    /// Successful outcome carrying `data`.
    pub fn success_with(message: impl Into<String>, data: T) -> Self {
        Self::build(EnvelopeStatus::Success, message, Some(data))
    }

    /// Failed outcome without a payload.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::build(EnvelopeStatus::Failure, message, None)
    }

    /// Failed outcome carrying `data`, such as validation details.
    pub fn failure_with(message: impl Into<String>, data: T) -> Self {
        Self::build(EnvelopeStatus::Failure, message, Some(data))
    }

    fn build(status: EnvelopeStatus, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    pub fn status(&self) -> EnvelopeStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn success_with_data_serialises_payload() {
        let envelope = Envelope::success_with("user information", json!({ "id": 1 }));
        assert!(envelope.is_success());
        assert_eq!(
            serde_json::to_value(&envelope).expect("serialise"),
            json!({ "status": 1, "message": "user information", "data": { "id": 1 } })
        );
    }

    #[rstest]
    fn status_rejects_unknown_integers() {
        let result = serde_json::from_value::<Envelope<()>>(json!({ "status": 2, "message": "?" }));
        assert!(result.is_err());
    }

    #[rstest]
    fn missing_data_deserialises_to_none() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_value(json!({ "status": 0, "message": "user login failed" }))
                .expect("deserialise");
        assert_eq!(envelope.status(), EnvelopeStatus::Failure);
        assert_eq!(envelope.message(), "user login failed");
        assert!(envelope.data().is_none());
    }
}
