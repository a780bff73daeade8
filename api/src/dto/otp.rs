use serde::{Deserialize, Serialize};

/// Request body for `POST /otp/{phone}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmitCodeRequest {
    /// Code the user received
    #[serde(default)]
    pub code: Option<String>,
}

impl SubmitCodeRequest {
    /// Extract the submitted code from a raw body
    ///
    /// Malformed JSON and a missing or empty `code` all come back as `None`;
    /// the verify path reports those as a bad request only once it knows the
    /// phone number has an active code.
    pub fn code_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<SubmitCodeRequest>(body)
            .ok()
            .and_then(|request| request.code)
            .filter(|code| !code.is_empty())
    }
}
