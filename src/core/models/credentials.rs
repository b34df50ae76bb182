use super::VisionError;

/// Key and endpoint pair for one session.
#[derive(Clone, PartialEq)]
pub struct ServiceCredentials {
    pub api_key: String,
    pub endpoint: String,
}

impl std::fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ServiceCredentials {
    pub fn validated(api_key: &str, endpoint: &str) -> Result<Self, VisionError> {
        let api_key = api_key.trim();
        let endpoint = endpoint.trim();

        if api_key.is_empty() {
            return Err(VisionError::MissingCredential);
        }
        if endpoint.is_empty() {
            return Err(VisionError::MissingEndpoint);
        }

        Ok(Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}
