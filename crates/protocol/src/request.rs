use std::fmt;

use base64::{Engine as _, engine::general_purpose};

use crate::{MAX_CREDENTIALS_LEN, MAX_REQUEST_LEN, ProtocolError, USER_AGENT};

/// Standard RFC 4648 base64 with `=` padding and no line wrapping.
pub fn encode_base64(input: &[u8]) -> String {
    general_purpose::STANDARD.encode(input)
}

/// HTTP Basic credentials for the caster.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Returns the `Basic` token, i.e. base64 of `user:password`.
    pub fn basic_token(&self) -> Result<String, ProtocolError> {
        let raw = format!("{}:{}", self.user, self.password);
        if raw.len() > MAX_CREDENTIALS_LEN {
            return Err(ProtocolError::CredentialsTooLong(raw.len()));
        }
        Ok(encode_base64(raw.as_bytes()))
    }
}

// Keeps the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// The GET request sent to a caster for one mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtripRequest {
    pub mount: String,
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
}

impl NtripRequest {
    /// Formats the request, ending with the blank line.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let mut request = format!(
            "GET /{} HTTP/1.1\r\n\
             Host: {}:{}\r\n\
             Ntrip-Version: Ntrip/2.0\r\n\
             User-Agent: {USER_AGENT}\r\n",
            self.mount, self.host, self.port
        );

        if let Some(credentials) = &self.credentials {
            request.push_str(&format!(
                "Authorization: Basic {}\r\n",
                credentials.basic_token()?
            ));
        }
        request.push_str("\r\n");

        if request.len() > MAX_REQUEST_LEN {
            return Err(ProtocolError::RequestTooLong(request.len()));
        }
        Ok(request)
    }
}
