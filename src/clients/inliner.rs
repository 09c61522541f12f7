use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use log::debug;
use reqwest::{Client, header::CONTENT_TYPE};

use crate::clients::{
    errors::{Error, Result},
    policy::RequestPolicy,
};

/// Formats `bytes` as a `data:` URI with the given MIME type.
pub fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", BASE64_STANDARD.encode(bytes))
}

/// Turns remote images into self-contained data URIs.
#[derive(Debug, Clone)]
pub struct ImageInliner {
    http: Client,
    policy: RequestPolicy,
}

impl ImageInliner {
    pub fn new(http: Client, policy: RequestPolicy) -> Self {
        ImageInliner { http, policy }
    }

    /// Downloads `image_url` in full and encodes it.
    ///
    /// The MIME prefix is the response's `Content-Type` header verbatim (empty when the
    /// header is missing). Non-2xx responses are errors.
    pub async fn to_data_url(&self, image_url: &str) -> Result<String> {
        debug!("Inlining image {image_url}");
        let response = self.policy.send(|| self.http.get(image_url)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ImageFetch {
                url: image_url.to_string(),
                status,
            });
        }

        let content_type = match response.headers().get(CONTENT_TYPE) {
            Some(value) => value
                .to_str()
                .map_err(|e| Error::InvalidResponse(format!("bad image content type: {e}")))?
                .to_string(),
            None => String::new(),
        };
        let bytes = response.bytes().await?;
        debug!("Inlined {} bytes of {content_type:?}", bytes.len());

        Ok(data_url(&content_type, &bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_data_url() {
        assert_eq!(
            data_url("image/png", &[0x89, b'P', b'N', b'G']),
            "data:image/png;base64,iVBORw=="
        );
    }

    #[test]
    fn keeps_content_type_verbatim() {
        assert_eq!(
            data_url("image/jpeg; charset=binary", b"hi"),
            "data:image/jpeg; charset=binary;base64,aGk="
        );
    }
}
