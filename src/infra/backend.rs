//! Shared HTTP client for the hosted backend.

use reqwest::{Client, Method, RequestBuilder, Url};

use super::error::InfraError;

/// Base address and credentials of the backend project.
///
/// Every request carries the project's anonymous key as `apikey`. The bearer
/// token is the signed-in actor's access token when one is configured, and
/// the anonymous key otherwise.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        anon_key: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, InfraError> {
        let base = Url::parse(base_url)
            .and_then(|url| url.join("/"))
            .map_err(|err| {
                InfraError::configuration(format!("invalid backend URL `{base_url}`: {err}"))
            })?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            client,
            base,
            anon_key: anon_key.into(),
            access_token,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join(path)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised_to_root() {
        let client = BackendClient::new("https://demo.example.co/some/path", "anon", None)
            .expect("client");
        assert_eq!(client.base().as_str(), "https://demo.example.co/");
        assert_eq!(
            client.url("rest/v1/posts").expect("url").as_str(),
            "https://demo.example.co/rest/v1/posts"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = BackendClient::new("not a url", "anon", None).expect_err("invalid");
        assert!(matches!(err, InfraError::Configuration { .. }));
    }
}
