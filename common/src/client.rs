use log::debug;
use url::Url;

use crate::{decode_body, Instance, WidgetConfig, WidgetError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange. Only transport-level failures are errors here;
/// status codes are judged by [`ChallengeClient`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, WidgetError>;
}

impl<T> Transport for &T
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, WidgetError> {
        (**self).send(request).await
    }
}

/// Source of the CSRF token echoed back on every request.
pub trait CredentialProvider {
    fn csrf_token(&self) -> Option<String>;
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<String>,
{
    fn csrf_token(&self) -> Option<String> {
        self()
    }
}

/// Looks up `name` in a `document.cookie` style string (`a=1; b=2`).
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
}

/// Builds the challenge API URL for the page at `page_url`: query and fragment
/// are dropped and `segment` is appended as one more path segment.
pub fn challenge_url(page_url: &str, segment: &str) -> Result<Url, WidgetError> {
    let mut url = Url::parse(page_url)?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

pub struct ChallengeClient<T, C> {
    transport: T,
    credentials: C,
    url: Url,
    csrf_header: String,
}

impl<T, C> ChallengeClient<T, C>
where
    T: Transport,
    C: CredentialProvider,
{
    pub fn new(
        page_url: &str,
        transport: T,
        credentials: C,
        config: &WidgetConfig,
    ) -> Result<Self, WidgetError> {
        Ok(Self {
            transport,
            credentials,
            url: challenge_url(page_url, &config.endpoint_path)?,
            csrf_header: config.csrf_header.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn status(&self) -> Result<Option<Instance>, WidgetError> {
        let response = self.call(Method::Get).await?;
        Ok(decode_body(&response.body)?.map(Instance::from))
    }

    pub async fn create(&self) -> Result<Option<Instance>, WidgetError> {
        let response = self.call(Method::Post).await?;
        Ok(decode_body(&response.body)?.map(Instance::from))
    }

    pub async fn delete(&self) -> Result<(), WidgetError> {
        self.call(Method::Delete).await?;
        Ok(())
    }

    async fn call(&self, method: Method) -> Result<ApiResponse, WidgetError> {
        let mut headers = Vec::with_capacity(1);
        match self.credentials.csrf_token() {
            Some(token) => headers.push((self.csrf_header.clone(), token)),
            None if method == Method::Get => debug!("no CSRF token, sending GET without it"),
            None => return Err(WidgetError::MissingCsrfToken),
        }

        let request = ApiRequest {
            method,
            url: self.url.to_string(),
            headers,
        };
        debug!("{} {}", method.as_str(), request.url);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(WidgetError::Status(response.status));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTransport, Reply};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const PAGE: &str = "https://ctf.example/problem/pwn1";

    fn token() -> Option<String> {
        Some("s3cr3t".to_string())
    }

    fn no_token() -> Option<String> {
        None
    }

    #[test_case("csrftoken=abc; sessionid=xyz", "csrftoken", Some("abc") ; "first")]
    #[test_case("sessionid=xyz;csrftoken=abc", "csrftoken", Some("abc") ; "last without space")]
    #[test_case("  csrftoken = abc ", "csrftoken", Some("abc") ; "padded")]
    #[test_case("mycsrftoken=nope", "csrftoken", None ; "suffix match is not a match")]
    #[test_case("", "csrftoken", None ; "empty")]
    #[test_case("flag", "csrftoken", None ; "no equals sign")]
    fn reads_cookie(cookies: &str, name: &str, expected: Option<&str>) {
        assert_eq!(cookie_value(cookies, name).as_deref(), expected);
    }

    #[test_case("https://ctf.example/problem/pwn1", "https://ctf.example/problem/pwn1/challenge" ; "plain")]
    #[test_case("https://ctf.example/problem/pwn1/", "https://ctf.example/problem/pwn1/challenge" ; "trailing slash")]
    #[test_case("https://ctf.example/problem/pwn1?tab=2#top", "https://ctf.example/problem/pwn1/challenge" ; "query and fragment")]
    fn builds_challenge_url(page: &str, expected: &str) {
        assert_eq!(challenge_url(page, "challenge").unwrap().as_str(), expected);
    }

    #[test]
    fn rejects_unusable_page_url() {
        assert!(matches!(
            challenge_url("not a url", "challenge"),
            Err(WidgetError::InvalidPageUrl(_))
        ));
        assert!(matches!(
            challenge_url("mailto:someone@example.com", "challenge"),
            Err(WidgetError::InvalidPageUrl(_))
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn attaches_csrf_header_and_decodes_instance() {
        let body = crate::testing::body(Utc::now(), 600, "team-7", 2);
        let transport = FakeTransport::new([Reply::ok(&body)]);
        let client = ChallengeClient::new(PAGE, &transport, token, &WidgetConfig::default()).unwrap();

        let instance = client.status().await.unwrap().unwrap();

        assert_eq!(instance.endpoints.len(), 2);
        assert_eq!(
            transport.requests(),
            vec![ApiRequest {
                method: Method::Get,
                url: "https://ctf.example/problem/pwn1/challenge".to_string(),
                headers: vec![("X-CSRFToken".to_string(), "s3cr3t".to_string())],
            }]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn get_without_token_is_still_sent() {
        let transport = FakeTransport::new([Reply::ok("null")]);
        let client =
            ChallengeClient::new(PAGE, &transport, no_token, &WidgetConfig::default()).unwrap();

        assert_eq!(client.status().await.unwrap(), None);
        assert!(transport.requests()[0].headers.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn state_changes_require_a_token() {
        let transport = FakeTransport::default();
        let client =
            ChallengeClient::new(PAGE, &transport, no_token, &WidgetConfig::default()).unwrap();

        assert!(matches!(
            client.create().await,
            Err(WidgetError::MissingCsrfToken)
        ));
        assert!(matches!(
            client.delete().await,
            Err(WidgetError::MissingCsrfToken)
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn non_success_status_is_an_error() {
        let transport = FakeTransport::new([Reply::status(403, "Forbidden")]);
        let client = ChallengeClient::new(PAGE, &transport, token, &WidgetConfig::default()).unwrap();

        assert!(matches!(
            client.delete().await,
            Err(WidgetError::Status(403))
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_ignores_the_body() {
        let transport = FakeTransport::new([Reply::ok("<not json>")]);
        let client = ChallengeClient::new(PAGE, &transport, token, &WidgetConfig::default()).unwrap();

        assert!(client.delete().await.is_ok());
        assert_eq!(transport.requests()[0].method, Method::Delete);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn network_failure_propagates() {
        let transport = FakeTransport::new([Reply::Offline]);
        let client = ChallengeClient::new(PAGE, &transport, token, &WidgetConfig::default()).unwrap();

        assert!(matches!(
            client.create().await,
            Err(WidgetError::Network(_))
        ));
    }
}
