//! Path based dispatch on top of `matchit`.

use std::fmt;

use async_trait::async_trait;
use http::StatusCode;
use thiserror::Error;
use tracing::trace;

use crate::handler::{Handler, make_handler};
use crate::protocol::{Reply, Request};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route: {source}")]
    Insert {
        #[from]
        source: matchit::InsertError,
    },
}

/// A routing table mapping request paths to handlers.
///
/// Routes use `matchit` syntax, `{name}` segments are captured and exposed through
/// [`Request::path_param`]. Requests that match no route go to the fallback handler,
/// which replies `404 Not Found` unless replaced.
pub struct Routes {
    router: matchit::Router<Box<dyn Handler>>,
    fallback: Box<dyn Handler>,
}

impl Routes {
    pub fn new() -> Self {
        Self { router: matchit::Router::new(), fallback: Box::new(make_handler(not_found)) }
    }

    pub fn route(mut self, path: impl Into<String>, handler: impl Handler + 'static) -> Result<Self, RouteError> {
        self.router.insert(path, Box::new(handler) as Box<dyn Handler>)?;
        Ok(self)
    }

    pub fn fallback(mut self, handler: impl Handler + 'static) -> Self {
        self.fallback = Box::new(handler);
        self
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Routes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routes").finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for Routes {
    async fn handle(&self, path: &str, mut request: Request) -> Reply {
        match self.router.at(path) {
            Ok(matched) => {
                let params = matched.params.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();
                request.set_path_params(params);
                matched.value.handle(path, request).await
            }
            Err(e) => {
                trace!(path, cause = %e, "no route matched, using fallback");
                self.fallback.handle(path, request).await
            }
        }
    }
}

async fn not_found(_request: Request) -> Reply {
    Reply::from_status(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Uri, Version};

    fn request(uri: &'static str) -> Request {
        Request::new(Method::GET, Uri::from_static(uri), Version::HTTP_11)
    }

    fn routes() -> Routes {
        Routes::new()
            .route("/hello", make_handler(|_request: Request| async { Reply::ok().with_body("hello") }))
            .unwrap()
            .route(
                "/users/{id}",
                make_handler(|request: Request| async move {
                    Reply::ok().with_body(format!("user {}", request.path_param("id").unwrap_or_default()))
                }),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn dispatch_by_path() {
        let routes = routes();

        let reply = routes.handle("/hello", request("/hello?lang=en")).await;
        assert_eq!(&reply.body()[..], b"hello");

        let reply = routes.handle("/users/42", request("/users/42")).await;
        assert_eq!(&reply.body()[..], b"user 42");
    }

    #[tokio::test]
    async fn default_fallback_is_not_found() {
        let reply = routes().handle("/missing", request("/missing")).await;

        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
        assert_eq!(&reply.body()[..], b"Not Found");
    }

    #[tokio::test]
    async fn custom_fallback() {
        let routes = routes().fallback(make_handler(|_request: Request| async { Reply::new(StatusCode::GONE) }));

        let reply = routes.handle("/missing", request("/missing")).await;

        assert_eq!(reply.status(), StatusCode::GONE);
    }

    #[test]
    fn conflicting_route() {
        let result = routes().route("/hello", make_handler(|_request: Request| async { Reply::ok() }));

        assert!(matches!(result, Err(RouteError::Insert { .. })));
    }
}
