//! Request handlers.
//!
//! A [`Handler`] turns a parsed [`Request`] into a [`Reply`]. It never fails: ordinary
//! application errors are expressed as an error-status reply (see [`Reply::from_status`]).
//! [`make_handler`] adapts an async function, and [`Routes`] dispatches on the request path.

use std::sync::Arc;

use async_trait::async_trait;

use crate::protocol::{Reply, Request};

mod routes;

pub use routes::RouteError;
pub use routes::Routes;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, path: &str, request: Request) -> Reply;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, path: &str, request: Request) -> Reply {
        self.as_ref().handle(path, request).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn handle(&self, path: &str, request: Request) -> Reply {
        self.as_ref().handle(path, request).await
    }
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Reply> + Send,
{
    async fn handle(&self, _path: &str, request: Request) -> Reply {
        (self.f)(request).await
    }
}

/// Wraps an async function into a [`Handler`].
///
/// ```
/// use micro_httpd::handler::make_handler;
/// use micro_httpd::protocol::{Reply, Request};
///
/// let handler = make_handler(|request: Request| async move {
///     Reply::ok().with_body(format!("hello {}", request.path()))
/// });
/// ```
pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future<Output = Reply>,
{
    HandlerFn { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Uri, Version};

    #[tokio::test]
    async fn handler_fn() {
        let handler = make_handler(|request: Request| async move { Reply::ok().with_body(request.path().to_owned()) });

        let request = Request::new(Method::GET, Uri::from_static("/ping?x=1"), Version::HTTP_11);
        let reply = handler.handle("/ping", request).await;

        assert_eq!(&reply.body()[..], b"/ping");
    }

    #[tokio::test]
    async fn shared_handler() {
        let handler: Arc<dyn Handler> = Arc::new(make_handler(|_request: Request| async { Reply::ok() }));

        let request = Request::new(Method::GET, Uri::from_static("/"), Version::HTTP_10);
        let reply = handler.handle("/", request).await;

        assert_eq!(reply.status(), http::StatusCode::OK);
    }
}
