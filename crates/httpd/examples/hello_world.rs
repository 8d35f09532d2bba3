use std::sync::Arc;

use http::StatusCode;
use micro_httpd::handler::{Routes, make_handler};
use micro_httpd::protocol::{Reply, Request};
use micro_httpd::server::HttpServer;
use tokio::net::TcpListener;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let routes = match Routes::new()
        .route("/", make_handler(hello_world))
        .and_then(|routes| routes.route("/echo", make_handler(echo)))
        .and_then(|routes| routes.route("/status/{code}", make_handler(status)))
    {
        Ok(routes) => routes,
        Err(e) => {
            error!(cause = %e, "invalid routes");
            return;
        }
    };

    let server = match HttpServer::builder().handler(routes).build() {
        Ok(server) => Arc::new(server),
        Err(e) => {
            error!(cause = %e, "build server error");
            return;
        }
    };

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = tokio::select! {
            accepted = tcp_listener.accept() => match accepted {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        };

        let server = Arc::clone(&server);
        tokio::spawn(async move {
            let (reader, writer) = tcp_stream.into_split();
            server.serve_connection(reader, writer, Some(remote_addr)).await;
        });
    }

    server.stop().await;
    info!(stats = ?server.stats(), "bye");
}

async fn hello_world(request: Request) -> Reply {
    let name = request.query_param("name").unwrap_or("World");
    Reply::ok().with_content_type(&mime::TEXT_PLAIN_UTF_8).with_body(format!("Hello {name}!\r\n"))
}

async fn echo(request: Request) -> Reply {
    let content_type = request.headers().get("Content-Type").cloned();
    let reply = Reply::ok().with_body(request.body().cloned().unwrap_or_default());
    match content_type {
        Some(content_type) => reply.with_header("Content-Type", content_type),
        None => reply,
    }
}

async fn status(request: Request) -> Reply {
    let code = request.path_param("code").and_then(|code| code.parse::<u16>().ok());
    match code.and_then(|code| StatusCode::from_u16(code).ok()) {
        Some(code) => Reply::from_status(code),
        None => Reply::from_status(StatusCode::BAD_REQUEST),
    }
}
