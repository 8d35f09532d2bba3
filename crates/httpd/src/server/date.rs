//! Cached `Date` header value.
//!
//! Formatting an HTTP date on every reply is wasted work at high request rates, so the
//! value is rendered by a background task and swapped in atomically.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use bytes::Bytes;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const DEFAULT_DATE_INTERVAL: Duration = Duration::from_millis(800);

/// Keeps the current HTTP date string, refreshed every `update_interval`.
///
/// The refresh task is aborted when the service is dropped.
#[derive(Debug)]
pub struct DateService {
    current: Arc<ArcSwap<Bytes>>,
    handle: JoinHandle<()>,
}

impl DateService {
    /// Starts the refresh task on the given runtime.
    pub fn start(runtime: &Handle, update_interval: Duration) -> Self {
        let current = Arc::new(ArcSwap::from_pointee(render_date()));
        let current_arc = Arc::clone(&current);

        let handle = runtime.spawn(async move {
            loop {
                tokio::time::sleep(update_interval).await;
                current_arc.store(Arc::new(render_date()));
            }
        });

        Self { current, handle }
    }

    /// The date string, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
    pub fn current_date(&self) -> Bytes {
        self.current.load().as_ref().clone()
    }
}

impl Drop for DateService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn render_date() -> Bytes {
    let mut buf = faf_http_date::get_date_buff_no_key();
    faf_http_date::get_date_no_key(&mut buf);
    Bytes::from_owner(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_http_date(date: &[u8]) -> bool {
        let date = std::str::from_utf8(date).unwrap();
        date.len() == 29 && date.ends_with(" GMT") && date.as_bytes()[3] == b','
    }

    #[tokio::test]
    async fn renders_http_date() {
        let service = DateService::start(&Handle::current(), DEFAULT_DATE_INTERVAL);

        assert!(is_http_date(&service.current_date()));
    }

    #[tokio::test]
    async fn refreshes_in_background() {
        let service = DateService::start(&Handle::current(), Duration::from_millis(10));
        let before = service.current.load_full();

        tokio::time::sleep(Duration::from_millis(50)).await;

        let after = service.current.load_full();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(is_http_date(&after));
    }
}
