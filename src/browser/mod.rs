pub mod connection;
pub mod headless;

use std::fmt::Display;

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

pub use connection::connect_to_browser;
pub use headless::launch_browser;

/// 持续处理浏览器事件，直到连接关闭
///
/// 单个事件出错只记日志，循环继续。返回出错的事件数。
pub(crate) async fn drive_events<S, T, E>(mut events: S) -> usize
where
    S: Stream<Item = Result<T, E>> + Unpin,
    E: Display,
{
    let mut errors = 0;
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            errors += 1;
            warn!("浏览器事件处理出错（继续）: {}", e);
        }
    }
    debug!("浏览器事件循环结束");
    errors
}
