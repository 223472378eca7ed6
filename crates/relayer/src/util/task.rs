use std::thread;

use tracing::Span;

use crate::error::Error;

/// Runs `task` to completion on a dedicated, named thread, inside `span`.
pub fn spawn_task<T, F>(name: String, span: Span, task: F) -> Result<thread::JoinHandle<T>, Error>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(move || {
            let _entered = span.enter();
            task()
        })
        .map_err(Error::spawn)
}
