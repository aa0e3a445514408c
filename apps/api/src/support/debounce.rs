//! Trailing-edge debounce: the callback runs once input has been idle for the
//! window, with the most recent value.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

/// Must be created inside a tokio runtime. Dropping it discards any pending
/// value without invoking the callback.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(window: Duration, mut callback: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let task = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => return,
                        },
                        _ = tokio::time::sleep(window) => {
                            callback(latest);
                            break;
                        }
                    }
                }
            }
        });
        Self { tx, task }
    }

    /// Records a new input and restarts the idle window.
    pub fn call(&self, value: T) {
        // Send only fails once the worker has stopped, i.e. during drop.
        let _ = self.tx.send(value);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(String) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v: String| sink.lock().unwrap().push(v))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_inputs_fire_once_with_last_value() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(500), callback);

        for input in ["r", "ru", "rus", "rust"] {
            debouncer.call(input.to_string());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["rust".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inputs_separated_by_window_fire_separately() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(500), callback);

        debouncer.call("py".to_string());
        tokio::time::sleep(Duration::from_millis(700)).await;
        debouncer.call("go".to_string());
        tokio::time::sleep(Duration::from_millis(700)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["py".to_string(), "go".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_fires_before_window_elapses() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(500), callback);

        debouncer.call("ja".to_string());
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(seen.lock().unwrap().is_empty());
        drop(debouncer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_value() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(500), callback);
        debouncer.call("lost".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(debouncer);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(seen.lock().unwrap().is_empty());
    }
}
