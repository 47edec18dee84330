use osmz::Progress;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const INTERVAL: Duration = Duration::from_millis(200);

/// Prints how far a decompressor got, sampled from a separate thread.
pub struct ProgressReporter {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn spawn(name: String, progress: Arc<Progress>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = stop.clone();
            thread::spawn(move || {
                loop {
                    let finished = stop.load(Ordering::Acquire);
                    report(&name, &progress);
                    if finished {
                        break;
                    }
                    thread::sleep(INTERVAL);
                }
                eprintln!();
            })
        };

        Self {
            stop,
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

fn report(name: &str, progress: &Progress) {
    let offset = progress.offset();
    let size = progress.file_size();
    let mut err = io::stderr().lock();
    let _ = if size > 0 {
        write!(err, "\r{}: {:>3}%", name, offset * 100 / size)
    } else {
        write!(err, "\r{}: {} bytes", name, offset)
    };
    let _ = err.flush();
}
