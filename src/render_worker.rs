//! Off-thread rendering for large images.
//!
//! The worker owns one thread and two channels. Jobs carry an `Arc` of the
//! original, so submitting never copies pixels. Each job is stamped with a
//! generation number; the worker drains its queue before rendering and only
//! renders the newest job it has seen, and [`RenderWorker::latest`] only
//! hands out a result for the most recently submitted generation. A
//! superseded render is dropped, never queued behind the current one.
//!
//! ```text
//! submit(g=1) submit(g=2) submit(g=3)
//!      │           │           │
//!      └───────────┴───────────┴──▶ worker: drain → render g=3 → result
//! ```

use crate::imaging::{AdjustmentParameters, PixelBuffer, render};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

struct RenderJob {
    generation: u64,
    original: Arc<PixelBuffer>,
    params: AdjustmentParameters,
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    pub generation: u64,
    pub params: AdjustmentParameters,
    pub canvas: PixelBuffer,
}

pub struct RenderWorker {
    jobs: Option<Sender<RenderJob>>,
    results: Receiver<RenderResult>,
    thread: Option<JoinHandle<()>>,
    submitted: u64,
    latest: Option<RenderResult>,
}

impl RenderWorker {
    /// Start the worker thread.
    pub fn spawn() -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<RenderJob>();
        let (result_tx, result_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("retouch-render".into())
            .spawn(move || run(job_rx, result_tx))?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            thread: Some(thread),
            submitted: 0,
            latest: None,
        })
    }

    /// Queue a render and return its generation.
    pub fn submit(&mut self, original: Arc<PixelBuffer>, params: AdjustmentParameters) -> u64 {
        self.submitted += 1;
        let job = RenderJob {
            generation: self.submitted,
            original,
            params,
        };
        let sent = self.jobs.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !sent {
            warn!(generation = self.submitted, "render worker is gone; job dropped");
        }
        self.submitted
    }

    /// Generation of the most recent submission (0 before the first).
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    /// The result for the newest submission, if it has arrived.
    pub fn latest(&mut self) -> Option<&RenderResult> {
        while let Ok(result) = self.results.try_recv() {
            self.accept(result);
        }
        self.current()
    }

    /// Block until the newest submission has rendered.
    ///
    /// Returns `None` if nothing was submitted or the worker stopped.
    pub fn wait_latest(&mut self) -> Option<&RenderResult> {
        if self.submitted == 0 {
            return None;
        }
        while self.current().is_none() {
            match self.results.recv() {
                Ok(result) => self.accept(result),
                Err(_) => return None,
            }
        }
        self.current()
    }

    fn accept(&mut self, result: RenderResult) {
        if result.generation == self.submitted {
            self.latest = Some(result);
        } else {
            debug!(
                generation = result.generation,
                latest = self.submitted,
                "stale render discarded"
            );
        }
    }

    fn current(&self) -> Option<&RenderResult> {
        self.latest
            .as_ref()
            .filter(|r| r.generation == self.submitted)
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

fn run(jobs: Receiver<RenderJob>, results: Sender<RenderResult>) {
    while let Ok(mut job) = jobs.recv() {
        while let Ok(newer) = jobs.try_recv() {
            debug!(skipped = job.generation, "render superseded before start");
            job = newer;
        }
        let canvas = render(&job.original, &job.params);
        let result = RenderResult {
            generation: job.generation,
            params: job.params,
            canvas,
        };
        if results.send(result).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Slider;
    use crate::test_helpers::{assert_same_pixels, gradient};

    fn params(slider: Slider, value: i32) -> AdjustmentParameters {
        let mut p = AdjustmentParameters::neutral();
        p.set(slider, value);
        p
    }

    #[test]
    fn renders_like_the_pipeline() {
        let original = Arc::new(gradient(24, 16));
        let p = params(Slider::Contrast, 35);
        let mut worker = RenderWorker::spawn().unwrap();
        let generation = worker.submit(Arc::clone(&original), p);

        let result = worker.wait_latest().unwrap();
        assert_eq!(result.generation, generation);
        assert_eq!(result.params, p);
        assert_same_pixels(&result.canvas, &render(&original, &p));
    }

    #[test]
    fn only_newest_submission_is_returned() {
        let original = Arc::new(gradient(32, 32));
        let mut worker = RenderWorker::spawn().unwrap();
        for v in 1..=5 {
            worker.submit(Arc::clone(&original), params(Slider::Brightness, v * 10));
        }
        let result = worker.wait_latest().unwrap();
        assert_eq!(result.generation, 5);
        assert_eq!(result.params.brightness, 50);
    }

    #[test]
    fn latest_hides_results_of_older_generations() {
        let original = Arc::new(gradient(8, 8));
        let mut worker = RenderWorker::spawn().unwrap();
        worker.submit(Arc::clone(&original), params(Slider::Blur, 10));
        assert_eq!(worker.wait_latest().unwrap().generation, 1);

        worker.submit(Arc::clone(&original), params(Slider::Blur, 20));
        if let Some(result) = worker.latest() {
            assert_eq!(result.generation, 2);
        }
        assert_eq!(worker.wait_latest().unwrap().params.blur, 20);
    }

    #[test]
    fn nothing_submitted_means_no_result() {
        let mut worker = RenderWorker::spawn().unwrap();
        assert!(worker.latest().is_none());
        assert!(worker.wait_latest().is_none());
        assert_eq!(worker.submitted(), 0);
    }
}
