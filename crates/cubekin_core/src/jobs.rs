use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Background pool for work that must never stall the frame loop
/// (world metadata requests today).
pub struct JobSystem {
    pool: ThreadPool,
}

impl JobSystem {
    pub fn new(num_threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|index| format!("cubekin-job-{index}"));
        if let Some(count) = num_threads {
            builder = builder.num_threads(count);
        }

        let pool = builder.build()?;
        Ok(Self { pool })
    }

    /// Fire-and-forget; results travel back over an event channel.
    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::JobSystem;
    use crate::events::channel;

    #[test]
    fn spawned_job_reports_back_over_channel() {
        let jobs = JobSystem::new(Some(1)).expect("build pool");
        assert_eq!(jobs.thread_count(), 1);

        let (tx, rx) = channel();
        jobs.spawn(move || {
            tx.send(42u32);
        });

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Some(42));
    }
}
