use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use terrastream_common::AreaIndex;
use terrastream_terrain::{AreaData, AreaLoader, LoadError};

/// Errors from the streaming layer.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to spawn loader worker: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
struct LoadRequest {
    index: AreaIndex,
    ticket: u64,
}

/// A finished load, tagged with the ticket it was requested under.
pub struct LoadResult {
    pub index: AreaIndex,
    pub ticket: u64,
    pub result: Result<Box<dyn AreaData>, LoadError>,
}

impl std::fmt::Debug for LoadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadResult")
            .field("index", &self.index)
            .field("ticket", &self.ticket)
            .field("ok", &self.result.is_ok())
            .finish()
    }
}

/// Worker threads running an [`AreaLoader`] off the render thread.
///
/// Requests are served in submission order across workers; results come
/// back in completion order.
pub struct LoaderPool {
    requests: Option<Sender<LoadRequest>>,
    results: Receiver<LoadResult>,
    workers: Vec<JoinHandle<()>>,
}

impl LoaderPool {
    pub fn spawn(loader: Arc<dyn AreaLoader>, workers: usize) -> Result<Self, StreamError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let count = workers.max(1);
        let mut handles = Vec::with_capacity(count);
        for id in 0..count {
            let requests = request_rx.clone();
            let results = result_tx.clone();
            let loader = Arc::clone(&loader);
            let handle = std::thread::Builder::new()
                .name(format!("area-loader-{id}"))
                .spawn(move || {
                    for request in requests.iter() {
                        let _span =
                            tracing::debug_span!("load_area", index = %request.index).entered();
                        let result = loader.load(request.index);
                        let done = LoadResult {
                            index: request.index,
                            ticket: request.ticket,
                            result,
                        };
                        if results.send(done).is_err() {
                            break;
                        }
                    }
                })?;
            handles.push(handle);
        }
        tracing::debug!(workers = count, "loader pool started");

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            workers: handles,
        })
    }

    /// Queue a load. Returns false if the pool is shutting down.
    pub fn request(&self, index: AreaIndex, ticket: u64) -> bool {
        self.requests
            .as_ref()
            .is_some_and(|tx| tx.send(LoadRequest { index, ticket }).is_ok())
    }

    pub fn try_recv(&self) -> Option<LoadResult> {
        self.results.try_recv().ok()
    }

    /// Block for the next result, up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadResult> {
        match self.results.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for LoaderPool {
    fn drop(&mut self) {
        self.requests = None;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("loader worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrastream_terrain::{ProceduralLoader, TerrainShape};

    struct Failing;

    impl AreaLoader for Failing {
        fn load(&self, index: AreaIndex) -> Result<Box<dyn AreaData>, LoadError> {
            Err(LoadError::Failed {
                index,
                reason: "disk on fire".into(),
            })
        }
    }

    #[test]
    fn results_carry_their_ticket() {
        let loader = Arc::new(ProceduralLoader::new(3, TerrainShape::default()));
        let pool = LoaderPool::spawn(loader, 2).unwrap();
        assert!(pool.request(AreaIndex::new(1, 1), 7));
        assert!(pool.request(AreaIndex::new(2, 1), 8));

        let mut got: Vec<_> = (0..2)
            .map(|_| pool.recv_timeout(Duration::from_secs(10)).unwrap())
            .map(|r| (r.index, r.ticket, r.result.is_ok()))
            .collect();
        got.sort();
        assert_eq!(
            got,
            vec![(AreaIndex::new(1, 1), 7, true), (AreaIndex::new(2, 1), 8, true)]
        );
        assert!(pool.try_recv().is_none());
    }

    #[test]
    fn loader_errors_are_returned_not_swallowed() {
        let pool = LoaderPool::spawn(Arc::new(Failing), 1).unwrap();
        pool.request(AreaIndex::new(4, 4), 1);
        let done = pool.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(done.result, Err(LoadError::Failed { .. })));
    }

    #[test]
    fn zero_workers_still_spawns_one() {
        let pool = LoaderPool::spawn(Arc::new(Failing), 0).unwrap();
        assert_eq!(pool.workers(), 1);
    }
}
