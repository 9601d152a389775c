//! Collective communication between distributed workers.
//!
//! The distributed search loop only needs three collectives: a barrier,
//! a minimum reduction to a root rank, and a scalar broadcast from a root.
//! [`Communicator`] captures exactly that surface so the loop can run on
//! any backend that provides it.
//!
//! [`LocalCluster`] is the in-process backend: every rank is an OS thread
//! with its own stack and its own data, and ranks talk only through
//! point-to-point channels. Messages between one pair of ranks are
//! delivered in send order, and every rank calls the collectives in the
//! same order, so no message tagging is needed.
//!
//! # Failure model
//!
//! There is no partial-failure handling. When a rank returns an error or
//! panics, its channel endpoints are dropped and any peer waiting on it in
//! a collective receives [`JsaError::Collective`], which in turn makes that
//! peer fail. The whole run fails together.

use crate::error::{JsaError, Result};
use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::debug;

/// Collective operations available to a distributed worker.
pub trait Communicator {
    /// This worker's rank in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of ranks in the run.
    fn size(&self) -> usize;

    /// Blocks until every rank has entered the barrier.
    fn barrier(&self) -> Result<()>;

    /// Reduces `value` with `min` across all ranks.
    ///
    /// Returns `Some(minimum)` on `root` and `None` on every other rank.
    fn reduce_min(&self, value: f64, root: usize) -> Result<Option<f64>>;

    /// Broadcasts `value` from `root`; every rank returns the root's value.
    ///
    /// The argument is ignored on non-root ranks.
    fn broadcast(&self, value: f64, root: usize) -> Result<f64>;

    /// Minimum reduction to `root` followed by a broadcast of the result.
    fn all_reduce_min(&self, value: f64, root: usize) -> Result<f64> {
        let reduced = self.reduce_min(value, root)?;
        self.broadcast(reduced.unwrap_or(value), root)
    }
}

/// Endpoint of one rank in a [`LocalCluster`].
pub struct LocalComm {
    rank: usize,
    size: usize,
    // outgoing[p] delivers to rank p, incoming[p] receives from rank p.
    // The self slots are never used.
    outgoing: Vec<Sender<f64>>,
    incoming: Vec<Receiver<f64>>,
}

impl LocalComm {
    fn send(&self, to: usize, value: f64) -> Result<()> {
        self.outgoing[to].send(value).map_err(|_| JsaError::Collective {
            rank: self.rank,
            reason: format!("rank {to} is gone"),
        })
    }

    fn recv(&self, from: usize) -> Result<f64> {
        self.incoming[from].recv().map_err(|_| JsaError::Collective {
            rank: self.rank,
            reason: format!("rank {from} disconnected"),
        })
    }

    fn check_root(&self, root: usize) -> Result<()> {
        if root >= self.size {
            return Err(JsaError::Collective {
                rank: self.rank,
                reason: format!("root {root} out of range for {} ranks", self.size),
            });
        }
        Ok(())
    }

    fn peers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(move |&p| p != self.rank)
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<()> {
        debug!(event = "barrier", rank = self.rank);
        // gather to rank 0, then release everyone
        if self.rank == 0 {
            for p in self.peers() {
                self.recv(p)?;
            }
            for p in self.peers() {
                self.send(p, 0.0)?;
            }
        } else {
            self.send(0, 0.0)?;
            self.recv(0)?;
        }
        Ok(())
    }

    fn reduce_min(&self, value: f64, root: usize) -> Result<Option<f64>> {
        self.check_root(root)?;
        if self.rank != root {
            self.send(root, value)?;
            return Ok(None);
        }
        let mut min = value;
        for p in self.peers() {
            min = min.min(self.recv(p)?);
        }
        debug!(event = "reduce", rank = self.rank, op = "min", value = min);
        Ok(Some(min))
    }

    fn broadcast(&self, value: f64, root: usize) -> Result<f64> {
        self.check_root(root)?;
        if self.rank == root {
            for p in self.peers() {
                self.send(p, value)?;
            }
            Ok(value)
        } else {
            self.recv(root)
        }
    }
}

/// In-process cluster running one thread per rank.
pub struct LocalCluster;

impl LocalCluster {
    /// Creates fully connected endpoints for `size` ranks.
    pub fn endpoints(size: usize) -> Vec<LocalComm> {
        let mut outgoing: Vec<Vec<Sender<f64>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut incoming: Vec<Vec<Receiver<f64>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
        for from in 0..size {
            for to in 0..size {
                let (tx, rx) = unbounded();
                outgoing[from].push(tx);
                // pushed in `from` order for every `to`
                incoming[to].push(rx);
            }
        }
        outgoing
            .into_iter()
            .zip(incoming)
            .enumerate()
            .map(|(rank, (outgoing, incoming))| LocalComm {
                rank,
                size,
                outgoing,
                incoming,
            })
            .collect()
    }

    /// Runs `worker` on `size` ranks concurrently and returns the per-rank
    /// results in rank order.
    ///
    /// Each rank owns its endpoint; it is dropped when the worker returns,
    /// so a failing rank disconnects from its peers.
    ///
    /// # Errors
    /// Returns the error of the lowest-numbered failing rank, which may be a
    /// [`JsaError::Collective`] caused by another rank's failure, or
    /// [`JsaError::WorkerPanicked`] if that rank panicked.
    pub fn run<T, F>(size: usize, worker: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(LocalComm) -> Result<T> + Sync,
    {
        if size == 0 {
            return Err(JsaError::Config("cluster needs at least one rank".into()));
        }
        let endpoints = Self::endpoints(size);
        let worker = &worker;

        let outcomes: Vec<std::thread::Result<Result<T>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = endpoints
                .into_iter()
                .map(|comm| scope.spawn(move || worker(comm)))
                .collect();
            handles.into_iter().map(|h| h.join()).collect()
        });

        outcomes
            .into_iter()
            .enumerate()
            .map(|(rank, outcome)| {
                outcome
                    .map_err(|_| JsaError::WorkerPanicked(rank))
                    .and_then(|result| result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_rank_collectives() {
        let results = LocalCluster::run(1, |comm| {
            comm.barrier()?;
            let r = comm.reduce_min(4.0, 0)?;
            let b = comm.broadcast(9.0, 0)?;
            Ok((r, b))
        })
        .unwrap();
        assert_eq!(results, vec![(Some(4.0), 9.0)]);
    }

    #[test]
    fn test_reduce_min_only_on_root() {
        let results = LocalCluster::run(4, |comm| {
            let value = [7.0, 3.0, 5.0, 4.0][comm.rank()];
            comm.reduce_min(value, 2)
        })
        .unwrap();
        assert_eq!(results, vec![None, None, Some(3.0), None]);
    }

    #[test]
    fn test_all_reduce_min_everyone_agrees() {
        let values = [12.5, 8.0, f64::INFINITY, 9.25, 8.5];
        let results = LocalCluster::run(values.len(), |comm| {
            comm.all_reduce_min(values[comm.rank()], 0)
        })
        .unwrap();
        assert!(results.iter().all(|&v| v == 8.0), "{results:?}");
    }

    #[test]
    fn test_broadcast_from_non_zero_root() {
        let results = LocalCluster::run(3, |comm| {
            let mine = comm.rank() as f64 * 10.0;
            comm.broadcast(mine, 1)
        })
        .unwrap();
        assert_eq!(results, vec![10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_repeated_collectives_stay_ordered() {
        let results = LocalCluster::run(3, |comm| {
            let mut out = Vec::new();
            for round in 0..20 {
                let v = (comm.rank() * 100 + round) as f64;
                out.push(comm.all_reduce_min(v, 0)?);
                comm.barrier()?;
            }
            Ok(out)
        })
        .unwrap();
        let expected: Vec<f64> = (0..20).map(|r| r as f64).collect();
        for out in results {
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn test_bad_root_rejected() {
        let result = LocalCluster::run(2, |comm| comm.broadcast(1.0, 5));
        assert!(matches!(result, Err(JsaError::Collective { .. })));
    }

    #[test]
    fn test_failing_rank_fails_everyone() {
        let result: Result<Vec<()>> = LocalCluster::run(3, |comm| {
            if comm.rank() == 2 {
                return Err(JsaError::Config("rank 2 gave up".into()));
            }
            comm.barrier()
        });
        // ranks 0 and 1 are stuck on the barrier until rank 2's endpoint drops
        assert!(matches!(result, Err(JsaError::Collective { .. })));
    }

    #[test]
    fn test_panicking_rank_reported() {
        let result: Result<Vec<f64>> = LocalCluster::run(2, |comm| {
            if comm.rank() == 1 {
                panic!("boom");
            }
            comm.all_reduce_min(1.0, 0)
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_ranks_rejected() {
        let result: Result<Vec<()>> = LocalCluster::run(0, |_| Ok(()));
        assert!(matches!(result, Err(JsaError::Config(_))));
    }
}
