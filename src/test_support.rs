//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, MutexGuard};

use crate::gateway::{
    CreateSnapshotRequest, CreateVolumeRequest, GatewayError, GatewayFuture, Operation, Snapshot,
    StorageGateway, Volume,
};

/// Records a single call made through [`ScriptedGateway`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GatewayCall {
    /// `get_snapshot` with the requested identifier.
    GetSnapshot(String),
    /// `create_volume` with the full request.
    CreateVolume(CreateVolumeRequest),
    /// `get_volume` with the requested identifier.
    GetVolume(String),
    /// `create_snapshot` with the full request.
    CreateSnapshot(CreateSnapshotRequest),
    /// `delete_snapshot` with the requested identifier.
    DeleteSnapshot(String),
}

impl GatewayCall {
    /// Operation the call corresponds to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::GetSnapshot(_) => Operation::GetSnapshot,
            Self::CreateVolume(_) => Operation::CreateVolume,
            Self::GetVolume(_) => Operation::GetVolume,
            Self::CreateSnapshot(_) => Operation::CreateSnapshot,
            Self::DeleteSnapshot(_) => Operation::DeleteSnapshot,
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    snapshots: VecDeque<Result<Snapshot, GatewayError>>,
    volumes: VecDeque<Result<Volume, GatewayError>>,
    deletions: VecDeque<Result<(), GatewayError>>,
    calls: Vec<GatewayCall>,
}

/// Storage gateway that returns pre-seeded results in FIFO order.
///
/// Snapshot results feed both `get_snapshot` and `create_snapshot`; volume
/// results feed both `get_volume` and `create_volume`. An exhausted queue
/// yields a transport error naming the operation.
#[derive(Clone, Debug, Default)]
pub struct ScriptedGateway {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGateway {
    /// Creates a gateway with no queued results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_script<T>(&self, f: impl FnOnce(&mut Script) -> T) -> T {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut script)
    }

    /// Queues a snapshot result.
    pub fn push_snapshot(&self, result: Result<Snapshot, GatewayError>) {
        self.with_script(|script| script.snapshots.push_back(result));
    }

    /// Queues a volume result.
    pub fn push_volume(&self, result: Result<Volume, GatewayError>) {
        self.with_script(|script| script.volumes.push_back(result));
    }

    /// Queues a deletion result.
    pub fn push_deletion(&self, result: Result<(), GatewayError>) {
        self.with_script(|script| script.deletions.push_back(result));
    }

    /// Returns a snapshot of all calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.with_script(|script| script.calls.clone())
    }

    /// Number of recorded calls for `operation`.
    #[must_use]
    pub fn count(&self, operation: Operation) -> usize {
        self.with_script(|script| {
            script
                .calls
                .iter()
                .filter(|call| call.operation() == operation)
                .count()
        })
    }

    fn exhausted(operation: Operation) -> GatewayError {
        GatewayError::Transport {
            operation,
            message: String::from("no scripted response available"),
        }
    }

    fn next_snapshot(&self, call: GatewayCall) -> Result<Snapshot, GatewayError> {
        let operation = call.operation();
        self.with_script(|script| {
            script.calls.push(call);
            script
                .snapshots
                .pop_front()
                .unwrap_or_else(|| Err(Self::exhausted(operation)))
        })
    }

    fn next_volume(&self, call: GatewayCall) -> Result<Volume, GatewayError> {
        let operation = call.operation();
        self.with_script(|script| {
            script.calls.push(call);
            script
                .volumes
                .pop_front()
                .unwrap_or_else(|| Err(Self::exhausted(operation)))
        })
    }

    fn next_deletion(&self, call: GatewayCall) -> Result<(), GatewayError> {
        let operation = call.operation();
        self.with_script(|script| {
            script.calls.push(call);
            script
                .deletions
                .pop_front()
                .unwrap_or_else(|| Err(Self::exhausted(operation)))
        })
    }
}

impl StorageGateway for ScriptedGateway {
    fn get_snapshot<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Snapshot> {
        let result = self.next_snapshot(GatewayCall::GetSnapshot(id.to_owned()));
        Box::pin(async move { result })
    }

    fn create_volume<'a>(
        &'a self,
        request: &'a CreateVolumeRequest,
    ) -> GatewayFuture<'a, Volume> {
        let result = self.next_volume(GatewayCall::CreateVolume(request.clone()));
        Box::pin(async move { result })
    }

    fn get_volume<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Volume> {
        let result = self.next_volume(GatewayCall::GetVolume(id.to_owned()));
        Box::pin(async move { result })
    }

    fn create_snapshot<'a>(
        &'a self,
        request: &'a CreateSnapshotRequest,
    ) -> GatewayFuture<'a, Snapshot> {
        let result = self.next_snapshot(GatewayCall::CreateSnapshot(request.clone()));
        Box::pin(async move { result })
    }

    fn delete_snapshot<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, ()> {
        let result = self.next_deletion(GatewayCall::DeleteSnapshot(id.to_owned()));
        Box::pin(async move { result })
    }
}

/// Builds a snapshot record with the given identifier and minimum disk size.
#[must_use]
pub fn snapshot_fixture(id: &str, min_disk_size: u64) -> Snapshot {
    Snapshot {
        id: id.to_owned(),
        name: format!("pvs-{id}"),
        resource_id: String::from("source-volume"),
        regions: vec![String::from("nyc1")],
        min_disk_size,
    }
}

/// Builds a volume record with the given identifier and filesystem type.
#[must_use]
pub fn volume_fixture(id: &str, filesystem_type: &str) -> Volume {
    Volume {
        id: id.to_owned(),
        name: format!("restore-{id}"),
        region: String::from("nyc1"),
        size_gigabytes: 10,
        filesystem_type: filesystem_type.to_owned(),
        description: String::new(),
    }
}

/// Builds the provider's not-found answer for `operation` on `id`.
#[must_use]
pub fn not_found(operation: Operation, id: &str) -> GatewayError {
    GatewayError::NotFound {
        operation,
        id: id.to_owned(),
        message: String::from("The resource you were accessing could not be found."),
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets and removes environment variables while holding a global mutex.
    /// A `None` value removes the variable for the guard's lifetime.
    pub async fn set_vars(pairs: &[(&str, Option<&str>)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe {
                match value {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
