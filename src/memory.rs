//! Memory resources that operation results are charged to.
//!
//! Every operation accepts an optional resource. When none is given, the
//! dispatcher asks its [`ResourceAccessor`] for the current one at call time,
//! so swapping the ambient resource between calls takes effect immediately.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use thiserror::Error;

/// Shared handle to a memory resource.
pub type MemoryResourceRef = Arc<dyn MemoryResource>;

/// Allocation failure reported by a memory resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The resource's byte limit would be exceeded.
    #[error("memory resource '{resource}' exhausted: requested {requested} bytes, {in_use} of {limit} bytes in use")]
    Exhausted {
        resource: String,
        requested: usize,
        in_use: usize,
        limit: usize,
    },
}

/// Pluggable provider of memory for operation results.
pub trait MemoryResource: Send + Sync + fmt::Debug {
    /// Returns a human-readable name for the resource.
    fn name(&self) -> &str;

    /// Reserves `bytes` for a new result.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocationError`] if the reservation cannot be satisfied.
    fn allocate(&self, bytes: usize) -> Result<(), AllocationError>;

    /// Releases a previous reservation.
    fn deallocate(&self, bytes: usize);

    /// Returns the number of bytes currently reserved.
    fn bytes_allocated(&self) -> usize;
}

/// Memory resource that counts reservations, with an optional byte limit.
#[derive(Debug)]
pub struct CountingResource {
    name: String,
    limit: Option<usize>,
    in_use: AtomicUsize,
    peak: AtomicUsize,
    allocations: AtomicUsize,
}

impl CountingResource {
    /// Creates an unbounded resource.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        CountingResource {
            name: name.into(),
            limit: None,
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            allocations: AtomicUsize::new(0),
        }
    }

    /// Sets a byte limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the number of successful allocations.
    #[must_use]
    pub fn allocation_count(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Returns the highest number of bytes reserved at once.
    #[must_use]
    pub fn peak_bytes(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

impl MemoryResource for CountingResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn allocate(&self, bytes: usize) -> Result<(), AllocationError> {
        let limit = self.limit.unwrap_or(usize::MAX);
        let previous = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(bytes).filter(|next| *next <= limit)
            })
            .map_err(|in_use| AllocationError::Exhausted {
                resource: self.name.clone(),
                requested: bytes,
                in_use,
                limit,
            })?;
        self.peak.fetch_max(previous + bytes, Ordering::Relaxed);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn deallocate(&self, bytes: usize) {
        let _ = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(bytes))
            });
    }

    fn bytes_allocated(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }
}

/// Bytes held on a memory resource for one result.
///
/// The reservation is released when the guard is dropped. Columns and scalars
/// produced by an engine share their guard across clones, so the bytes are
/// returned once the last handle goes away.
#[derive(Debug)]
pub struct Reservation {
    resource: MemoryResourceRef,
    bytes: usize,
}

impl Reservation {
    /// Reserves `bytes` on `resource`.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocationError`] if the resource refuses the request.
    pub fn acquire(resource: &MemoryResourceRef, bytes: usize) -> Result<Self, AllocationError> {
        resource.allocate(bytes)?;
        Ok(Reservation {
            resource: Arc::clone(resource),
            bytes,
        })
    }

    /// Returns the number of reserved bytes.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the resource the bytes are reserved on.
    #[must_use]
    pub fn resource(&self) -> &MemoryResourceRef {
        &self.resource
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.resource.deallocate(self.bytes);
    }
}

/// Source of the default memory resource.
pub trait ResourceAccessor: Send + Sync + fmt::Debug {
    /// Returns the resource to use when a caller passes none.
    fn current(&self) -> MemoryResourceRef;
}

/// Swappable "current device resource".
#[derive(Debug)]
pub struct DeviceResources {
    current: RwLock<MemoryResourceRef>,
}

static GLOBAL_RESOURCES: OnceLock<Arc<DeviceResources>> = OnceLock::new();

impl DeviceResources {
    /// Creates a registry whose current resource is `resource`.
    #[must_use]
    pub fn new(resource: MemoryResourceRef) -> Self {
        DeviceResources {
            current: RwLock::new(resource),
        }
    }

    /// Returns the process-wide registry.
    ///
    /// Its initial resource is an unbounded [`CountingResource`] named
    /// "default".
    pub fn global() -> Arc<DeviceResources> {
        Arc::clone(GLOBAL_RESOURCES.get_or_init(|| {
            Arc::new(DeviceResources::new(Arc::new(CountingResource::new("default"))))
        }))
    }

    /// Replaces the current resource, returning the previous one.
    pub fn set_current(&self, resource: MemoryResourceRef) -> MemoryResourceRef {
        std::mem::replace(&mut *self.current.write(), resource)
    }
}

impl Default for DeviceResources {
    fn default() -> Self {
        DeviceResources::new(Arc::new(CountingResource::new("default")))
    }
}

impl ResourceAccessor for DeviceResources {
    fn current(&self) -> MemoryResourceRef {
        self.current.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_resource_tracks_bytes() {
        let mr = CountingResource::new("test");
        mr.allocate(100).unwrap();
        mr.allocate(50).unwrap();
        assert_eq!(mr.bytes_allocated(), 150);
        assert_eq!(mr.allocation_count(), 2);
        mr.deallocate(100);
        assert_eq!(mr.bytes_allocated(), 50);
        assert_eq!(mr.peak_bytes(), 150);
    }

    #[test]
    fn test_counting_resource_limit() {
        let mr = CountingResource::new("small").with_limit(64);
        mr.allocate(60).unwrap();
        let err = mr.allocate(10).unwrap_err();
        assert!(err.to_string().contains("small"));
        assert_eq!(mr.bytes_allocated(), 60);
    }

    #[test]
    fn test_reservation_released_on_drop() {
        let mr: MemoryResourceRef = Arc::new(CountingResource::new("guarded").with_limit(100));
        let held = Reservation::acquire(&mr, 80).unwrap();
        assert_eq!(held.bytes(), 80);
        assert_eq!(mr.bytes_allocated(), 80);
        assert!(Reservation::acquire(&mr, 40).is_err());

        drop(held);
        assert_eq!(mr.bytes_allocated(), 0);
        let again = Reservation::acquire(&mr, 40).unwrap();
        assert_eq!(again.resource().name(), "guarded");
    }

    #[test]
    fn test_set_current_is_seen_by_next_lookup() {
        let registry = DeviceResources::default();
        assert_eq!(registry.current().name(), "default");

        let previous = registry.set_current(Arc::new(CountingResource::new("pool")));
        assert_eq!(previous.name(), "default");
        assert_eq!(registry.current().name(), "pool");
    }
}
