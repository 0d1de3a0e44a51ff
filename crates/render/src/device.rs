use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use terrastream_terrain::TerrainVertex;

/// Identity of a vertex buffer, stable for the buffer's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// A GPU vertex buffer. Dropping it releases the GPU resource, so it must be
/// dropped on the thread that owns the graphics device.
pub trait VertexBuffer: Send {
    fn id(&self) -> BufferId;

    /// Replace the full buffer contents.
    fn update_data(&mut self, vertices: &[TerrainVertex]);
}

/// Creates GPU resources. Only called from the render thread.
pub trait GraphicsDevice {
    fn create_vertex_buffer(&self, label: &str) -> Box<dyn VertexBuffer>;
}

/// Resource counters shared between a [`HeadlessDevice`] and its buffers.
#[derive(Debug, Default)]
pub struct DeviceCounters {
    created: AtomicU64,
    uploads: AtomicU64,
    released: AtomicU64,
    uploaded_vertices: AtomicU64,
}

impl DeviceCounters {
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn uploads(&self) -> u64 {
        self.uploads.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    pub fn uploaded_vertices(&self) -> u64 {
        self.uploaded_vertices.load(Ordering::Relaxed)
    }

    /// Buffers created and not yet released.
    pub fn live(&self) -> u64 {
        self.created().saturating_sub(self.released())
    }
}

/// Device without a GPU: buffers keep a CPU copy and every call is counted.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    counters: Arc<DeviceCounters>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> Arc<DeviceCounters> {
        Arc::clone(&self.counters)
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_vertex_buffer(&self, label: &str) -> Box<dyn VertexBuffer> {
        let id = BufferId(self.counters.created.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::trace!(?id, label, "headless vertex buffer created");
        Box::new(HeadlessVertexBuffer {
            id,
            data: Vec::new(),
            counters: Arc::clone(&self.counters),
        })
    }
}

struct HeadlessVertexBuffer {
    id: BufferId,
    data: Vec<TerrainVertex>,
    counters: Arc<DeviceCounters>,
}

impl VertexBuffer for HeadlessVertexBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn update_data(&mut self, vertices: &[TerrainVertex]) {
        self.data.clear();
        self.data.extend_from_slice(vertices);
        self.counters.uploads.fetch_add(1, Ordering::Relaxed);
        self.counters
            .uploaded_vertices
            .fetch_add(vertices.len() as u64, Ordering::Relaxed);
    }
}

impl Drop for HeadlessVertexBuffer {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::Relaxed);
    }
}
