use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use terrastream_render::{BufferId, GraphicsDevice, VertexBuffer};
use terrastream_terrain::TerrainVertex;
use wgpu::util::DeviceExt;

/// Errors raised while acquiring a GPU.
#[derive(Debug, thiserror::Error)]
pub enum GpuInitError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

type BufferRegistry = Arc<Mutex<BTreeMap<BufferId, Arc<wgpu::Buffer>>>>;

fn lock(registry: &BufferRegistry) -> MutexGuard<'_, BTreeMap<BufferId, Arc<wgpu::Buffer>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`GraphicsDevice`] backed by a wgpu device and queue.
///
/// Live vertex buffers are registered by id so a render pass can resolve the
/// [`BufferId`]s recorded in chunk draws.
pub struct WgpuGraphicsDevice {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    next_id: AtomicU64,
    buffers: BufferRegistry,
}

impl WgpuGraphicsDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            next_id: AtomicU64::new(1),
            buffers: Arc::default(),
        }
    }

    /// Acquire a device with no surface, for offscreen rendering.
    pub fn headless() -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(GpuInitError::NoAdapter)?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "gpu adapter selected");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("terrastream_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;
        Ok(Self::new(device, queue))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Resolve a live vertex buffer.
    pub fn buffer(&self, id: BufferId) -> Option<Arc<wgpu::Buffer>> {
        lock(&self.buffers).get(&id).cloned()
    }

    pub fn live_buffers(&self) -> usize {
        lock(&self.buffers).len()
    }
}

impl GraphicsDevice for WgpuGraphicsDevice {
    fn create_vertex_buffer(&self, label: &str) -> Box<dyn VertexBuffer> {
        let id = BufferId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(?id, label, "wgpu vertex buffer reserved");
        Box::new(WgpuVertexBuffer {
            id,
            label: label.to_owned(),
            device: Arc::clone(&self.device),
            queue: Arc::clone(&self.queue),
            buffer: None,
            registry: Arc::clone(&self.buffers),
        })
    }
}

/// Vertex buffer allocated lazily on first upload. Later uploads that fit
/// are written in place through the queue; larger ones reallocate.
struct WgpuVertexBuffer {
    id: BufferId,
    label: String,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    buffer: Option<Arc<wgpu::Buffer>>,
    registry: BufferRegistry,
}

impl VertexBuffer for WgpuVertexBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn update_data(&mut self, vertices: &[TerrainVertex]) {
        if vertices.is_empty() {
            tracing::warn!(label = %self.label, "empty vertex upload skipped");
            return;
        }
        let bytes: &[u8] = bytemuck::cast_slice(vertices);

        if let Some(buffer) = self.buffer.as_ref().filter(|b| b.size() >= bytes.len() as u64) {
            self.queue.write_buffer(buffer, 0, bytes);
            return;
        }

        if self.buffer.is_some() {
            tracing::debug!(label = %self.label, bytes = bytes.len(), "vertex buffer outgrown; reallocating");
        }
        let buffer = Arc::new(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&self.label),
            contents: bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        }));
        lock(&self.registry).insert(self.id, Arc::clone(&buffer));
        self.buffer = Some(buffer);
    }
}

impl Drop for WgpuVertexBuffer {
    fn drop(&mut self) {
        lock(&self.registry).remove(&self.id);
        if let Some(buffer) = self.buffer.take() {
            buffer.destroy();
        }
    }
}
