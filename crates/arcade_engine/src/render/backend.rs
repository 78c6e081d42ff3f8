//! Backend abstraction for the render pipeline
//!
//! The pipeline never talks to a graphics API directly. A game supplies a
//! [`RenderBackend`] for its platform; [`RecordingBackend`](super::RecordingBackend)
//! is the headless implementation used by tests and tools.

use super::RenderError;
use crate::ecs::NodeKey;
use crate::foundation::math::{Color, Mat3, Vec2};
use crate::foundation::time::FrameTime;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Offscreen render target owned by whoever assembled the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    /// Backend-assigned identifier
    pub id: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Handle to a texture loaded by the asset layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u32);

/// Texture filtering used while drawing a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerMode {
    /// Nearest-neighbour, keeps pixel art crisp
    #[default]
    Nearest,
    /// Bilinear filtering
    Linear,
}

/// Per-layer draw configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerConfig {
    /// Texture filtering
    pub sampler: SamplerMode,
    /// Extra 2D transform applied to the layer (camera, parallax, UI scale)
    pub transform: Option<Mat3>,
}

impl LayerConfig {
    /// Builder pattern: set the sampler
    pub fn with_sampler(mut self, sampler: SamplerMode) -> Self {
        self.sampler = sampler;
        self
    }

    /// Builder pattern: set the layer transform
    pub fn with_transform(mut self, transform: Mat3) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// One sprite submitted by a renderable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    /// Node that submitted the sprite
    pub node: NodeKey,
    /// Texture to sample
    pub texture: TextureId,
    /// Center in world units
    pub position: Vec2,
    /// Rotation in radians (0 = up)
    pub angle: f32,
    /// Size before scaling
    pub size: Vec2,
    /// Per-axis scale
    pub scale: Vec2,
    /// Color multiplier
    pub tint: Color,
}

/// Shader and uniform values for a full-target effect pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderParams {
    /// Shader identifier understood by the backend
    pub shader: String,
    /// Uniform block, one vec4 per entry
    pub uniforms: Vec<[f32; 4]>,
    /// Seconds since the scene was entered, filled in by the effect stage
    pub time: f32,
}

impl ShaderParams {
    /// Parameters for a shader with no uniforms
    pub fn new(shader: impl Into<String>) -> Self {
        Self {
            shader: shader.into(),
            ..Self::default()
        }
    }

    /// Builder pattern: append a vec4 uniform
    pub fn with_uniform(mut self, value: [f32; 4]) -> Self {
        self.uniforms.push(value);
        self
    }

    /// Uniform block as raw bytes for upload
    pub fn uniform_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uniforms)
    }
}

/// Drawing surface implemented per platform
pub trait RenderBackend {
    /// Size of the display surface in pixels
    fn display_size(&self) -> (u32, u32);

    /// Allocate an offscreen target
    fn create_target(&mut self, width: u32, height: u32) -> BackendResult<RenderTarget>;

    /// Called once before the first stage of a frame
    fn begin_frame(&mut self, _time: FrameTime) -> BackendResult<()> {
        Ok(())
    }

    /// Direct subsequent drawing to `target`, or the display for `None`
    fn bind_target(&mut self, target: Option<RenderTarget>) -> BackendResult<()>;

    /// Clear the bound target
    fn clear(&mut self, color: Color) -> BackendResult<()>;

    /// Start drawing a layer with its configuration
    fn begin_layer(&mut self, layer: i32, config: &LayerConfig) -> BackendResult<()>;

    /// Finish drawing a layer
    fn end_layer(&mut self, layer: i32) -> BackendResult<()>;

    /// Draw one sprite into the bound target
    fn draw_sprite(&mut self, sprite: &SpriteDraw) -> BackendResult<()>;

    /// Draw `source` as a full-target quad through a shader
    fn draw_fullscreen(&mut self, source: RenderTarget, shader: &ShaderParams) -> BackendResult<()>;

    /// Finish the frame, compositing `output` onto the display when the
    /// last stage rendered offscreen
    fn present(&mut self, output: Option<RenderTarget>) -> BackendResult<()>;
}
