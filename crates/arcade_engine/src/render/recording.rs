//! Headless backend that records every call
//!
//! Used by tests and by tools that need to inspect a frame without a GPU.

use super::backend::{BackendResult, LayerConfig, RenderBackend, RenderTarget, ShaderParams, SpriteDraw};
use super::RenderError;
use crate::foundation::math::Color;
use crate::foundation::time::FrameTime;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Frame started
    BeginFrame {
        /// Frame counter
        frame: u64,
    },
    /// Target bound, `None` for the display
    BindTarget(Option<RenderTarget>),
    /// Bound target cleared
    Clear(Color),
    /// Layer started
    BeginLayer {
        /// Layer index
        layer: i32,
        /// Configuration used for the layer
        config: LayerConfig,
    },
    /// Layer finished
    EndLayer {
        /// Layer index
        layer: i32,
    },
    /// Sprite drawn
    Sprite(SpriteDraw),
    /// Full-target effect pass
    Fullscreen {
        /// Input target
        source: RenderTarget,
        /// Shader identifier
        shader: String,
    },
    /// Frame presented
    Present(Option<RenderTarget>),
}

/// Backend that stores calls instead of drawing
#[derive(Debug)]
pub struct RecordingBackend {
    display_size: (u32, u32),
    targets: Vec<RenderTarget>,
    commands: Vec<DrawCommand>,
}

impl RecordingBackend {
    /// Backend reporting the given display size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            display_size: (width, height),
            targets: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Calls recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded calls, leaving the log empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Sprites drawn, in submission order
    pub fn sprites(&self) -> impl Iterator<Item = &SpriteDraw> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Sprite(sprite) => Some(sprite),
            _ => None,
        })
    }

    /// Layers begun, in order
    pub fn layers_begun(&self) -> Vec<i32> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::BeginLayer { layer, .. } => Some(*layer),
                _ => None,
            })
            .collect()
    }

    fn check_target(&self, target: RenderTarget) -> BackendResult<()> {
        if self.targets.contains(&target) {
            Ok(())
        } else {
            Err(RenderError::UnknownTarget(target.id))
        }
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new(320, 240)
    }
}

impl RenderBackend for RecordingBackend {
    fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn create_target(&mut self, width: u32, height: u32) -> BackendResult<RenderTarget> {
        if width == 0 || height == 0 {
            return Err(RenderError::Backend(format!(
                "cannot create a {width}x{height} target"
            )));
        }
        let id = u32::try_from(self.targets.len())
            .map_err(|_| RenderError::Backend("too many render targets".to_string()))?;
        let target = RenderTarget { id, width, height };
        self.targets.push(target);
        Ok(target)
    }

    fn begin_frame(&mut self, time: FrameTime) -> BackendResult<()> {
        self.commands.push(DrawCommand::BeginFrame { frame: time.frame });
        Ok(())
    }

    fn bind_target(&mut self, target: Option<RenderTarget>) -> BackendResult<()> {
        if let Some(target) = target {
            self.check_target(target)?;
        }
        self.commands.push(DrawCommand::BindTarget(target));
        Ok(())
    }

    fn clear(&mut self, color: Color) -> BackendResult<()> {
        self.commands.push(DrawCommand::Clear(color));
        Ok(())
    }

    fn begin_layer(&mut self, layer: i32, config: &LayerConfig) -> BackendResult<()> {
        self.commands.push(DrawCommand::BeginLayer {
            layer,
            config: *config,
        });
        Ok(())
    }

    fn end_layer(&mut self, layer: i32) -> BackendResult<()> {
        self.commands.push(DrawCommand::EndLayer { layer });
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: &SpriteDraw) -> BackendResult<()> {
        self.commands.push(DrawCommand::Sprite(*sprite));
        Ok(())
    }

    fn draw_fullscreen(&mut self, source: RenderTarget, shader: &ShaderParams) -> BackendResult<()> {
        self.check_target(source)?;
        self.commands.push(DrawCommand::Fullscreen {
            source,
            shader: shader.shader.clone(),
        });
        Ok(())
    }

    fn present(&mut self, output: Option<RenderTarget>) -> BackendResult<()> {
        if let Some(target) = output {
            self.check_target(target)?;
        }
        self.commands.push(DrawCommand::Present(output));
        Ok(())
    }
}
