//! Built-in pipeline stages

use super::backend::{RenderTarget, ShaderParams};
use super::pipeline::{PipelineStage, RenderContext};
use super::RenderError;
use crate::foundation::math::Color;

/// Draws the next run of layers below an optional upper bound
///
/// Layers already drawn by an earlier layers stage in the same frame are
/// never drawn again.
#[derive(Debug, Clone)]
pub struct LayersStage {
    name: String,
    target: Option<RenderTarget>,
    upper_bound: Option<i32>,
    clear: Option<Color>,
}

impl LayersStage {
    /// Stage drawing every remaining layer to the display
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            upper_bound: None,
            clear: None,
        }
    }

    /// Builder pattern: draw into an offscreen target
    #[must_use]
    pub fn to_target(mut self, target: RenderTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Builder pattern: stop before the first layer `>= bound`
    #[must_use]
    pub fn below(mut self, bound: i32) -> Self {
        self.upper_bound = Some(bound);
        self
    }

    /// Builder pattern: clear the target before drawing
    #[must_use]
    pub fn with_clear(mut self, color: Color) -> Self {
        self.clear = Some(color);
        self
    }

    /// Exclusive upper layer bound
    pub fn upper_bound(&self) -> Option<i32> {
        self.upper_bound
    }
}

impl PipelineStage for LayersStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &mut self,
        ctx: &mut RenderContext<'_>,
        _previous: Option<RenderTarget>,
    ) -> Result<Option<RenderTarget>, RenderError> {
        ctx.backend().bind_target(self.target)?;
        if let Some(color) = self.clear {
            ctx.backend().clear(color)?;
        }
        while let Some(layer) = ctx.next_layer_below(self.upper_bound) {
            ctx.draw_layer(layer)?;
        }
        Ok(self.target)
    }
}

/// Full-target shader pass
///
/// Reads its explicit input, or the previous stage's output when none is
/// set, and draws it through a shader into its own target.
#[derive(Debug, Clone)]
pub struct EffectStage {
    name: String,
    target: Option<RenderTarget>,
    input: Option<RenderTarget>,
    shader: ShaderParams,
}

impl EffectStage {
    /// Effect drawing to the display
    pub fn new(name: impl Into<String>, shader: ShaderParams) -> Self {
        Self {
            name: name.into(),
            target: None,
            input: None,
            shader,
        }
    }

    /// Builder pattern: draw into an offscreen target
    #[must_use]
    pub fn to_target(mut self, target: RenderTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Builder pattern: read from a fixed target instead of the previous output
    #[must_use]
    pub fn with_input(mut self, input: RenderTarget) -> Self {
        self.input = Some(input);
        self
    }

    /// Shader parameters, for per-frame uniform updates
    pub fn shader_mut(&mut self) -> &mut ShaderParams {
        &mut self.shader
    }
}

impl PipelineStage for EffectStage {
    fn name(&self) -> &str {
        &self.name
    }

    #[allow(clippy::cast_possible_truncation)]
    fn execute(
        &mut self,
        ctx: &mut RenderContext<'_>,
        previous: Option<RenderTarget>,
    ) -> Result<Option<RenderTarget>, RenderError> {
        let source = self
            .input
            .or(previous)
            .ok_or_else(|| RenderError::MissingInput {
                stage: self.name.clone(),
            })?;
        self.shader.time = ctx.time().elapsed as f32;
        ctx.backend().bind_target(self.target)?;
        ctx.backend().draw_fullscreen(source, &self.shader)?;
        Ok(self.target)
    }
}
