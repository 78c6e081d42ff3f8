//! Multi-stage render pipeline
//!
//! Each frame the pipeline:
//! 1. Rebuilds the [`LayerMap`] from the scene tree
//! 2. Runs its stages strictly in list order, handing every stage the
//!    output target of the one before (`None` for the first)
//! 3. Presents the last stage's output
//!
//! Layers stages share one cursor over the sorted layer map, so a stage
//! bounded below some layer index followed by an unbounded one draws every
//! layer exactly once.

use super::backend::{LayerConfig, RenderBackend, RenderTarget};
use super::{DrawContext, LayerMap, RenderError};
use crate::ecs::{NodeKey, World};
use crate::foundation::time::FrameTime;
use std::collections::HashMap;

static DEFAULT_LAYER_CONFIG: LayerConfig = LayerConfig {
    sampler: super::backend::SamplerMode::Nearest,
    transform: None,
};

/// Unit of the render pipeline
///
/// Games implement this for custom post-processing passes.
pub trait PipelineStage {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Run the stage
    ///
    /// `previous` is the output of the prior stage. Return the target this
    /// stage drew into, or `None` when it drew straight to the display.
    fn execute(
        &mut self,
        ctx: &mut RenderContext<'_>,
        previous: Option<RenderTarget>,
    ) -> Result<Option<RenderTarget>, RenderError>;
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Stages executed
    pub stages: usize,
    /// Layers drawn
    pub layers: usize,
    /// Renderables drawn
    pub entries: usize,
}

/// State shared by the stages of one frame
pub struct RenderContext<'a> {
    world: &'a World,
    layers: &'a LayerMap,
    layer_order: Vec<i32>,
    cursor: usize,
    backend: &'a mut dyn RenderBackend,
    layer_configs: &'a HashMap<i32, LayerConfig>,
    time: FrameTime,
    stats: RenderStats,
}

impl<'a> RenderContext<'a> {
    fn new(
        world: &'a World,
        layers: &'a LayerMap,
        backend: &'a mut dyn RenderBackend,
        layer_configs: &'a HashMap<i32, LayerConfig>,
        time: FrameTime,
    ) -> Self {
        Self {
            world,
            layers,
            layer_order: layers.layer_indices(),
            cursor: 0,
            backend,
            layer_configs,
            time,
            stats: RenderStats::default(),
        }
    }

    /// World being rendered
    pub fn world(&self) -> &World {
        self.world
    }

    /// Layer map collected for this frame
    pub fn layers(&self) -> &LayerMap {
        self.layers
    }

    /// Frame timing
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Backend to draw with
    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }

    /// Next undrawn layer, without consuming it
    pub fn peek_layer(&self) -> Option<i32> {
        self.layer_order.get(self.cursor).copied()
    }

    /// Consume the next undrawn layer if it is below `upper_bound`
    pub fn next_layer_below(&mut self, upper_bound: Option<i32>) -> Option<i32> {
        let layer = self.peek_layer()?;
        if upper_bound.is_some_and(|bound| layer >= bound) {
            return None;
        }
        self.cursor += 1;
        Some(layer)
    }

    /// Draw configuration for a layer index
    pub fn layer_config(&self, layer: i32) -> &LayerConfig {
        self.layer_configs.get(&layer).unwrap_or(&DEFAULT_LAYER_CONFIG)
    }

    /// Draw every entry of a layer into the bound target
    ///
    /// Returns the number of renderables drawn.
    pub fn draw_layer(&mut self, layer: i32) -> Result<usize, RenderError> {
        let world = self.world;
        let layers = self.layers;
        let config = self.layer_configs.get(&layer).unwrap_or(&DEFAULT_LAYER_CONFIG);

        self.backend.begin_layer(layer, config)?;
        let mut drawn = 0;
        for entry in layers.entries(layer) {
            let Some(renderable) = world.renderable(entry.node, entry.slot) else {
                continue;
            };
            let mut draw_ctx = DrawContext {
                backend: &mut *self.backend,
                world,
                owner: entry.node,
                layer,
                time: self.time,
            };
            renderable.draw(&mut draw_ctx)?;
            drawn += 1;
        }
        self.backend.end_layer(layer)?;

        self.stats.layers += 1;
        self.stats.entries += drawn;
        Ok(drawn)
    }
}

/// Ordered list of stages plus per-layer draw configuration
#[derive(Default)]
pub struct RenderPipeline {
    stages: Vec<Box<dyn PipelineStage>>,
    layer_configs: HashMap<i32, LayerConfig>,
}

impl RenderPipeline {
    /// Empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: append a stage
    #[must_use]
    pub fn with_stage(mut self, stage: impl PipelineStage + 'static) -> Self {
        self.push_stage(stage);
        self
    }

    /// Append a stage
    pub fn push_stage(&mut self, stage: impl PipelineStage + 'static) {
        log::debug!("Pipeline stage {} added at position {}", stage.name(), self.stages.len());
        self.stages.push(Box::new(stage));
    }

    /// Number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Register the draw configuration for a layer index
    pub fn set_layer_config(&mut self, layer: i32, config: LayerConfig) {
        self.layer_configs.insert(layer, config);
    }

    /// Draw configuration registered for a layer index
    pub fn layer_config(&self, layer: i32) -> Option<&LayerConfig> {
        self.layer_configs.get(&layer)
    }

    /// Render one frame of the tree rooted at `root`
    pub fn render(
        &mut self,
        world: &World,
        root: NodeKey,
        backend: &mut dyn RenderBackend,
        time: FrameTime,
    ) -> Result<RenderStats, RenderError> {
        let layers = LayerMap::collect(world, root);
        backend.begin_frame(time)?;

        let mut ctx = RenderContext::new(world, &layers, backend, &self.layer_configs, time);
        let mut output = None;
        for stage in &mut self.stages {
            output = stage.execute(&mut ctx, output)?;
            ctx.stats.stages += 1;
        }
        if ctx.peek_layer().is_some() {
            log::trace!("Frame ended with layers no stage reached");
        }

        ctx.backend.present(output)?;
        Ok(ctx.stats)
    }
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("stages", &self.stage_names())
            .field("layer_configs", &self.layer_configs)
            .finish()
    }
}
