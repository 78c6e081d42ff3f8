//! Integration tests for the scene tree, component lifecycle, transform
//! propagation and collision dispatch through the world

mod transform_propagation;
