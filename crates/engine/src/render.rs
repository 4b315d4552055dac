use quiz_core::model::ShapeDescriptor;

/// Port for the external renderer.
///
/// The engine pushes one draw instruction per question and makes no
/// assumptions about the output.
pub trait ShapeRenderer {
    fn draw(&self, shape: &ShapeDescriptor);
}

/// Renderer that discards every draw instruction, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl ShapeRenderer for NullRenderer {
    fn draw(&self, _shape: &ShapeDescriptor) {}
}
