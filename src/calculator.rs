// ── Calculator component ──────────────────────────────────────────────────────

/// A stateless adder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }

    /// `a + b`, wrapping on 32-bit overflow.
    pub fn add(&self, a: i32, b: i32) -> i32 {
        a.wrapping_add(b)
    }
}
