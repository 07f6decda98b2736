/// Bound mechanics: per-coordinate boxes and projection onto them.

/// Distance kept above a strict lower bound when projecting.
pub const STRICT_MARGIN: f64 = 1e-9;

/// Lower/upper limits for one coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bound {
    pub lower: f64,
    pub upper: f64,
    /// The lower limit itself is not admissible.
    pub strict_lower: bool,
}

impl Bound {
    /// Inclusive box `[lower, upper]`.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper, strict_lower: false }
    }

    /// `(0, +inf)`: the default policy for strategy coordinates.
    pub fn greater_zero() -> Self {
        Self { lower: 0.0, upper: f64::INFINITY, strict_lower: true }
    }

    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Smallest admissible value.
    #[inline]
    pub fn floor(&self) -> f64 {
        if self.strict_lower { self.lower + STRICT_MARGIN } else { self.lower }
    }

    /// Nearest admissible value.
    #[inline]
    pub fn project(&self, x: f64) -> f64 {
        x.max(self.floor()).min(self.upper)
    }

    #[inline]
    pub fn at_lower(&self, x: f64) -> bool {
        x <= self.floor()
    }

    #[inline]
    pub fn at_upper(&self, x: f64) -> bool {
        x >= self.upper
    }
}

/// How bounds are generated when a variable block is built without explicit ones.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum BoundPolicy {
    /// Every coordinate gets [`Bound::greater_zero`].
    #[default]
    GreaterZero,
    /// Every coordinate gets the same explicit bound.
    Uniform(Bound),
}

impl BoundPolicy {
    /// One bound per dimension.
    pub fn generate(&self, k: usize) -> Vec<Bound> {
        let b = match self {
            BoundPolicy::GreaterZero => Bound::greater_zero(),
            BoundPolicy::Uniform(b) => *b,
        };
        vec![b; k]
    }
}
