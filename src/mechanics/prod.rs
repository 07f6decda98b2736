/// Production mechanics: inputs (Ks, Kp) to outputs (safety s, performance p).
///
/// `p = B·Kp^β`, `s = A·Ks^α·p^(−θ)`.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProdFunc {
    /// Safety productivity.
    pub a: f64,
    /// Safety returns to scale.
    pub alpha: f64,
    /// Performance productivity.
    pub b: f64,
    /// Performance returns to scale.
    pub beta: f64,
    /// How strongly performance makes safety more expensive.
    pub theta: f64,
}

impl ProdFunc {
    #[inline]
    pub fn performance(&self, kp: f64) -> f64 {
        self.b * kp.powf(self.beta)
    }

    #[inline]
    pub fn safety(&self, ks: f64, p: f64) -> f64 {
        self.a * ks.powf(self.alpha) * p.powf(-self.theta)
    }

    /// `(s, p)` for one player's inputs.
    #[inline]
    pub fn outputs(&self, ks: f64, kp: f64) -> (f64, f64) {
        let p = self.performance(kp);
        (self.safety(ks, p), p)
    }

    /// `dp/dKp`.
    #[inline]
    pub fn dp_dkp(&self, kp: f64) -> f64 {
        self.beta * self.b * kp.powf(self.beta - 1.0)
    }

    /// `(ds/dKs, ds/dKp)`.
    #[inline]
    pub fn ds(&self, ks: f64, kp: f64) -> (f64, f64) {
        let p = self.performance(kp);
        let ds_dks = self.alpha * self.a * ks.powf(self.alpha - 1.0) * p.powf(-self.theta);
        // s depends on Kp only through p^(−θ)
        let ds_dkp = if self.theta == 0.0 {
            0.0
        } else {
            -self.theta * self.safety(ks, p) / p * self.dp_dkp(kp)
        };
        (ds_dks, ds_dkp)
    }
}
