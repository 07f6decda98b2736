/// Contest mechanics: reward split between winner and losers.
///
/// Win probability of player `i` is `p_i / Σp`.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Csf {
    /// Reward for the winner.
    pub w: f64,
    /// Reward for a loser.
    pub l: f64,
    /// Winner reward per unit of performance.
    pub a_w: f64,
    /// Loser reward per unit of performance.
    pub a_l: f64,
}

impl Default for Csf {
    fn default() -> Self {
        Self { w: 1.0, l: 0.0, a_w: 0.0, a_l: 0.0 }
    }
}

impl Csf {
    /// Expected reward of a player with performance `p_i` when total performance is `sum`.
    #[inline]
    pub fn reward(&self, p_i: f64, sum: f64) -> f64 {
        let q = p_i / sum;
        (self.w + p_i * self.a_w) * q + (self.l + p_i * self.a_l) * (1.0 - q)
    }

    /// `d reward / d p_i`, others held fixed.
    #[inline]
    pub fn reward_deriv(&self, p_i: f64, sum: f64) -> f64 {
        let q = p_i / sum;
        let dq = (sum - p_i) / (sum * sum);
        self.a_l + (self.a_w - self.a_l) * q + (self.w - self.l + (self.a_w - self.a_l) * p_i) * dq
    }
}
