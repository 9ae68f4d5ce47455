//! Seeded random streams, one per concern, so that e.g. extra narration
//! rolls never shift the layout of the next graveyard.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

/// Independent RNG streams derived from a single user-visible seed.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    layout: CountingRng<SmallRng>,
    roster: CountingRng<SmallRng>,
    narration: CountingRng<SmallRng>,
    shake: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            layout: CountingRng::new(derive_stream_seed(seed, b"layout")),
            roster: CountingRng::new(derive_stream_seed(seed, b"roster")),
            narration: CountingRng::new(derive_stream_seed(seed, b"narration")),
            shake: CountingRng::new(derive_stream_seed(seed, b"shake")),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Grave contents and closed-mound variants.
    pub fn layout(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.layout
    }

    /// Visitor targets and sprite variants.
    pub fn roster(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.roster
    }

    /// Dig phrase selection.
    pub fn narration(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.narration
    }

    /// Camera shake offsets.
    pub fn shake(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.shake
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn streams_are_independent_and_reproducible() {
        let mut a = RngBundle::from_user_seed(42);
        let mut b = RngBundle::from_user_seed(42);

        let _: u32 = a.narration().r#gen();
        let _: u32 = a.narration().r#gen();
        let layout_a: u64 = a.layout().r#gen();
        let layout_b: u64 = b.layout().r#gen();

        assert_eq!(layout_a, layout_b, "narration draws must not move layout");
        assert_eq!(a.narration().draws(), 2);
        assert_eq!(b.narration().draws(), 0);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = RngBundle::from_user_seed(1);
        let mut b = RngBundle::from_user_seed(2);
        let xa: u64 = a.roster().r#gen();
        let xb: u64 = b.roster().r#gen();
        assert_ne!(xa, xb);
        assert_eq!(a.seed(), 1);
    }
}
