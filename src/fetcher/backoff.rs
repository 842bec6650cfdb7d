use rand::Rng;
use std::time::Duration;

/// Exponent cap so long retry chains cannot overflow.
const MAX_EXPONENT: u32 = 10;

/// Delay before retry number `attempt` (0-based): `base * 2^attempt` with ±30% jitter.
pub fn calculate_backoff_delay(attempt: u32, base: Duration) -> Duration {
    let capped_attempt = attempt.min(MAX_EXPONENT);
    let base_delay = base.saturating_mul(2_u32.saturating_pow(capped_attempt));

    let jitter_factor = rand::thread_rng().gen_range(0.7..1.3);
    base_delay.mul_f64(jitter_factor)
}
