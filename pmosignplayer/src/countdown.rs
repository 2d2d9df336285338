//! Calcul et format du compte à rebours
//!
//! Le temps restant est dérivé d'une échéance sur l'horloge monotone, pas
//! d'un compteur de ticks : le compte à rebours peut perdre des ticks sans
//! jamais fausser l'avancement.

use std::time::Duration;
use tokio::time::Instant;

/// Temps restant avant une échéance, borné à zéro
pub fn remaining_until(deadline: Instant, now: Instant) -> Duration {
    deadline.saturating_duration_since(now)
}

/// Formate une durée restante en `mm:ss`
pub fn format_remaining(remaining: Duration) -> String {
    let total_secs = remaining.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_remaining(Duration::ZERO), "00:00");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_remaining(Duration::from_secs(13)), "00:13");
    }

    #[test]
    fn test_format_minutes_and_seconds() {
        assert_eq!(format_remaining(Duration::from_secs(754)), "12:34");
    }

    #[test]
    fn test_format_truncates_sub_second() {
        assert_eq!(format_remaining(Duration::from_millis(4999)), "00:04");
    }

    #[test]
    fn test_remaining_saturates_at_zero() {
        let now = Instant::now();
        let past = now - Duration::from_secs(5);
        assert_eq!(remaining_until(past, now), Duration::ZERO);
    }

    #[test]
    fn test_remaining_before_deadline() {
        let now = Instant::now();
        let deadline = now + Duration::from_secs(8);
        assert_eq!(remaining_until(deadline, now), Duration::from_secs(8));
    }
}
