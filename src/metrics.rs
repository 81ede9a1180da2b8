/// One channel's share of the combined trade-in count, as a percentage.
/// Zero when there were no trade-ins at all.
pub fn market_share(channel_count: u64, total_count: u64) -> f64 {
    if total_count == 0 {
        0.0
    } else {
        channel_count as f64 / total_count as f64 * 100.0
    }
}

/// Achievement against a monthly target, as a percentage. Zero when no
/// target is set.
pub fn target_achievement(achieved: u64, target: f64) -> f64 {
    if target <= 0.0 {
        0.0
    } else {
        achieved as f64 / target * 100.0
    }
}
