//! Duration formatting for session periods.

/// Render seconds with the two largest non-zero units, e.g. `"5d"`,
/// `"2d 12h"`, `"1h 30m"`, `"45s"`.
pub fn format_duration(secs: u64) -> String {
    const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];
    if secs == 0 {
        return "0s".to_owned();
    }
    let mut rest = secs;
    let mut parts = Vec::with_capacity(2);
    for (size, suffix) in UNITS {
        if parts.len() == 2 {
            break;
        }
        let n = rest / size;
        rest %= size;
        if n > 0 {
            parts.push(format!("{n}{suffix}"));
        } else if !parts.is_empty() {
            // Only adjacent units.
            break;
        }
    }
    parts.join(" ")
}
