//! Count-based history cap.

use wagpt_core::ChatRecord;

/// Trims `history` to at most `max` records, keeping the first system record and the newest
/// other records. `max == 0` disables the cap.
pub fn cap_history(history: &mut Vec<ChatRecord>, max: usize) {
    if max == 0 || history.len() <= max {
        return;
    }
    match history.iter().position(ChatRecord::is_system) {
        Some(idx) => {
            let system = history.remove(idx);
            let excess = history.len().saturating_sub(max - 1);
            history.drain(..excess);
            history.insert(0, system);
        }
        None => {
            let excess = history.len() - max;
            history.drain(..excess);
        }
    }
}
