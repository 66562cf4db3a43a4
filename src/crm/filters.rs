use crate::crm::records::Deal;
use chrono::{DateTime, Local, TimeZone, Utc};

/// Start of the local day containing `now`, used as the "today's leads" cutoff.
pub fn local_midnight(now: DateTime<Local>) -> DateTime<Local> {
    let Some(naive) = now.date_naive().and_hms_opt(0, 0, 0) else {
        return now;
    };
    // A DST jump can skip midnight; earliest() then yields nothing.
    Local.from_local_datetime(&naive).earliest().unwrap_or(now)
}

pub fn todays_leads_cutoff() -> DateTime<Utc> {
    local_midnight(Local::now()).with_timezone(&Utc)
}

/// Stage-name heuristic for deals that are about to close.
///
/// Matches "negotiation", "proposal" or "closing" anywhere in the stage, or
/// "close" as long as the stage says neither "closed", "won" nor "lost".
pub fn is_closing_stage(stage: &str) -> bool {
    let stage = stage.to_lowercase();
    if ["negotiation", "proposal", "closing"]
        .iter()
        .any(|needle| stage.contains(needle))
    {
        return true;
    }
    stage.contains("close")
        && !stage.contains("closed")
        && !stage.contains("won")
        && !stage.contains("lost")
}

pub fn closing_deals(deals: &[Deal]) -> Vec<Deal> {
    deals
        .iter()
        .filter(|deal| is_closing_stage(&deal.stage))
        .cloned()
        .collect()
}
