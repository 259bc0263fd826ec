//! Interpretation of free-form model replies as an [`AiAdvice`].
//!
//! Model output is untrusted. Each strategy below either yields a full
//! record or `None`; they are tried in order and the first success wins.
//! When all of them fail the generic [`AiAdvice::default`] is returned.

use crate::model::AiAdvice;

const SEGMENT_TERMINATORS: &[char] = &['。', '！', '？', '\n'];
const MIN_SEGMENTS: usize = 4;

type Strategy = fn(&str) -> Option<AiAdvice>;

const STRATEGIES: &[Strategy] = &[parse_whole, parse_braced, parse_segments];

/// Turn a model reply into an advice record. Never fails.
pub fn parse_advice(raw: &str) -> AiAdvice {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(raw))
        .unwrap_or_else(|| {
            tracing::debug!("model reply did not match any advice format, using defaults");
            AiAdvice::default()
        })
}

fn parse_whole(raw: &str) -> Option<AiAdvice> {
    serde_json::from_str(raw).ok()
}

/// JSON embedded in surrounding prose or a markdown fence.
fn parse_braced(raw: &str) -> Option<AiAdvice> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn parse_segments(raw: &str) -> Option<AiAdvice> {
    let segments: Vec<&str> = raw
        .split(SEGMENT_TERMINATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.len() < MIN_SEGMENTS {
        return None;
    }

    let rest = segments[MIN_SEGMENTS..].join("。");
    let summary = if rest.is_empty() {
        AiAdvice::default().summary
    } else {
        rest
    };

    Some(AiAdvice {
        clothing_advice: segments[0].to_string(),
        travel_advice: segments[1].to_string(),
        activity_recommendation: segments[2].to_string(),
        health_tips: segments[3].to_string(),
        summary,
    })
}
