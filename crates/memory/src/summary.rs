//! Summary derivation from the turn log.
//!
//! Pure functions: the log slice goes in, the derived summary pieces
//! come out. The manager decides when to run a full recompute versus
//! an incremental bump.

use chrono::{DateTime, Utc};
use solace_core::context::{ContextSummary, CrisisEvent, IntentFrequency, Preferences, WellnessTrend};
use solace_core::intent::Intent;
use solace_core::language::Language;
use solace_core::turn::TurnRecord;
use std::collections::HashMap;

/// Trend flips only when the halves differ by more than this.
const TREND_THRESHOLD: f64 = 0.5;

/// User messages at or under this median length suggest brief replies.
const BRIEF_MESSAGE_CHARS: usize = 60;

/// Full recompute over the retention-filtered turn slice.
pub fn recompute(
    turns: &[TurnRecord],
    crisis_history: &[CrisisEvent],
    now: DateTime<Utc>,
) -> ContextSummary {
    ContextSummary {
        recent_intents: intent_frequencies(turns),
        wellness_trend: wellness_trend(turns),
        crisis_history: cap_history(crisis_history),
        preferences: derive_preferences(turns),
        last_updated: now,
    }
}

/// Incremental update for one new turn: frequency bump, trend
/// recompute, capped crisis-history append.
pub fn apply_turn(
    summary: &mut ContextSummary,
    turns: &[TurnRecord],
    new_turn: &TurnRecord,
    crisis: Option<CrisisEvent>,
    now: DateTime<Utc>,
) {
    bump_intent(&mut summary.recent_intents, new_turn.intent);
    summary.wellness_trend = wellness_trend(turns);
    if let Some(event) = crisis {
        summary.crisis_history.push(event);
        summary.crisis_history = cap_history(&summary.crisis_history);
    }
    summary.preferences = derive_preferences(turns);
    summary.last_updated = now;
}

/// Intent counts, sorted by count descending (label as tiebreak so the
/// ordering is stable), capped at five entries.
fn intent_frequencies(turns: &[TurnRecord]) -> Vec<IntentFrequency> {
    let mut counts: HashMap<Intent, u32> = HashMap::new();
    for turn in turns {
        *counts.entry(turn.intent).or_insert(0) += 1;
    }
    let mut frequencies: Vec<IntentFrequency> = counts
        .into_iter()
        .map(|(intent, count)| IntentFrequency { intent, count })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then(a.intent.label().cmp(b.intent.label())));
    frequencies.truncate(ContextSummary::MAX_RECENT_INTENTS);
    frequencies
}

fn bump_intent(frequencies: &mut Vec<IntentFrequency>, intent: Intent) {
    match frequencies.iter_mut().find(|f| f.intent == intent) {
        Some(f) => f.count += 1,
        None => frequencies.push(IntentFrequency { intent, count: 1 }),
    }
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then(a.intent.label().cmp(b.intent.label())));
    frequencies.truncate(ContextSummary::MAX_RECENT_INTENTS);
}

/// Compare the mean of the earlier half of recent wellness scores with
/// the later half. Wellness is derived from reported stress (10 means
/// no stress at all).
fn wellness_trend(turns: &[TurnRecord]) -> WellnessTrend {
    let scores: Vec<f64> = turns
        .iter()
        .filter_map(|t| t.stress_level)
        .map(|stress| (10.0 - stress as f64).clamp(0.0, 10.0))
        .collect();

    if scores.len() < 4 {
        return WellnessTrend::Stable;
    }

    let mid = scores.len() / 2;
    let earlier: f64 = scores[..mid].iter().sum::<f64>() / mid as f64;
    let later: f64 = scores[mid..].iter().sum::<f64>() / (scores.len() - mid) as f64;
    let delta = later - earlier;

    if delta > TREND_THRESHOLD {
        WellnessTrend::Improving
    } else if delta < -TREND_THRESHOLD {
        WellnessTrend::Declining
    } else {
        WellnessTrend::Stable
    }
}

fn cap_history(history: &[CrisisEvent]) -> Vec<CrisisEvent> {
    let skip = history.len().saturating_sub(ContextSummary::MAX_CRISIS_HISTORY);
    history[skip..].to_vec()
}

fn derive_preferences(turns: &[TurnRecord]) -> Preferences {
    if turns.is_empty() {
        return Preferences::default();
    }

    // Modal language of recent turns.
    let mut language_counts: HashMap<Language, u32> = HashMap::new();
    for turn in turns {
        *language_counts.entry(turn.language).or_insert(0) += 1;
    }
    let preferred_language = language_counts
        .into_iter()
        .max_by_key(|(language, count)| (*count, language.code()))
        .map(|(language, _)| language)
        .unwrap_or_default();

    // Median user message length.
    let mut lengths: Vec<usize> = turns.iter().map(|t| t.user_message.chars().count()).collect();
    lengths.sort_unstable();
    let median = lengths[lengths.len() / 2];

    Preferences {
        preferred_language,
        prefers_brief: median <= BRIEF_MESSAGE_CHARS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(intent: Intent, stress: Option<f32>) -> TurnRecord {
        TurnRecord {
            id: TurnRecord::new_id(),
            user_id: "u1".into(),
            timestamp: Utc::now(),
            user_message: "a message of moderate length for testing".into(),
            language: Language::En,
            intent,
            confidence: 0.8,
            tools_used: vec![],
            response: "ok".into(),
            emotional_tone: Default::default(),
            stress_level: stress,
        }
    }

    #[test]
    fn frequencies_sorted_descending_and_capped() {
        let mut turns = Vec::new();
        for _ in 0..4 {
            turns.push(turn(Intent::QuickTip, None));
        }
        for _ in 0..2 {
            turns.push(turn(Intent::SmallTalk, None));
        }
        turns.push(turn(Intent::PlanBuilder, None));

        let freq = intent_frequencies(&turns);
        assert!(freq.len() <= ContextSummary::MAX_RECENT_INTENTS);
        assert_eq!(freq[0].intent, Intent::QuickTip);
        assert_eq!(freq[0].count, 4);
        assert!(freq.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn improving_trend_when_later_half_is_higher() {
        // Stress dropping means wellness rising.
        let turns: Vec<TurnRecord> = [8.0, 8.0, 3.0, 3.0]
            .iter()
            .map(|s| turn(Intent::TherapySupport, Some(*s)))
            .collect();
        assert_eq!(wellness_trend(&turns), WellnessTrend::Improving);
    }

    #[test]
    fn declining_trend_when_stress_rises() {
        let turns: Vec<TurnRecord> = [2.0, 2.0, 8.0, 8.0]
            .iter()
            .map(|s| turn(Intent::TherapySupport, Some(*s)))
            .collect();
        assert_eq!(wellness_trend(&turns), WellnessTrend::Declining);
    }

    #[test]
    fn small_delta_is_stable() {
        let turns: Vec<TurnRecord> = [5.0, 5.2, 5.1, 5.3]
            .iter()
            .map(|s| turn(Intent::TherapySupport, Some(*s)))
            .collect();
        assert_eq!(wellness_trend(&turns), WellnessTrend::Stable);
    }

    #[test]
    fn too_few_scores_is_stable() {
        let turns = vec![turn(Intent::TherapySupport, Some(9.0))];
        assert_eq!(wellness_trend(&turns), WellnessTrend::Stable);
    }

    #[test]
    fn bump_reorders_frequencies() {
        let mut freq = vec![
            IntentFrequency { intent: Intent::QuickTip, count: 2 },
            IntentFrequency { intent: Intent::SmallTalk, count: 2 },
        ];
        bump_intent(&mut freq, Intent::SmallTalk);
        assert_eq!(freq[0].intent, Intent::SmallTalk);
        assert_eq!(freq[0].count, 3);
    }

    #[test]
    fn crisis_history_is_capped_at_twenty() {
        let events: Vec<CrisisEvent> = (0..25)
            .map(|_| CrisisEvent {
                severity: solace_core::crisis::CrisisSeverity::Medium,
                crisis_type: None,
                at: Utc::now(),
            })
            .collect();
        assert_eq!(cap_history(&events).len(), ContextSummary::MAX_CRISIS_HISTORY);
    }

    #[test]
    fn short_messages_prefer_brief() {
        let mut turns: Vec<TurnRecord> = (0..3).map(|_| turn(Intent::SmallTalk, None)).collect();
        for t in &mut turns {
            t.user_message = "hey".into();
        }
        assert!(derive_preferences(&turns).prefers_brief);
    }
}
