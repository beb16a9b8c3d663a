//! Property tests for extraction, partitioning and aggregation invariants

use std::sync::Arc;

use beauty_trends::analytics::{
    merge_into, partition, rank, tokenize, Language, TermExtractor, TermFrequencyMap, TrendHistory,
};
use beauty_trends::TrendSnapshot;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            "[a-z]{1,8}",
            Just("the".to_string()),
            Just("serum".to_string()),
            Just("美容液".to_string()),
            Just("化粧水".to_string()),
            Just("です".to_string()),
        ],
        0..40,
    )
}

fn frequency_map() -> impl Strategy<Value = TermFrequencyMap> {
    prop::collection::vec(("[a-z]{3,6}", 1u64..50), 0..20)
        .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn extracted_terms_meet_threshold(texts in prop::collection::vec(words(), 0..10), min in 1u64..6) {
        let texts: Vec<String> = texts.into_iter().map(|w| w.join(" ")).collect();
        let extractor = TermExtractor::new(min);

        for language in [Language::English, Language::Japanese] {
            let terms = extractor.extract(&texts, language);
            for (term, count) in &terms {
                prop_assert!(*count >= min);
                prop_assert!(term.chars().count() > 2);
                prop_assert!(term.chars().all(char::is_alphabetic));
                prop_assert_eq!(term.clone(), term.to_lowercase());
            }
        }
    }

    #[test]
    fn extract_is_subset_of_count(texts in prop::collection::vec(words(), 0..10)) {
        let texts: Vec<String> = texts.into_iter().map(|w| w.join(" ")).collect();
        let extractor = TermExtractor::default();

        let all = extractor.count(&texts, Language::English);
        let kept = extractor.extract(&texts, Language::English);
        for (term, count) in &kept {
            prop_assert_eq!(all.get(term), Some(count));
        }
    }

    #[test]
    fn tokens_are_never_empty(text in "\\PC{0,60}") {
        for token in tokenize(&text) {
            prop_assert!(!token.is_empty());
        }
    }

    #[test]
    fn partition_keeps_every_nonempty_text_in_order(texts in prop::collection::vec("\\PC{0,12}", 0..30)) {
        let parts = partition(texts.clone(), 1000);
        let nonempty: Vec<_> = texts.iter().filter(|t| !t.is_empty()).collect();

        prop_assert_eq!(parts.len(), nonempty.len());

        let english: Vec<_> = nonempty
            .iter()
            .filter(|t| t.chars().next().is_some_and(|c| (c as u32) <= 1000))
            .map(|t| t.to_string())
            .collect();
        prop_assert_eq!(parts.bucket(Language::English).to_vec(), english);
        prop_assert!(parts
            .bucket(Language::Japanese)
            .iter()
            .all(|t| t.chars().next().is_some_and(|c| (c as u32) > 1000)));
    }

    #[test]
    fn merge_order_does_not_change_counts(a in frequency_map(), b in frequency_map()) {
        let mut ab = TermFrequencyMap::new();
        merge_into(&mut ab, &a);
        merge_into(&mut ab, &b);

        let mut ba = TermFrequencyMap::new();
        merge_into(&mut ba, &b);
        merge_into(&mut ba, &a);

        prop_assert_eq!(ab.len(), ba.len());
        for (term, count) in &ab {
            prop_assert_eq!(ba.get(term), Some(count));
            let expected = a.get(term).copied().unwrap_or(0) + b.get(term).copied().unwrap_or(0);
            prop_assert_eq!(*count, expected);
        }
    }

    #[test]
    fn rank_is_sorted_and_bounded(map in frequency_map(), top_n in 1usize..25) {
        let total = map.len();
        let ranked = rank(map, top_n);

        prop_assert_eq!(ranked.len(), total.min(top_n));
        prop_assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn history_never_exceeds_capacity(capacity in 1usize..20, runs in 0usize..60) {
        let start = Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap();
        let mut history = TrendHistory::new(capacity);

        for i in 0..runs {
            let ts = start + Duration::minutes(i as i64);
            history.push(TrendSnapshot::new(ts, Vec::new()));
            prop_assert!(history.len() <= capacity);
        }

        prop_assert_eq!(history.len(), runs.min(capacity));
        if runs > 0 {
            let oldest = start + Duration::minutes(runs.saturating_sub(capacity) as i64);
            prop_assert_eq!(history.iter().next().map(|s| s.timestamp), Some(oldest));
        }
    }
}

#[test]
fn shared_history_survives_concurrent_runs() {
    use beauty_trends::analytics::TrendMonitor;
    use beauty_trends::config::TrendConfig;
    use beauty_trends::storage::create_mock_store;

    let config = TrendConfig {
        history_capacity: 10,
        ..TrendConfig::default()
    };
    let monitor = Arc::new(TrendMonitor::new(create_mock_store(), &config));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let monitor = Arc::clone(&monitor);
            std::thread::spawn(move || {
                for _ in 0..10 {
                    monitor.run_once();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(monitor.history().len(), 10);
}
