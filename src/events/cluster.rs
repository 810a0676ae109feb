//! Same-day news clustering by referenced-entity overlap.

use std::collections::HashSet;

use crate::model::{EventType, NewsItem};
use crate::rules::event_types;
use crate::similarity::jaccard;

/// Clusters smaller than this are candidates for type-based regrouping.
const SMALL_CLUSTER: usize = 3;

/// Lowercased `title content` of every item, as scanned by the classifier.
pub fn combined_text<'a>(items: impl IntoIterator<Item = &'a NewsItem>) -> String {
    let mut text = String::new();
    for item in items {
        text.push_str(&item.title);
        text.push(' ');
        text.push_str(&item.content);
        text.push(' ');
    }
    text.to_lowercase()
}

/// Classify a group of news items by their combined text.
pub fn classify_items<'a>(items: impl IntoIterator<Item = &'a NewsItem>) -> EventType {
    event_types::classify(&combined_text(items))
}

/// Group same-day news into clusters, returned as indices into `items`.
///
/// Each unvisited item seeds a cluster and pulls in every other unvisited
/// item whose entity-set similarity with the seed is at least `threshold`.
/// Chains are followed one hop only. When that leaves more clusters than
/// half the item count, clusters under three items are merged per event
/// type and appended after the larger clusters.
pub fn cluster_news(items: &[NewsItem], threshold: f64) -> Vec<Vec<usize>> {
    let n = items.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![vec![0]];
    }

    let sets: Vec<HashSet<&str>> = items
        .iter()
        .map(|item| item.entities.iter().map(String::as_str).collect())
        .collect();

    let mut visited = vec![false; n];
    let mut clusters = Vec::new();
    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut cluster = vec![i];
        for j in 0..n {
            if visited[j] {
                continue;
            }
            if jaccard(&sets[i], &sets[j]) >= threshold {
                cluster.push(j);
                visited[j] = true;
            }
        }
        clusters.push(cluster);
    }

    if clusters.len() <= n / 2 {
        return clusters;
    }

    let (mut large, small): (Vec<_>, Vec<_>) = clusters
        .into_iter()
        .partition(|c| c.len() >= SMALL_CLUSTER);

    let mut by_type: Vec<(EventType, Vec<usize>)> = Vec::new();
    for cluster in small {
        let event_type = classify_items(cluster.iter().map(|&i| &items[i]));
        match by_type.iter_mut().find(|(t, _)| *t == event_type) {
            Some((_, members)) => members.extend(cluster),
            None => by_type.push((event_type, cluster)),
        }
    }
    large.extend(by_type.into_iter().map(|(_, members)| members));
    large
}
