//! Watchlist views: filtering, ordering, and aggregate statistics.
//!
//! The store is only asked for "every entry owned by this user"; everything
//! else happens here over plain values, so filters and sort keys never become
//! SQL text.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use uuid::Uuid;

use crate::{
    db::WatchlistStore,
    error::AppResult,
    models::{
        HistogramBucket, RecentAddition, SortKey, TopRated, WatchlistCounts, WatchlistEntry,
        WatchlistFilter, WatchlistSnapshot, WatchlistStats,
    },
};

/// Entries listed under "recently added"
pub const RECENT_LIMIT: usize = 5;
/// Entries listed under "top rated"
pub const TOP_RATED_LIMIT: usize = 5;

type Comparator = fn(&WatchlistEntry, &WatchlistEntry) -> Ordering;

/// Filtered, ordered view of one user's watchlist
pub async fn list_entries(
    store: &dyn WatchlistStore,
    user_id: Uuid,
    filter: &WatchlistFilter,
) -> AppResult<Vec<WatchlistEntry>> {
    let entries = store.entries_for_user(user_id).await?;
    Ok(apply_filter(entries, user_id, filter))
}

/// Every genre used in the user's watchlist, de-duplicated and sorted
pub async fn distinct_genres(store: &dyn WatchlistStore, user_id: Uuid) -> AppResult<Vec<String>> {
    let entries = owned_entries(store, user_id).await?;
    Ok(genres_of(&entries))
}

/// Watched, unwatched and total counts.
///
/// Unlike [`compute_statistics`] this skips the histograms and rankings,
/// which keeps it cheap enough to call on every page render.
pub async fn count_entries(
    store: &dyn WatchlistStore,
    user_id: Uuid,
) -> AppResult<WatchlistCounts> {
    let entries = owned_entries(store, user_id).await?;
    Ok(counts_of(&entries))
}

/// Full statistics. A store failure fails the whole call.
pub async fn compute_statistics(
    store: &dyn WatchlistStore,
    user_id: Uuid,
) -> AppResult<WatchlistStats> {
    let entries = owned_entries(store, user_id).await?;
    Ok(statistics_of(&entries))
}

/// Filtered entries, the genre picker and the counts from a single store read
///
/// The three parts always describe the same state of the watchlist, even
/// while other requests are writing to it.
pub async fn snapshot(
    store: &dyn WatchlistStore,
    user_id: Uuid,
    filter: &WatchlistFilter,
) -> AppResult<WatchlistSnapshot> {
    let entries = owned_entries(store, user_id).await?;
    let genres = genres_of(&entries);
    let counts = counts_of(&entries);

    Ok(WatchlistSnapshot {
        entries: apply_filter(entries, user_id, filter),
        genres,
        counts,
    })
}

async fn owned_entries(store: &dyn WatchlistStore, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
    let mut entries = store.entries_for_user(user_id).await?;
    entries.retain(|entry| entry.user_id == user_id);
    Ok(entries)
}

/// Applies `filter` to entries given in insertion order
///
/// Entries not owned by `user_id` are always dropped. The sort is stable, so
/// ties keep insertion order.
pub fn apply_filter(
    entries: Vec<WatchlistEntry>,
    user_id: Uuid,
    filter: &WatchlistFilter,
) -> Vec<WatchlistEntry> {
    let mut matching: Vec<WatchlistEntry> = entries
        .into_iter()
        .filter(|entry| entry.user_id == user_id && matches(entry, filter))
        .collect();
    matching.sort_by(comparator(filter.sort));
    matching
}

fn matches(entry: &WatchlistEntry, filter: &WatchlistFilter) -> bool {
    if let Some(genre) = &filter.genre {
        if !contains_ignore_ascii_case(&entry.genre_string(), genre) {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        if !contains_ignore_ascii_case(&entry.title, search) {
            return false;
        }
    }
    filter.status.matches(entry.watched)
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

fn comparator(sort: SortKey) -> Comparator {
    match sort {
        SortKey::TitleAsc => |a, b| a.title.cmp(&b.title),
        SortKey::TitleDesc => |a, b| b.title.cmp(&a.title),
        SortKey::YearAsc => |a, b| a.release_date.cmp(&b.release_date),
        SortKey::YearDesc => |a, b| b.release_date.cmp(&a.release_date),
        // `None < Some(_)`, so unrated entries lead
        SortKey::RatingAsc => |a, b| a.personal_rating.cmp(&b.personal_rating),
        SortKey::RatingDesc => rating_desc_unrated_last,
        SortKey::DateAddedAsc => added_order,
        SortKey::DateAddedDesc => |a, b| added_order(b, a),
    }
}

fn rating_desc_unrated_last(a: &WatchlistEntry, b: &WatchlistEntry) -> Ordering {
    match (a.personal_rating, b.personal_rating) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn added_order(a: &WatchlistEntry, b: &WatchlistEntry) -> Ordering {
    a.date_added.cmp(&b.date_added).then(a.id.cmp(&b.id))
}

/// Distinct, trimmed genre names in ascending order
pub fn genres_of(entries: &[WatchlistEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.genres.iter())
        .map(|genre| genre.trim())
        .filter(|genre| !genre.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Counts over every entry given; `unwatched` is derived, so the three
/// numbers always add up.
pub fn counts_of(entries: &[WatchlistEntry]) -> WatchlistCounts {
    let total = entries.len();
    let watched = entries.iter().filter(|entry| entry.watched).count();
    WatchlistCounts {
        total,
        watched,
        unwatched: total - watched,
    }
}

pub fn statistics_of(entries: &[WatchlistEntry]) -> WatchlistStats {
    WatchlistStats {
        counts: counts_of(entries),
        average_rating: average_rating(entries),
        genres: genre_histogram(entries),
        years: year_histogram(entries),
        recent_additions: recent_additions(entries),
        top_rated: top_rated(entries),
    }
}

fn average_rating(entries: &[WatchlistEntry]) -> Option<f64> {
    let ratings: Vec<f64> = entries
        .iter()
        .filter_map(|entry| entry.personal_rating)
        .map(f64::from)
        .collect();
    if ratings.is_empty() {
        return None;
    }
    let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
    // Halves go to the even digit, so a mean of 4.25 reports as 4.2
    Some((mean * 10.0).round_ties_even() / 10.0)
}

/// Most common first; equal counts keep first-encounter order
fn genre_histogram(entries: &[WatchlistEntry]) -> Vec<HistogramBucket> {
    let mut buckets: Vec<HistogramBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for genre in entries.iter().flat_map(|entry| entry.genres.iter()) {
        let genre = genre.trim();
        if genre.is_empty() {
            continue;
        }
        match index.get(genre) {
            Some(&i) => buckets[i].count += 1,
            None => {
                index.insert(genre.to_string(), buckets.len());
                buckets.push(HistogramBucket {
                    key: genre.to_string(),
                    count: 1,
                });
            }
        }
    }

    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Newest year first
fn year_histogram(entries: &[WatchlistEntry]) -> Vec<HistogramBucket> {
    let mut years: BTreeMap<&str, usize> = BTreeMap::new();
    for year in entries.iter().filter_map(WatchlistEntry::release_year) {
        *years.entry(year).or_default() += 1;
    }
    years
        .into_iter()
        .rev()
        .map(|(year, count)| HistogramBucket {
            key: year.to_string(),
            count,
        })
        .collect()
}

fn recent_additions(entries: &[WatchlistEntry]) -> Vec<RecentAddition> {
    let mut recent: Vec<&WatchlistEntry> = entries.iter().collect();
    recent.sort_by(|a, b| added_order(b, a));
    recent
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|entry| RecentAddition {
            title: entry.title.clone(),
            date_added: entry.date_added,
        })
        .collect()
}

fn top_rated(entries: &[WatchlistEntry]) -> Vec<TopRated> {
    let mut rated: Vec<(&WatchlistEntry, u8)> = entries
        .iter()
        .filter_map(|entry| entry.personal_rating.map(|rating| (entry, rating)))
        .collect();
    rated.sort_by(|a, b| b.1.cmp(&a.1));
    rated
        .into_iter()
        .take(TOP_RATED_LIMIT)
        .map(|(entry, rating)| TopRated {
            title: entry.title.clone(),
            personal_rating: rating,
        })
        .collect()
}
