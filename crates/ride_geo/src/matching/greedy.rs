use std::collections::HashSet;

use super::types::MatchCandidate;

/// Greedy batch assignment: highest score first, first claim wins.
///
/// Candidates are stably sorted by descending score, so equal scores keep
/// their input order. Each request is decided at its first (best) candidate
/// in that order: it takes the driver if still free, otherwise it is dropped.
/// A request never falls back to a lower-scoring driver.
///
/// This is a fast approximation of bipartite assignment. It can leave a
/// request unmatched that an optimal solver would have served.
pub fn greedy_assign(candidates: &[MatchCandidate]) -> Vec<MatchCandidate> {
    let mut ranked: Vec<&MatchCandidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut claimed_drivers: HashSet<&str> = HashSet::new();
    let mut decided_requests: HashSet<&str> = HashSet::new();
    let mut accepted = Vec::new();

    for candidate in ranked {
        if !decided_requests.insert(&candidate.request_id) {
            continue;
        }
        if !claimed_drivers.insert(&candidate.driver_id) {
            log::debug!(
                "Dropping request {}: driver {} already claimed",
                candidate.request_id,
                candidate.driver_id
            );
            continue;
        }
        accepted.push(candidate.clone());
    }

    accepted
}
