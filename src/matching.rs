//! Candidate selection for catalog search results
//!
//! Given a search variation and the candidates the catalog returned for it,
//! picks the hit to use for the card image. Matching is containment over
//! normalized lowercase titles; the first satisfying candidate wins in
//! provider order, with no scoring or re-ranking.

use crate::data::catalog::SearchHit;
use crate::normalize::clean_title;

/// Returns the first candidate whose titles match the query variation.
///
/// A candidate matches when, after [`clean_title`] normalization and
/// lowercasing, its primary title contains the query, the query contains its
/// primary title, or any of its alternate titles contains the query.
/// Provider order is preserved; a later, closer match never displaces an
/// earlier satisfying one. Returns `None` when nothing matches.
pub fn select_best<'a>(variation: &str, candidates: &'a [SearchHit]) -> Option<&'a SearchHit> {
    let query = clean_title(variation).to_lowercase();

    candidates.iter().find(|hit| {
        let title = clean_title(&hit.title).to_lowercase();
        title.contains(&query)
            || query.contains(&title)
            || hit
                .titles
                .iter()
                .any(|alt| clean_title(&alt.title).to_lowercase().contains(&query))
    })
}
