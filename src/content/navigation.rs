//! Previous/next post resolution

use super::{nav_link, NavigationContext, POST_TYPE};
use crate::prismic::{ContentSource, Predicate, PrismicError, QueryOptions};

/// Ordering whose first result after a post is the post before it
pub const PREVIOUS_ORDERING: &str = "[document.last_publication_date desc]";
/// Ordering whose first result after a post is the post after it
pub const NEXT_ORDERING: &str = "[document.first_publication_date]";

/// Find the sibling posts of the document `id`. A missing sibling is not an
/// error, the direction is simply left empty.
pub async fn resolve<S: ContentSource + ?Sized>(
    source: &S,
    id: &str,
    content_ref: Option<&str>,
) -> Result<NavigationContext, PrismicError> {
    let predicates = [Predicate::at("document.type", POST_TYPE)];
    let base = QueryOptions::new()
        .page_size(1)
        .after(id)
        .fetch(["post.title"])
        .content_ref(content_ref.map(str::to_string));

    let previous_options = base.clone().orderings(PREVIOUS_ORDERING);
    let next_options = base.orderings(NEXT_ORDERING);

    let (previous, next) = futures::try_join!(
        source.query(&predicates, &previous_options),
        source.query(&predicates, &next_options)
    )?;

    let context = NavigationContext {
        previous: previous.results.first().and_then(nav_link),
        next: next.results.first().and_then(nav_link),
    };
    tracing::debug!(
        "Navigation for {}: previous={:?} next={:?}",
        id,
        context.previous.as_ref().map(|l| &l.slug),
        context.next.as_ref().map(|l| &l.slug)
    );
    Ok(context)
}
