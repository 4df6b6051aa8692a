use crate::domain::{Freshness, ImageDigest};

/// Decides whether a running container needs to be recreated.
///
/// Only two resolved, different digests make a container stale. A missing
/// digest on either side means there is nothing known to be newer.
pub fn compare(current: Option<&ImageDigest>, latest: Option<&ImageDigest>) -> Freshness {
    match (current, latest) {
        (Some(current), Some(latest)) if current != latest => Freshness::Stale,
        _ => Freshness::UpToDate,
    }
}
