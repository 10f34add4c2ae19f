use super::domain::Partner;

/// Left fold keeping the earlier item unless a later one is strictly greater.
fn first_max_by<T, K, F>(items: &[T], key: F) -> Option<&T>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let (first, rest) = items.split_first()?;
    Some(rest.iter().fold(first, |best, candidate| {
        if key(candidate) > key(best) {
            candidate
        } else {
            best
        }
    }))
}

/// Partner with the highest historical recovery rate, first occurrence on ties.
pub fn top_by_recovery_rate(partners: &[Partner]) -> Option<&Partner> {
    first_max_by(partners, |partner| partner.recovery_rate)
}

/// Partner with the highest raw capacity, first occurrence on ties.
///
/// Ranks by `capacity`, not by remaining headroom.
pub fn top_by_capacity(partners: &[Partner]) -> Option<&Partner> {
    first_max_by(partners, |partner| partner.capacity)
}
