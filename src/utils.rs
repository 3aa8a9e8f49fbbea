use edit_distance::edit_distance;

/// Largest edit distance at which a candidate is still offered as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Finds the candidate closest to `name`, for "did you mean" messages.
pub(crate) fn suggest<'a, I>(name: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (edit_distance(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min()
        .map(|(_, candidate)| candidate.to_string())
}

#[test]
fn test_suggest() {
    let names = ["loop", "count", "pointer"];

    assert_eq!(suggest("lop", names.iter().copied()), Some("loop".to_string()));
    assert_eq!(suggest("cuont", names.iter().copied()), Some("count".to_string()));
    assert_eq!(suggest("unrelated", names.iter().copied()), None);
}
