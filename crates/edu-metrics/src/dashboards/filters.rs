use super::domain::{DateRange, Dated, SourceFilter, Sourced};

/// Keeps records whose relevant date falls inside the window, inclusive on
/// both ends. Unparseable or absent dates are dropped, not kept as
/// "unknown". Survivors stay in their original order so drill-down tables
/// display rows as the feed listed them.
pub(crate) fn filter_by_date_range<'a, T, I>(records: I, range: DateRange) -> Vec<&'a T>
where
    T: Dated,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|record| {
            record
                .relevant_date()
                .is_some_and(|date| range.contains(date))
        })
        .collect()
}

/// Keeps records whose normalized channel is a member of the filter set.
/// Order-preserving; composes with [`filter_by_date_range`] in either order.
pub(crate) fn filter_by_sources<'a, T, I>(records: I, sources: &SourceFilter) -> Vec<&'a T>
where
    T: Sourced,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|record| sources.contains(record.channel()))
        .collect()
}
