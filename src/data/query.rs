use super::error::QueryError;
use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Selection lookups
// ---------------------------------------------------------------------------

/// All records matching both the stock code and the year, in load order.
/// An empty result is a normal outcome.
pub fn filter<'a>(dataset: &'a Dataset, stock_code: &str, year: i64) -> Vec<&'a Record> {
    dataset
        .records
        .iter()
        .filter(|r| r.year == year && r.stock_code == stock_code)
        .collect()
}

/// Stock codes matching the sidebar search boxes, sorted.
///
/// * A non-empty `name_query` wins: codes whose company name contains it.
/// * Otherwise a non-empty `code_query`: codes containing it.
/// * Both empty: every code.
pub fn search_stocks(dataset: &Dataset, code_query: &str, name_query: &str) -> Vec<String> {
    let name_query = name_query.trim();
    let code_query = code_query.trim();

    // `stock_codes` is already sorted and distinct.
    dataset
        .stock_codes
        .iter()
        .filter(|code| {
            if !name_query.is_empty() {
                dataset.company_name(code).contains(name_query)
            } else if !code_query.is_empty() {
                code.contains(code_query)
            } else {
                true
            }
        })
        .cloned()
        .collect()
}

/// Resolved (stock code, year) for the current search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub stock_code: String,
    pub year: i64,
}

/// Default stock and year, falling back to the first available values
/// when the configured defaults are not in the dataset. `None` only for
/// an empty dataset.
pub fn default_selection(
    dataset: &Dataset,
    default_stock: &str,
    default_year: i64,
) -> Option<Selection> {
    let stock_code = if dataset.names.contains_key(default_stock) {
        default_stock.to_string()
    } else {
        dataset.stock_codes.first()?.clone()
    };
    let year = if dataset.years.contains(&default_year) {
        default_year
    } else {
        *dataset.years.first()?
    };
    Some(Selection { stock_code, year })
}

/// The first search hit, or `fallback_stock` when nothing matches.
pub fn resolve_stock(hits: &[String], fallback_stock: &str) -> String {
    hits.first()
        .cloned()
        .unwrap_or_else(|| fallback_stock.to_string())
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// A record with its 1-based position in a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<'a> {
    pub rank: usize,
    pub record: &'a Record,
}

/// The `k` highest-scoring records of a year, highest first. Ties keep
/// load order; records without a score are left out.
pub fn top_k(dataset: &Dataset, year: i64, k: usize) -> Vec<Ranked<'_>> {
    let mut slice: Vec<&Record> = dataset
        .year_slice(year)
        .filter(|r| !r.dt_index.is_nan())
        .collect();
    // `sort_by` is stable, so equal scores stay in load order.
    slice.sort_by(|a, b| b.dt_index.total_cmp(&a.dt_index));
    slice
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, record)| Ranked { rank: i + 1, record })
        .collect()
}

/// Number of records in `year` scoring at least `dt_index`.
///
/// Not a competition rank: tied records all get the size of the tie
/// group plus everyone above them, so `[95, 80, 80, 60]` ranks as
/// `[1, 3, 3, 4]`.
pub fn at_least_as_good(dataset: &Dataset, year: i64, dt_index: f64) -> usize {
    dataset
        .year_slice(year)
        .filter(|r| r.dt_index >= dt_index)
        .count()
}

/// One year of an entity's rank history.
#[derive(Debug, Clone, PartialEq)]
pub struct YearRank {
    pub year: i64,
    pub dt_index: f64,
    pub rank: usize,
}

/// Rank of one company in every year it has a record, oldest first.
/// Duplicate rows for a year resolve through the dataset's duplicate policy.
pub fn rank_history(dataset: &Dataset, stock_code: &str) -> Vec<YearRank> {
    dataset
        .years
        .iter()
        .filter_map(|&year| {
            let record = dataset.lookup(stock_code, year)?;
            Some(YearRank {
                year,
                dt_index: record.dt_index,
                rank: at_least_as_good(dataset, year, record.dt_index),
            })
        })
        .collect()
}

/// Position of a score within its year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankInfo {
    pub rank: usize,
    pub total: usize,
    pub percentile: f64,
}

/// `(total - rank + 1) / total * 100`; undefined for an empty group.
pub fn percentile(rank: usize, total: usize, year: i64) -> Result<f64, QueryError> {
    if total == 0 {
        return Err(QueryError::EmptyGroup { year });
    }
    Ok((total as f64 - rank as f64 + 1.0) / total as f64 * 100.0)
}

/// Rank, group size and percentile of `dt_index` within `year`.
pub fn current_rank(dataset: &Dataset, year: i64, dt_index: f64) -> Result<RankInfo, QueryError> {
    if dt_index.is_nan() {
        return Err(QueryError::MissingScore);
    }
    let total = dataset.year_slice(year).count();
    let rank = at_least_as_good(dataset, year, dt_index);
    let percentile = percentile(rank, total, year)?;
    Ok(RankInfo {
        rank,
        total,
        percentile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    fn scores(year: i64, values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| record(&format!("{:06}", i + 1), year, *v))
            .collect()
    }

    #[test]
    fn filter_matches_code_and_year() {
        let ds = Dataset::from_records(vec![
            record("600000", 2019, 40.0),
            record("600000", 2020, 50.0),
            record("600001", 2019, 60.0),
        ]);
        let hits = filter(&ds, "600000", 2020);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].dt_index, 50.0);
        assert!(filter(&ds, "999999", 1999).is_empty());
    }

    #[test]
    fn top_k_orders_descending_with_stable_ties() {
        let ds = Dataset::from_records(scores(2020, &[70.0, 90.0, 50.0, 90.0]));
        let top = top_k(&ds, 2020, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].record.stock_code, "000002");
        assert_eq!(top[1].record.stock_code, "000004");
        assert_eq!(top[0].rank, 1);
        assert_eq!(top[1].rank, 2);

        let again = top_k(&ds, 2020, 2);
        assert_eq!(top, again);
    }

    #[test]
    fn top_k_is_non_increasing_and_skips_missing_scores() {
        let mut records = scores(2020, &[10.0, 55.0, 30.0, 99.0, 55.0]);
        records.push(record("nan", 2020, f64::NAN));
        records.push(record("other", 2021, 100.0));
        let ds = Dataset::from_records(records);

        let top = top_k(&ds, 2020, 10);
        assert_eq!(top.len(), 5);
        assert!(top
            .windows(2)
            .all(|w| w[0].record.dt_index >= w[1].record.dt_index));
        assert_eq!(top.last().map(|r| r.rank), Some(5));
    }

    #[test]
    fn rank_counts_records_at_least_as_good() {
        let ds = Dataset::from_records(scores(2021, &[95.0, 80.0, 80.0, 60.0]));
        let ranks: Vec<usize> = ["000001", "000002", "000003", "000004"]
            .iter()
            .map(|code| rank_history(&ds, code)[0].rank)
            .collect();
        assert_eq!(ranks, vec![1, 3, 3, 4]);
    }

    #[test]
    fn rank_history_covers_each_year_of_the_entity() {
        let ds = Dataset::from_records(vec![
            record("600000", 2020, 50.0),
            record("600001", 2019, 60.0),
            record("600000", 2019, 70.0),
            record("600001", 2020, 40.0),
            record("600002", 2021, 10.0),
        ]);
        let history = rank_history(&ds, "600000");
        assert_eq!(
            history,
            vec![
                YearRank {
                    year: 2019,
                    dt_index: 70.0,
                    rank: 1
                },
                YearRank {
                    year: 2020,
                    dt_index: 50.0,
                    rank: 1
                },
            ]
        );
        assert!(rank_history(&ds, "999999").is_empty());
    }

    #[test]
    fn percentile_formula() {
        assert_eq!(percentile(3, 4, 2020), Ok(50.0));
        assert_eq!(percentile(1, 4, 2020), Ok(100.0));
        assert_eq!(
            percentile(0, 0, 1999),
            Err(QueryError::EmptyGroup { year: 1999 })
        );
    }

    #[test]
    fn current_rank_guards_empty_groups_and_missing_scores() {
        let ds = Dataset::from_records(scores(2021, &[95.0, 80.0, 80.0, 60.0]));

        let info = current_rank(&ds, 2021, 80.0).unwrap();
        assert_eq!(info.rank, 3);
        assert_eq!(info.total, 4);
        assert_eq!(info.percentile, 50.0);

        assert_eq!(
            current_rank(&ds, 1999, 80.0),
            Err(QueryError::EmptyGroup { year: 1999 })
        );
        assert_eq!(
            current_rank(&ds, 2021, f64::NAN),
            Err(QueryError::MissingScore)
        );
    }

    #[test]
    fn name_search_takes_precedence_over_code_search() {
        let mut a = record("600000", 2019, 1.0);
        a.company_name = "Pudong Bank".into();
        let mut b = record("000001", 2019, 1.0);
        b.company_name = "Ping An Bank".into();
        let mut c = record("600519", 2019, 1.0);
        c.company_name = "Moutai".into();
        let ds = Dataset::from_records(vec![a, b, c]);

        assert_eq!(search_stocks(&ds, "600", "Bank"), vec!["000001", "600000"]);
        assert_eq!(search_stocks(&ds, "600", ""), vec!["600000", "600519"]);
        assert_eq!(search_stocks(&ds, "", "").len(), 3);
        assert!(search_stocks(&ds, "", "nothing").is_empty());
        assert_eq!(resolve_stock(&[], "600000"), "600000");
    }

    #[test]
    fn defaults_fall_back_to_first_available_values() {
        let ds = Dataset::from_records(vec![
            record("600001", 2015, 1.0),
            record("000001", 2016, 1.0),
        ]);
        assert_eq!(
            default_selection(&ds, "600000", 1999),
            Some(Selection {
                stock_code: "000001".into(),
                year: 2015
            })
        );
        assert_eq!(
            default_selection(&ds, "600001", 2016),
            Some(Selection {
                stock_code: "600001".into(),
                year: 2016
            })
        );
        assert_eq!(
            default_selection(&Dataset::from_records(Vec::new()), "600000", 1999),
            None
        );
    }
}
