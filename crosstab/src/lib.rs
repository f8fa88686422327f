/*!
Counting primitives for survey responses.

The two entry points are [`frequency_distribution`], which counts the
records in each category of a column, and [`compare_frequencies`], which
puts the counts of a subgroup of respondents next to the counts of the
whole population:

```
use crosstab::*;

let dataset = Dataset::new(
    vec!["caste".to_string(), "preference".to_string()],
    vec![
        vec![Value::Text("A".to_string()), Value::Text("X".to_string())],
        vec![Value::Text("A".to_string()), Value::Text("Y".to_string())],
        vec![Value::Text("B".to_string()), Value::Text("X".to_string())],
    ],
)?;

let table = compare_frequencies(&dataset, "caste", &ColumnEquals::new("preference", "X"))?;
let a = table.get(&Category::new("A")).unwrap();
assert_eq!((a.count, a.total), (1, 2));
assert_eq!(a.percentage, Some(50.0));
# Ok::<(), SchemaError>(())
```
*/
mod model;
pub mod manual;

use log::debug;

pub use crate::model::*;

/// Counts the records in each category of `column`.
///
/// Missing values are not counted. Fails if the column does not exist.
pub fn frequency_distribution(
    dataset: &Dataset,
    column: &str,
) -> Result<FrequencyTable, SchemaError> {
    frequency_distribution_where(dataset, column, &AllRecords)
}

/// Counts the records in each category of `column`, restricted to the
/// records selected by `filter`.
pub fn frequency_distribution_where<F: RecordFilter + ?Sized>(
    dataset: &Dataset,
    column: &str,
    filter: &F,
) -> Result<FrequencyTable, SchemaError> {
    let position = dataset.schema().require(column)?;
    filter.check_schema(dataset.schema())?;
    Ok(tally(dataset, position, filter))
}

/// Compares the distribution of a subgroup over `column` with the
/// distribution of the whole dataset.
///
/// Arguments:
/// * `dataset` the survey responses
/// * `column` the category column
/// * `filter` selects the subgroup, for example the respondents who prefer
/// a given candidate
///
/// The total of each category is always the unconditional count over the
/// dataset, including the records the filter could never select.
pub fn compare_frequencies<F: RecordFilter + ?Sized>(
    dataset: &Dataset,
    column: &str,
    filter: &F,
) -> Result<ComparisonTable, SchemaError> {
    let position = dataset.schema().require(column)?;
    filter.check_schema(dataset.schema())?;
    let population = tally(dataset, position, &AllRecords);
    let subgroup = tally(dataset, position, filter);
    debug!(
        "compare_frequencies: column: {:?} population: {} in {} categories, subgroup: {} in {} categories",
        column,
        population.total(),
        population.len(),
        subgroup.total(),
        subgroup.len()
    );
    Ok(compare_tables(&subgroup, &population))
}

/// Outer join of a subgroup table and a population table.
///
/// Categories come in population order, followed by the categories only the
/// subgroup has. Those get a total of zero and no percentage.
pub fn compare_tables(subgroup: &FrequencyTable, population: &FrequencyTable) -> ComparisonTable {
    let mut rows: Vec<ComparisonRow> = Vec::with_capacity(population.len());
    for (category, total) in population.iter() {
        let count = subgroup.get(category).unwrap_or(0);
        rows.push(ComparisonRow::new(category.clone(), count, total));
    }
    for (category, count) in subgroup.iter() {
        if population.get(category).is_none() {
            debug!(
                "compare_tables: category {:?} only present in the subgroup",
                category
            );
            rows.push(ComparisonRow::new(category.clone(), count, 0));
        }
    }
    ComparisonTable::from_rows(rows)
}

fn tally<F: RecordFilter + ?Sized>(
    dataset: &Dataset,
    position: usize,
    filter: &F,
) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for record in dataset.records() {
        if !filter.matches(&record) {
            continue;
        }
        if let Some(category) = record.value_at(position).and_then(|v| v.category()) {
            table.add(category);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // Five respondents, the subgroup being the rows marked "X".
    fn caste_dataset() -> Dataset {
        Dataset::new(
            columns(&["caste", "preference"]),
            vec![
                vec![text("A"), text("X")],
                vec![text("A"), text("X")],
                vec![text("B"), text("X")],
                vec![text("A"), text("Y")],
                vec![text("C"), Value::Missing],
            ],
        )
        .unwrap()
    }

    fn mixed_dataset() -> Dataset {
        Dataset::new(
            columns(&["age", "village", "preference"]),
            vec![
                vec![Value::Int(25), text("North"), text("X")],
                vec![Value::Float(25.0), text("South"), text("Y")],
                vec![Value::Missing, text("North"), text("X")],
                vec![Value::Float(f64::NAN), text(" "), text("X")],
                vec![Value::Int(40), text("North"), Value::Missing],
                vec![text("60+"), text("East"), text("Y")],
                vec![Value::Float(32.5)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn caste_example() {
        init();
        let dataset = caste_dataset();
        let population = frequency_distribution(&dataset, "caste").unwrap();
        assert_eq!(population.count_of("A"), 3);
        assert_eq!(population.count_of("B"), 1);
        assert_eq!(population.count_of("C"), 1);

        let filter = ColumnEquals::new("preference", "X");
        let subgroup = frequency_distribution_where(&dataset, "caste", &filter).unwrap();
        assert_eq!(subgroup.count_of("A"), 2);
        assert_eq!(subgroup.count_of("B"), 1);
        assert_eq!(subgroup.get(&Category::new("C")), None);

        let table = compare_frequencies(&dataset, "caste", &filter).unwrap();
        assert_eq!(table.len(), 3);

        let a = table.get(&Category::new("A")).unwrap();
        assert_eq!((a.count, a.total), (2, 3));
        assert!((a.percentage.unwrap() - 66.666_666).abs() < 1e-4);

        let b = table.get(&Category::new("B")).unwrap();
        assert_eq!((b.count, b.total, b.percentage), (1, 1, Some(100.0)));

        let c = table.get(&Category::new("C")).unwrap();
        assert_eq!((c.count, c.total, c.percentage), (0, 1, Some(0.0)));
    }

    #[test]
    fn empty_dataset() {
        let dataset = Dataset::new(columns(&["caste", "preference"]), vec![]).unwrap();
        assert!(dataset.is_empty());
        let dist = frequency_distribution(&dataset, "caste").unwrap();
        assert!(dist.is_empty());
        let table =
            compare_frequencies(&dataset, "caste", &ColumnEquals::new("preference", "X")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn missing_column() {
        let dataset = caste_dataset();
        let expected = SchemaError::MissingColumn {
            column: "religion".to_string(),
        };
        assert_eq!(
            frequency_distribution(&dataset, "religion"),
            Err(expected.clone())
        );
        assert_eq!(
            compare_frequencies(&dataset, "religion", &AllRecords),
            Err(expected.clone())
        );
        // The filter column is checked as well.
        assert_eq!(
            compare_frequencies(&dataset, "caste", &ColumnEquals::new("religion", "X")),
            Err(expected)
        );
    }

    #[test]
    fn duplicate_column() {
        let res = Dataset::new(columns(&["caste", "caste"]), vec![]);
        assert_eq!(
            res,
            Err(SchemaError::DuplicateColumn {
                column: "caste".to_string()
            })
        );
    }

    #[test]
    fn missing_values_are_excluded() {
        let dataset = mixed_dataset();
        let ages = frequency_distribution(&dataset, "age").unwrap();
        // 25 and 25.0 are the same category, NaN and missing cells are dropped.
        assert_eq!(ages.count_of("25"), 2);
        assert_eq!(ages.count_of("40"), 1);
        assert_eq!(ages.count_of("60+"), 1);
        assert_eq!(ages.count_of("32.5"), 1);
        assert_eq!(ages.len(), 4);
        assert_eq!(ages.total(), 5);

        let villages = frequency_distribution(&dataset, "village").unwrap();
        assert_eq!(villages.count_of(" "), 0);
        assert_eq!(villages.total(), 5);
    }

    #[test]
    fn totals_match_non_missing_records() {
        let dataset = mixed_dataset();
        for column in ["age", "village", "preference"] {
            let dist = frequency_distribution(&dataset, column).unwrap();
            let non_missing = dataset
                .records()
                .filter(|r| !r.get(column).unwrap().is_missing())
                .count() as u64;
            assert_eq!(dist.total(), non_missing, "column {}", column);

            let filter = ColumnEquals::new("preference", "X");
            let table = compare_frequencies(&dataset, column, &filter).unwrap();
            assert_eq!(table.total_population(), non_missing);
            let matching = dataset
                .records()
                .filter(|r| filter.matches(r) && !r.get(column).unwrap().is_missing())
                .count() as u64;
            assert_eq!(table.total_count(), matching);
            for row in table.rows() {
                assert!(row.count <= row.total, "{:?}", row);
            }
        }
    }

    #[test]
    fn outer_join_lists_each_category_once() {
        let dataset = mixed_dataset();
        let table =
            compare_frequencies(&dataset, "village", &ColumnEquals::new("preference", "Y"))
                .unwrap();
        let names: Vec<&str> = table.rows().iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["North", "South", "East"]);
        let north = table.get(&Category::new("North")).unwrap();
        assert_eq!((north.count, north.total), (0, 3));
    }

    #[test]
    fn closure_filter() {
        let dataset = mixed_dataset();
        let filter = |r: &Record<'_>| r.category("village") == Some(Category::new("North"));
        let table = compare_frequencies(&dataset, "preference", &filter).unwrap();
        let x = table.get(&Category::new("X")).unwrap();
        assert_eq!((x.count, x.total), (2, 3));
        let y = table.get(&Category::new("Y")).unwrap();
        assert_eq!((y.count, y.total), (0, 2));
    }

    #[test]
    fn subgroup_only_categories_have_no_percentage() {
        let mut subgroup = FrequencyTable::new();
        subgroup.add(Category::new("A"));
        subgroup.add(Category::new("D"));
        let mut population = FrequencyTable::new();
        population.add_count(Category::new("A"), 4);
        population.add(Category::new("B"));

        let table = compare_tables(&subgroup, &population);
        let names: Vec<&str> = table.rows().iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "D"]);
        let d = table.get(&Category::new("D")).unwrap();
        assert_eq!((d.count, d.total), (1, 0));
        assert_eq!(d.percentage, None);
        let b = table.get(&Category::new("B")).unwrap();
        assert_eq!(b.percentage, Some(0.0));
    }

    #[test]
    fn repeated_calls_agree() {
        let dataset = caste_dataset();
        let filter = ColumnEquals::new("preference", "X");
        let first = compare_frequencies(&dataset, "caste", &filter).unwrap();
        let second = compare_frequencies(&dataset, "caste", &filter).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sorted_by_count_is_stable() {
        let mut table = FrequencyTable::new();
        for s in ["B", "A", "C", "A", "C", "D"] {
            table.add(Category::new(s));
        }
        let order: Vec<(String, u64)> = table
            .sorted_by_count()
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A".to_string(), 2),
                ("C".to_string(), 2),
                ("B".to_string(), 1),
                ("D".to_string(), 1)
            ]
        );
    }
}
