use std::cmp::Ordering;
use crate::utils::{
    types::{Label, Table, Value},
    error::{FrameResult, KernelError},
};

/// Sum of each column. Integer columns stay integral, nulls are skipped.
///
/// Kernels work on the logical [`Table`], so every backend shares them.
pub fn sum(table: &Table) -> FrameResult<Vec<Value>> {
    table
        .data
        .iter()
        .zip(&table.columns)
        .map(|(column, label)| sum_values(column, label))
        .collect()
}

fn sum_values(values: &[Value], label: &Label) -> FrameResult<Value> {
    let mut int_total: i64 = 0;
    let mut float_total: f64 = 0.0;
    let mut saw_float = false;

    for value in values {
        match value {
            Value::Integer(i) => int_total = checked_total(int_total, *i, label)?,
            Value::Float(f) => {
                float_total += f;
                saw_float = true;
            }
            Value::Boolean(b) => int_total = checked_total(int_total, i64::from(*b), label)?,
            Value::Null => {}
            Value::Text(_) => {
                return Err(KernelError::Unsupported(format!("cannot sum text column '{}'", label)).into());
            }
        }
    }

    if saw_float {
        Ok(Value::Float(float_total + int_total as f64))
    } else {
        Ok(Value::Integer(int_total))
    }
}

fn checked_total(total: i64, value: i64, label: &Label) -> FrameResult<i64> {
    total
        .checked_add(value)
        .ok_or_else(|| KernelError::InvalidArgument(format!("sum of column '{}' overflows i64", label)).into())
}

/// Number of non-null values in each column
pub fn count(table: &Table) -> Vec<Value> {
    table
        .data
        .iter()
        .map(|column| Value::Integer(column.iter().filter(|v| !v.is_null()).count() as i64))
        .collect()
}

/// Arithmetic mean of each column, `Null` for columns without values
pub fn mean(table: &Table) -> FrameResult<Vec<Value>> {
    let sums = sum(table)?;
    let counts = count(table);
    Ok(sums
        .into_iter()
        .zip(counts)
        .map(|(total, n)| match (total.as_f64(), n.as_i64()) {
            (Some(total), Some(n)) if n > 0 => Value::Float(total / n as f64),
            _ => Value::Null,
        })
        .collect())
}

/// Stable sort of all rows by one column
pub fn sort_values(table: &Table, by: &Label, ascending: bool) -> FrameResult<Table> {
    let key = table
        .column(by)
        .ok_or_else(|| KernelError::MissingColumn(by.to_string()))?;

    let mut order: Vec<usize> = (0..table.num_rows()).collect();
    order.sort_by(|&a, &b| {
        let (x, y) = (&key[a], &key[b]);
        // nulls stay last in both directions
        match (x.is_null(), y.is_null()) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ if ascending => x.compare(y),
            _ => y.compare(x),
        }
    });

    take_rows(table, &order)
}

/// The first `n` rows
pub fn head(table: &Table, n: usize) -> FrameResult<Table> {
    let order: Vec<usize> = (0..table.num_rows().min(n)).collect();
    take_rows(table, &order)
}

fn take_rows(table: &Table, order: &[usize]) -> FrameResult<Table> {
    let index = order.iter().map(|&i| table.index[i].clone()).collect();
    let data = table
        .data
        .iter()
        .map(|column| order.iter().map(|&i| column[i].clone()).collect())
        .collect();
    Table::with_index(table.columns.clone(), index, data)
}

/// Text rendering of a two-dimensional table
pub fn format_frame(table: &Table) -> String {
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.num_rows() + 1);
    let mut header = vec![String::new()];
    header.extend(table.columns.iter().map(Label::to_string));
    grid.push(header);
    for (position, label) in table.index.iter().enumerate() {
        let mut line = vec![label.to_string()];
        line.extend(table.data.iter().map(|column| column[position].to_string()));
        grid.push(line);
    }

    let mut output = render_grid(&grid);
    output.push_str(&format!(
        "\n[{} rows x {} columns]",
        table.num_rows(),
        table.num_columns()
    ));
    output
}

/// Text rendering of a one-column table as a series
pub fn format_series(table: &Table) -> String {
    let values = table.data.first().map(Vec::as_slice).unwrap_or(&[]);
    let grid: Vec<Vec<String>> = table
        .index
        .iter()
        .zip(values)
        .map(|(label, value)| vec![label.to_string(), value.to_string()])
        .collect();

    let mut output = render_grid(&grid);
    if !output.is_empty() {
        output.push('\n');
    }
    match table.columns.first() {
        Some(name) => output.push_str(&format!("Name: {}, Length: {}", name, table.num_rows())),
        None => output.push_str(&format!("Length: {}", table.num_rows())),
    }
    output
}

fn render_grid(grid: &[Vec<String>]) -> String {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; width];
    for line in grid {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    grid.iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i == 0 {
                        format!("{:<width$}", cell, width = widths[i])
                    } else {
                        format!("{:>width$}", cell, width = widths[i])
                    }
                })
                .collect::<Vec<String>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec![Label::from("a"), Label::from("b")],
            vec![
                vec![Value::Integer(3), Value::Float(0.5)],
                vec![Value::Integer(1), Value::Null],
                vec![Value::Integer(2), Value::Float(1.5)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_sum_keeps_integers() {
        assert_eq!(sum(&sample()).unwrap(), vec![Value::Integer(6), Value::Float(2.0)]);
    }

    #[test]
    fn test_sum_rejects_text() {
        let table = Table::from_values(vec![Value::from("x")]);
        assert!(sum(&table).is_err());
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        use crate::utils::error::FrameError;

        let table = Table::from_values(vec![Value::Integer(i64::MAX), Value::Integer(1)]);
        assert!(matches!(
            sum(&table),
            Err(FrameError::Kernel(KernelError::InvalidArgument(_)))
        ));

        let table = Table::from_values(vec![Value::Integer(i64::MAX), Value::Boolean(true)]);
        assert!(sum(&table).is_err());
    }

    #[test]
    fn test_count_skips_nulls() {
        assert_eq!(count(&sample()), vec![Value::Integer(3), Value::Integer(2)]);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&sample()).unwrap(), vec![Value::Float(2.0), Value::Float(1.0)]);
    }

    #[test]
    fn test_sort_values_both_directions() {
        let table = sample();
        let ascending = sort_values(&table, &Label::from("a"), true).unwrap();
        assert_eq!(ascending.column(&Label::from("a")).unwrap(), &[Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(ascending.index, vec![Label::Int(1), Label::Int(2), Label::Int(0)]);

        let descending = sort_values(&table, &Label::from("b"), false).unwrap();
        assert_eq!(descending.column(&Label::from("b")).unwrap(), &[Value::Float(1.5), Value::Float(0.5), Value::Null]);
    }

    #[test]
    fn test_sort_values_missing_column() {
        assert!(sort_values(&sample(), &Label::from("zzz"), true).is_err());
    }

    #[test]
    fn test_head() {
        let table = head(&sample(), 2).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(head(&sample(), 10).unwrap().num_rows(), 3);
    }

    #[test]
    fn test_format_frame() {
        let rendered = format_frame(&Table::from_values(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(rendered, "   0\n0  1\n1  2\n[2 rows x 1 columns]");
    }

    #[test]
    fn test_format_series() {
        let table = Table::new(vec![Label::from("x")], vec![vec![Value::Integer(7)]]).unwrap();
        assert_eq!(format_series(&table), "0  7\nName: x, Length: 1");
    }
}
