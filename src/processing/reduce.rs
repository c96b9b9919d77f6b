//! Single-column reductions for [`crate::types::DataSet`].

use crate::types::{DataSet, DataType, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Minimum numeric value, ignoring nulls.
    Min,
    /// Maximum numeric value, ignoring nulls.
    Max,
    /// Arithmetic mean of numeric values, ignoring nulls.
    Mean,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// Numeric ops read integers, floats and numeric text (see [`Value::as_f64`]); other values are
/// skipped.
///
/// - Returns `None` if `column` does not exist in the schema.
/// - For `Sum`/`Min`/`Max`/`Mean`, returns `Some(Value::Null)` if there are no numeric values.
/// - `Sum`/`Min`/`Max` over an `Int64` column stay `Int64`; everything else is `Float64`.
/// - For `Count`, always returns `Some(Value::Int64(row_count))`.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<Value> {
    let idx = dataset.schema.index_of(column)?;

    if op == ReduceOp::Count {
        return Some(Value::Int64(dataset.row_count() as i64));
    }
    if op != ReduceOp::Mean && dataset.schema.fields[idx].data_type == DataType::Int64 {
        return Some(reduce_integer(dataset, idx, op));
    }

    let mut acc: Option<f64> = None;
    let mut n = 0usize;
    for value in dataset.rows.iter().filter_map(|row| row.get(idx)?.as_f64()) {
        n += 1;
        acc = Some(match (op, acc) {
            (ReduceOp::Min, Some(a)) => a.min(value),
            (ReduceOp::Max, Some(a)) => a.max(value),
            (_, Some(a)) => a + value,
            (_, None) => value,
        });
    }

    let out = match (op, acc) {
        (_, None) => Value::Null,
        (ReduceOp::Mean, Some(sum)) => Value::Float64(sum / n as f64),
        (_, Some(v)) => Value::Float64(v),
    };
    Some(out)
}

/// `Sum`/`Min`/`Max` over an `Int64` column, in `i64`.
///
/// A sum that overflows `i64` is reported as `Float64`.
fn reduce_integer(dataset: &DataSet, idx: usize, op: ReduceOp) -> Value {
    let mut acc: Option<i64> = None;
    let mut overflow: Option<f64> = None;
    for row in &dataset.rows {
        let v = match row.get(idx) {
            Some(Value::Int64(v)) => *v,
            Some(other) => match other.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
                _ => continue,
            },
            None => continue,
        };
        if let Some(total) = overflow.as_mut() {
            *total += v as f64;
            continue;
        }
        acc = Some(match (op, acc) {
            (ReduceOp::Min, Some(a)) => a.min(v),
            (ReduceOp::Max, Some(a)) => a.max(v),
            (_, Some(a)) => match a.checked_add(v) {
                Some(sum) => sum,
                None => {
                    overflow = Some(a as f64 + v as f64);
                    a
                }
            },
            (_, None) => v,
        });
    }

    match (overflow, acc) {
        (Some(total), _) => Value::Float64(total),
        (None, Some(v)) => Value::Int64(v),
        (None, None) => Value::Null,
    }
}
