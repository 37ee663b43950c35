//! Input validation against column types.
//!
//! | input kind | accepted iff                       |
//! |------------|------------------------------------|
//! | Integer    | declared type is `Integer`         |
//! | Text       | declared type is `Text`            |
//! | Float      | declared type is `FloatingPoint`   |
//! | Null       | column is nullable                 |
//! | Bool       | never                              |
//!
//! Validation of a whole record is total: every supplied column is checked
//! and all violations are reported together, before any SQL is built.

use crate::core::schema::{ColumnSchema, DeclaredType, TableSchema};
use crate::core::value::{Record, Value};
use crate::error::{ExplorerError, Result, Violation};

/// Which write is being validated; decides how the primary key is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Primary key in the body is ignored.
    Create,
    /// Primary key in the body is an [`Violation::ImmutableColumn`].
    Update,
}

/// Check one value against one column.
pub fn check_value(column: &ColumnSchema, value: &Value) -> std::result::Result<(), Violation> {
    let accepted = match value {
        Value::Integer(_) => column.declared_type == DeclaredType::Integer,
        Value::Text(_) => column.declared_type == DeclaredType::Text,
        Value::Float(_) => column.declared_type == DeclaredType::FloatingPoint,
        Value::Null => column.nullable,
        Value::Bool(_) => false,
    };

    if accepted {
        Ok(())
    } else {
        Err(Violation::TypeMismatch {
            column: column.name.as_str().to_string(),
            expected: expected_for(column),
            found: value.kind_name(),
        })
    }
}

fn expected_for(column: &ColumnSchema) -> String {
    if column.nullable {
        format!("{} or null", column.declared_type)
    } else {
        column.declared_type.to_string()
    }
}

/// Validate a record and return the accepted cells paired with their
/// columns, in column-name order.
///
/// Unknown columns are skipped. In [`WriteMode::Create`] the primary key is
/// skipped as well; in [`WriteMode::Update`] it is a violation.
pub fn validate_record<'t>(
    table: &'t TableSchema,
    record: &Record,
    mode: WriteMode,
) -> Result<Vec<(&'t ColumnSchema, Value)>> {
    let mut accepted = Vec::with_capacity(record.len());
    let mut violations = Vec::new();

    for (name, value) in record {
        let Some(column) = table.column(name) else {
            continue;
        };

        if column.is_primary_key {
            match mode {
                WriteMode::Create => continue,
                WriteMode::Update => {
                    violations.push(Violation::ImmutableColumn {
                        column: name.clone(),
                    });
                    continue;
                }
            }
        }

        match check_value(column, value) {
            Ok(()) => accepted.push((column, value.clone())),
            Err(v) => violations.push(v),
        }
    }

    if mode == WriteMode::Create {
        for column in table.columns.iter().filter(|c| c.requires_value()) {
            if record.contains_key(column.name.as_str()) {
                continue;
            }
            match column.declared_type.zero_value() {
                Some(zero) => accepted.push((column, zero)),
                None => violations.push(Violation::MissingRequiredColumn {
                    column: column.name.as_str().to_string(),
                }),
            }
        }
    }

    if violations.is_empty() {
        Ok(accepted)
    } else {
        Err(ExplorerError::Validation {
            table: table.name.as_str().to_string(),
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::Ident;

    fn col(name: &str, raw: &str, nullable: bool, ordinal: u32) -> ColumnSchema {
        ColumnSchema {
            name: Ident::trusted(name).unwrap(),
            raw_type: raw.into(),
            declared_type: DeclaredType::from_raw(raw),
            nullable,
            has_default: false,
            is_primary_key: false,
            ordinal,
        }
    }

    fn table() -> TableSchema {
        let mut id = col("id", "int(11)", false, 1);
        id.is_primary_key = true;
        let mut created = col("created_at", "datetime", false, 5);
        created.has_default = true;
        TableSchema::new(
            Ident::trusted("items").unwrap(),
            vec![
                id,
                col("title", "varchar(100)", false, 2),
                col("qty", "int(11)", false, 3),
                col("price", "double", true, 4),
                created,
            ],
        )
    }

    fn record(cells: &[(&str, Value)]) -> Record {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_rule_table() {
        let int_col = col("n", "int", false, 1);
        let text_col = col("s", "text", true, 1);
        let float_col = col("f", "float", false, 1);

        assert!(check_value(&int_col, &Value::Integer(1)).is_ok());
        assert!(check_value(&int_col, &Value::from("1")).is_err());
        assert!(check_value(&int_col, &Value::Float(1.0)).is_err());
        assert!(check_value(&int_col, &Value::Null).is_err());

        assert!(check_value(&text_col, &Value::from("x")).is_ok());
        assert!(check_value(&text_col, &Value::Null).is_ok());
        assert!(check_value(&text_col, &Value::Integer(1)).is_err());

        assert!(check_value(&float_col, &Value::Float(1.5)).is_ok());
        assert!(check_value(&float_col, &Value::Integer(1)).is_err());

        for c in [&int_col, &text_col, &float_col] {
            assert!(check_value(c, &Value::Bool(true)).is_err());
        }
    }

    #[test]
    fn test_type_mismatch_names_column() {
        let err = check_value(&col("qty", "int", false, 1), &Value::from("ten")).unwrap_err();
        assert_eq!(err.column(), "qty");
        assert!(err.to_string().contains("expected integer, got string"));
    }

    #[test]
    fn test_create_synthesizes_defaults() {
        let t = table();
        let cells = validate_record(&t, &record(&[]), WriteMode::Create).unwrap();
        let names: Vec<_> = cells.iter().map(|(c, v)| (c.name.as_str(), v.clone())).collect();
        // price is nullable, created_at has a default, id is the pk
        assert_eq!(
            names,
            vec![("title", Value::from("")), ("qty", Value::Integer(0))]
        );
    }

    #[test]
    fn test_create_ignores_pk_and_unknown_columns() {
        let t = table();
        let cells = validate_record(
            &t,
            &record(&[
                ("id", Value::from("not even an int")),
                ("bogus", Value::Bool(true)),
                ("title", Value::from("Widget")),
                ("qty", Value::Integer(3)),
            ]),
            WriteMode::Create,
        )
        .unwrap();
        let names: Vec<_> = cells.iter().map(|(c, _)| c.name.as_str()).collect();
        assert_eq!(names, ["qty", "title"]);
    }

    #[test]
    fn test_create_other_type_cannot_be_defaulted() {
        let base = table();
        let mut cols = base.columns.clone();
        cols.push(col("payload", "blob", false, 6));
        let t = TableSchema::new(base.name.clone(), cols);
        let err = validate_record(&t, &record(&[]), WriteMode::Create).unwrap_err();
        assert_eq!(
            err.violations(),
            [Violation::MissingRequiredColumn {
                column: "payload".into()
            }]
        );
    }

    #[test]
    fn test_violations_are_aggregated() {
        let t = table();
        let err = validate_record(
            &t,
            &record(&[
                ("title", Value::Integer(1)),
                ("qty", Value::Null),
                ("price", Value::Bool(false)),
            ]),
            WriteMode::Create,
        )
        .unwrap_err();
        let cols: Vec<_> = err.violations().iter().map(Violation::column).collect();
        assert_eq!(cols, ["price", "qty", "title"]);
    }

    #[test]
    fn test_update_rejects_pk() {
        let t = table();
        let err = validate_record(
            &t,
            &record(&[("id", Value::Integer(5)), ("qty", Value::Integer(1))]),
            WriteMode::Update,
        )
        .unwrap_err();
        assert_eq!(
            err.violations(),
            [Violation::ImmutableColumn { column: "id".into() }]
        );
    }

    #[test]
    fn test_update_does_not_synthesize_defaults() {
        let t = table();
        let cells =
            validate_record(&t, &record(&[("price", Value::Null)]), WriteMode::Update).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].1, Value::Null);
    }
}
