//! Human-readable descriptions of a parsed table schema.
//!
//! Pure formatting over a [`TableHeader`]: a plain text summary, a Markdown
//! table and a PostgreSQL `CREATE TABLE` statement.

use std::fmt::Write;
use super::types::error::{DbfError, Result};
use super::types::models::{FieldDescriptor, FieldType, TableHeader};

/// Output flavour of [`describe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescribeFormat {
    Text,
    Markdown,
}

/// Renders a summary of the header and its field list.
///
/// `name` labels the table, usually its file name.
pub fn describe(header: &TableHeader, name: &str, format: DescribeFormat) -> String {
    match format {
        DescribeFormat::Text => describe_text(header, name),
        DescribeFormat::Markdown => describe_markdown(header, name),
    }
}

fn describe_text(header: &TableHeader, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "FILE DEFINITION");
    let _ = writeln!(out, "filename: {}", name);
    let _ = writeln!(out, "header's length:   {}", header.header_length);
    let _ = writeln!(out, "number of fields:  {}", header.field_count());
    let _ = writeln!(out, "line size:         {}", header.record_size);
    let _ = writeln!(out);
    let _ = writeln!(out, "FIELDS");
    let _ = writeln!(out, "  (order,         name, type, size, decimals)");
    for field in &header.fields {
        let _ = writeln!(
            out,
            "   {:>5}, {:<12}, {:>4}, {:>4}, {:>8}",
            field.order, field.name, field.field_type, field.width, field.decimals
        );
    }
    out
}

fn describe_markdown(header: &TableHeader, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "### File {} description", name);
    let _ = writeln!(out);
    let _ = writeln!(out, "| info              | value   |");
    let _ = writeln!(out, "| ----------------- | ------- |");
    let _ = writeln!(out, "| header's length   | {:>7} |", header.header_length);
    let _ = writeln!(out, "| number of fields  | {:>7} |", header.field_count());
    let _ = writeln!(out, "| line size         | {:>7} |", header.record_size);
    let _ = writeln!(out);
    let _ = writeln!(out, "### Fields");
    let _ = writeln!(out);
    let _ = writeln!(out, "| order | name         | type | size | decimals |");
    let _ = writeln!(out, "| ----- | ------------ | ---- | ---- | -------- |");
    for field in &header.fields {
        let _ = writeln!(
            out,
            "| {:>5} | {:<12} | {:>4} | {:>4} | {:>8} |",
            field.order, field.name, field.field_type, field.width, field.decimals
        );
    }
    out
}

/// PostgreSQL column type for a field.
///
/// Integer numerics wider than 18 digits do not fit `bigint` and fail.
pub fn pg_field_type(field: &FieldDescriptor) -> Result<String> {
    let pg_type = match field.field_type {
        FieldType::Numeric if field.decimals > 0 => format!("numeric({}, {})", field.width, field.decimals),
        FieldType::Numeric => match field.width {
            0..=4 => "smallint".to_string(),
            5..=9 => "integer".to_string(),
            10..=18 => "bigint".to_string(),
            width => {
                return Err(DbfError::UnrepresentableField { name: field.name.clone(), width });
            }
        },
        FieldType::Date => "date".to_string(),
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Text => format!("character varying({})", field.width),
    };
    Ok(pg_type)
}

/// Renders `CREATE SCHEMA` and `CREATE TABLE` statements for the table.
///
/// Column names are lowercased; every column is nullable.
pub fn postgres_ddl(header: &TableHeader, schema: &str, table: &str) -> Result<String> {
    let columns = header
        .fields
        .iter()
        .map(|field| {
            let pg_type = pg_field_type(field)?;
            Ok(format!("  {:<12} {:<21} NULL", field.name.to_lowercase(), pg_type))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "CREATE SCHEMA IF NOT EXISTS {schema};\n\nCREATE TABLE IF NOT EXISTS {schema}.{table} (\n{}\n);",
        columns.join(",\n")
    ))
}
