use crate::error::CliError;
use engine_core::report::RunReport;
use planner::query::renderer::Statement;
use std::path::Path;

pub fn print_report(report: &RunReport) {
    println!("{report}");
}

pub fn write_report(report: &RunReport, path: &Path) -> Result<(), CliError> {
    report
        .write_json(path)
        .map_err(|source| CliError::ReportWrite {
            path: path.to_path_buf(),
            source,
        })
}

pub fn print_statements(statements: &[(&str, Statement)], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json: Vec<serde_json::Value> = statements
            .iter()
            .map(|(name, stmt)| {
                serde_json::json!({ "name": name, "sql": stmt.sql, "params": stmt.params })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    for (name, stmt) in statements {
        println!("{name:<8} {}", stmt.sql);
        if !stmt.params.is_empty() {
            println!("{:<8} params: {:?}", "", stmt.params);
        }
    }
    Ok(())
}
