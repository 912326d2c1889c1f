use anyhow::Result;

use retail_cli::app::{CleanRequest, RunRequest, RunResult, clean_file, list_tables, run_pipeline};
use retail_cli::summary::{apply_table_style, domains_table, print_run_summary, report_table};
use retail_core::default_registry;

use crate::cli::{CleanArgs, ListTablesArgs, RunArgs};

pub fn run_jobs(args: &RunArgs) -> Result<RunResult> {
    let request = RunRequest {
        config: args.config.clone(),
        domains: args.domains.clone(),
        sequential: args.sequential,
        dry_run: args.dry_run,
    };
    let result = run_pipeline(&request)?;
    print_run_summary(&result);
    Ok(result)
}

pub fn run_clean(args: &CleanArgs) -> Result<()> {
    let request = CleanRequest {
        domain: args.domain,
        input: args.input.clone(),
        format: args.document_format(),
        output: args.output.clone(),
        rules: args.rules.clone(),
        date_order: args.date_order(),
    };
    let (outcome, output) = clean_file(&request)?;
    println!("Output: {}", output.display());
    println!("{}", report_table(&outcome.report));
    Ok(())
}

pub fn run_domains() -> Result<()> {
    println!("{}", domains_table(default_registry()));
    Ok(())
}

pub fn run_list_tables(args: &ListTablesArgs) -> Result<()> {
    let tables = list_tables(&args.credentials)?;
    let mut table = comfy_table::Table::new();
    table.set_header(vec!["Table"]);
    apply_table_style(&mut table);
    for name in tables {
        table.add_row(vec![name]);
    }
    println!("{table}");
    Ok(())
}
