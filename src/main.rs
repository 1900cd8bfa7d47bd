use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

// 导入库模块
use graphdb_match::config::Config;
use graphdb_match::query::executor::match_path::Deadline;
use graphdb_match::utils::logging;
use graphdb_match::{DBError, DBResult, MatchEngine, MemoryGraphStore, Row};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// 每行一个 JSON 对象
    Json,
    /// 对齐的文本表格
    Table,
}

#[derive(Parser, Debug)]
#[clap(version = "0.1.0", author = "GraphDB Contributors")]
/// Run a MATCH query against a JSON graph snapshot
struct Cli {
    /// Graph snapshot (JSON)
    #[clap(short, long)]
    graph: PathBuf,

    /// Configuration file (TOML)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Query timeout in milliseconds, overrides the configuration
    #[clap(long)]
    timeout_ms: Option<u64>,

    #[clap(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Read the query from a file instead of the command line
    #[clap(short, long, conflicts_with = "query")]
    file: Option<PathBuf>,

    /// Print the execution plan before the results
    #[clap(long)]
    explain: bool,

    query: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(&cli);
    logging::shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> DBResult<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    logging::init(&config.log)?;

    let query = match (&cli.query, &cli.file) {
        (Some(query), _) => query.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            return Err(DBError::Config(
                "需要通过参数或 --file 提供查询".to_string(),
            ))
        }
    };

    let store = MemoryGraphStore::load_json_file(&cli.graph)?;
    log::info!(
        "图快照已装载: {} 个顶点, {} 条边",
        store.vertex_count(),
        store.edge_count()
    );

    let engine = MatchEngine::new(Arc::new(store), config.query.clone())?;
    let compiled = engine.prepare(query.trim())?;
    if cli.explain {
        for line in compiled.explain() {
            println!("-- {}", line);
        }
    }

    let timeout_ms = cli.timeout_ms.unwrap_or(config.query.timeout_ms);
    let stream = engine.execute_with_deadline(&compiled, Deadline::from_millis(timeout_ms))?;

    match cli.format {
        OutputFormat::Json => {
            for row in stream {
                println!("{}", row?.to_json());
            }
        }
        OutputFormat::Table => {
            let rows = stream.collect::<DBResult<Vec<_>>>()?;
            print!("{}", render_table(&rows));
        }
    }
    Ok(())
}

/// 以首行的列为表头；实体行输出其 JSON
fn render_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "(0 rows)\n".to_string();
    };
    let headers: Vec<String> = if first.is_element() {
        vec!["element".to_string()]
    } else {
        first.column_names().iter().map(|s| s.to_string()).collect()
    };
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| match &row.element {
            Some(element) => vec![element.to_json().to_string()],
            None => row.values().iter().map(|v| v.to_json().to_string()).collect(),
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in &cells {
        for (i, cell) in line.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_line = |items: &[String]| -> String {
        items
            .iter()
            .zip(&widths)
            .map(|(item, w)| format!("{:<width$}", item, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut out = String::new();
    out.push_str(&format_line(&headers));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for line in &cells {
        out.push_str(&format_line(line));
        out.push('\n');
    }
    out.push_str(&format!("({} rows)\n", rows.len()));
    out
}
