// ==========================================
// 目录系统 - 命令行导入工具
// ==========================================
// 用法:
//   catalogo-import <archivo> <marca> [departamento] [--db <ruta>] [--guardar]
//
// 输出: ImportResult（JSON，stdout）；--guardar 时追加落库汇总
// ==========================================

use catalogo_piezas::config::ConfigManager;
use catalogo_piezas::db::{
    default_db_path, init_schema, open_sqlite_connection, read_schema_version,
    CURRENT_SCHEMA_VERSION,
};
use catalogo_piezas::importer::{CatalogImporter, CatalogImporterImpl};
use catalogo_piezas::repository::PiezaRepository;
use catalogo_piezas::{logging, APP_NAME, VERSION};
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const USAGE: &str =
    "Uso: catalogo-import <archivo> <marca> [departamento] [--db <ruta>] [--guardar]";

struct CliArgs {
    file: PathBuf,
    marca: String,
    departamento: Option<String>,
    db_path: Option<PathBuf>,
    persist: bool,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut db_path = None;
    let mut persist = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = args.next().ok_or("--db requiere una ruta")?;
                db_path = Some(PathBuf::from(value));
            }
            "--guardar" => persist = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let file = positional.next().ok_or(USAGE)?;
    let marca = positional
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(USAGE)?;
    let departamento = positional.next().filter(|s| !s.trim().is_empty());

    Ok(CliArgs {
        file: PathBuf::from(file),
        marca,
        departamento,
        db_path,
        persist,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let db_path = args
        .db_path
        .or_else(default_db_path)
        .ok_or("no se pudo determinar la ruta de la base de datos (use --db)")?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(db = %db_path.display(), "usando base de datos");

    let conn = open_sqlite_connection(&db_path.to_string_lossy())?;
    init_schema(&conn)?;
    if let Some(version) = read_schema_version(&conn)? {
        if version != CURRENT_SCHEMA_VERSION {
            tracing::warn!(
                found = version,
                expected = CURRENT_SCHEMA_VERSION,
                "versión de esquema inesperada"
            );
        }
    }
    let conn = Arc::new(Mutex::new(conn));

    let importer = CatalogImporterImpl::new(
        PiezaRepository::from_connection(conn.clone()),
        ConfigManager::from_connection(conn),
    );

    let output = if args.persist {
        let (result, summary) = importer
            .import_and_persist(&args.file, &args.marca, args.departamento.as_deref())
            .await;
        json!({ "importacion": result, "guardado": summary })
    } else {
        let result = importer
            .import_file(&args.file, &args.marca, args.departamento.as_deref())
            .await;
        serde_json::to_value(result)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
