// ==========================================
// 导入落库集成测试
// ==========================================
// 测试目标: 草稿逐条落库 / 单条超时与失败隔离
// ==========================================

mod test_helpers;

use catalogo_piezas::config::ImportSettings;
use catalogo_piezas::domain::{Pieza, PiezaDraft, ProductFilters};
use catalogo_piezas::importer::{CatalogImporter, CatalogImporterImpl};
use catalogo_piezas::logging;
use catalogo_piezas::repository::{
    CatalogImportRepository, PiezaRepository, RepositoryError, RepositoryResult,
};
use chrono::Utc;
use std::sync::Mutex;
use std::time::Duration;
use test_helpers::{create_test_db, shared_connection, write_csv};

// ==========================================
// Mock 仓储
// ==========================================

/// 按名称决定行为：含 "lento" 的草稿阻塞，含 "falla" 的草稿报错
#[derive(Default)]
struct ScriptedRepository {
    calls: Mutex<Vec<String>>,
}

impl CatalogImportRepository for ScriptedRepository {
    fn insert_draft(&self, draft: &PiezaDraft) -> RepositoryResult<Pieza> {
        self.calls.lock().unwrap().push(draft.id.clone());

        let nombre = draft.nombre.to_lowercase();
        if nombre.contains("lento") {
            std::thread::sleep(Duration::from_millis(300));
        }
        if nombre.contains("falla") {
            return Err(RepositoryError::DatabaseQueryError("disco lleno".to_string()));
        }

        let now = Utc::now();
        Ok(Pieza {
            id: format!("db-{}", draft.id),
            nombre: draft.nombre.clone(),
            descripcion: draft.descripcion.clone(),
            imagen: draft.imagen.clone(),
            precio: draft.precio,
            marca: draft.marca.clone(),
            codigo_barras: draft.codigo_barras.clone(),
            clave: draft.clave.clone(),
            departamento: draft.departamento.clone(),
            unidad_venta: draft.unidad_venta.clone(),
            medida: draft.medida.clone(),
            precio_metro: draft.precio_metro,
            metros_por_caja: draft.metros_por_caja,
            fecha_creacion: now,
            fecha_actualizacion: now,
        })
    }
}

fn draft(id: &str, nombre: &str) -> PiezaDraft {
    PiezaDraft {
        id: id.to_string(),
        nombre: nombre.to_string(),
        descripcion: None,
        imagen: "img".to_string(),
        precio: 10.0,
        marca: "Truper".to_string(),
        codigo_barras: None,
        clave: None,
        departamento: "ferreteria".to_string(),
        unidad_venta: "Pieza".to_string(),
        medida: None,
        precio_metro: None,
        metros_por_caja: None,
    }
}

#[tokio::test]
async fn test_import_and_persist_into_sqlite() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let conn = shared_connection(&db_path);

    let importer = CatalogImporterImpl::new(
        PiezaRepository::from_connection(conn.clone()),
        ImportSettings::default(),
    );
    let csv = write_csv("CODIGO,NOMBRE,PRECIO PUBLICO\nT100,PINZAS DE CORTE,89.50\nT200,MARTILLO,150\n");

    let (result, summary) = importer.import_and_persist(csv.path(), "Truper", None).await;

    assert!(result.success);
    let summary = summary.expect("debe guardar cuando la importación es válida");
    assert_eq!(summary.inserted_count(), 2);
    assert!(summary.errors.is_empty());

    let repo = PiezaRepository::from_connection(conn);
    let pinzas = repo.search_by_code("T100").unwrap().unwrap();
    assert_eq!(pinzas.nombre, "Pinzas De Corte");
    assert!(!pinzas.id.starts_with("import_"));

    let page = repo
        .list_paginated(
            1,
            10,
            &ProductFilters {
                marca: Some("Truper".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn test_failed_import_is_not_persisted() {
    let importer = CatalogImporterImpl::new(ScriptedRepository::default(), ImportSettings::default());
    let csv = write_csv("CLAVE,PRECIO\nA-1,10\n");

    let (result, summary) = importer.import_and_persist(csv.path(), "Truper", None).await;

    assert!(!result.success);
    assert!(summary.is_none());
}

#[tokio::test]
async fn test_persist_timeout_and_failure_do_not_stop_the_batch() {
    let importer = CatalogImporterImpl::new(
        ScriptedRepository::default(),
        ImportSettings::default().with_persist_timeout_ms(50),
    );
    let drafts = vec![
        draft("import_1_0", "Martillo"),
        draft("import_1_1", "Taladro lento"),
        draft("import_1_2", "Pinzas falla"),
        draft("import_1_3", "Llave"),
    ];

    let summary = importer.persist_drafts(&drafts).await;

    let inserted: Vec<&str> = summary.inserted.iter().map(|p| p.nombre.as_str()).collect();
    assert_eq!(inserted, vec!["Martillo", "Llave"]);
    assert_eq!(summary.errors.len(), 2);
    assert_eq!(
        summary.errors[0],
        "Pieza import_1_1: Tiempo de espera agotado al guardar (50 ms)"
    );
    assert!(summary.errors[1].starts_with("Pieza import_1_2: Error al guardar"));
}

#[tokio::test]
async fn test_drafts_are_persisted_in_order() {
    let repo = ScriptedRepository::default();
    let importer = CatalogImporterImpl::new(repo, ImportSettings::default());
    let drafts: Vec<PiezaDraft> = (0..5)
        .map(|i| draft(&format!("import_9_{}", i), "Clavo"))
        .collect();

    let summary = importer.persist_drafts(&drafts).await;

    let ids: Vec<String> = summary.inserted.iter().map(|p| p.id.clone()).collect();
    let expected: Vec<String> = (0..5).map(|i| format!("db-import_9_{}", i)).collect();
    assert_eq!(ids, expected);
}
