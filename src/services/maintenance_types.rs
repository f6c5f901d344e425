//! Lista de tipos de manutención sugeridos
//!
//! Se carga una vez al arrancar desde un JSON `{"types": [...]}`. Si el
//! archivo falta o no tiene ese formato se usa la lista integrada.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_MAINTENANCE_TYPES: &[&str] = &["Altro", "Controllo", "Collaudo"];

#[derive(Debug, Deserialize)]
struct MaintenanceTypesFile {
    types: Vec<String>,
}

/// Ordena sin distinguir mayúsculas, elimina vacíos y duplicados
pub fn normalize_types<I>(types: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut types: Vec<String> = types
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    types.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    types.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    types
}

pub fn default_types() -> Vec<String> {
    normalize_types(DEFAULT_MAINTENANCE_TYPES.iter().map(|t| t.to_string()))
}

async fn read_types_file(path: &Path) -> Result<Vec<String>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file: MaintenanceTypesFile =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(file.types)
}

/// Carga los tipos desde `path`; sin archivo o con error devuelve la lista integrada
pub async fn load_maintenance_types(path: Option<&Path>) -> Vec<String> {
    let Some(path) = path else {
        return default_types();
    };

    match read_types_file(path).await {
        Ok(types) => {
            let types = normalize_types(types);
            if types.is_empty() {
                warn!("⚠️ {} no contiene tipos, usando la lista por defecto", path.display());
                return default_types();
            }
            info!("📋 {} tipos de manutención cargados", types.len());
            types
        }
        Err(e) => {
            warn!("⚠️ No se pudieron cargar los tipos de manutención: {:#}", e);
            default_types()
        }
    }
}
