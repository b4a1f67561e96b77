// ==========================================
// 加算判定引擎 - 加算目录加载器
// ==========================================
// 输入: JSON 目录文档（law_revisions / definitions / versions）
// 红线: 结构性错误在此处拒绝（致命）；open 版本数异常只记 warn，判定时作为异常输出
// ==========================================

use crate::domain::catalog::AdditionCatalog;
use crate::engine::rule_resolver::TemporalRuleResolver;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub struct CatalogLoader;

impl CatalogLoader {
    /// 从 JSON 文件加载并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> ImportResult<AdditionCatalog> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> ImportResult<AdditionCatalog> {
        let catalog: AdditionCatalog = serde_json::from_str(raw)?;
        Self::validate(&catalog)?;
        info!(
            definitions = catalog.definitions.len(),
            versions = catalog.versions.len(),
            "加算目录加载完成"
        );
        Ok(catalog)
    }

    /// 结构校验
    ///
    /// # 错误
    /// - 加算代码 / 版本ID / 法改正ID 重复
    /// - 同一加算内版本号重复
    /// - 版本引用未定义的加算或法改正
    /// - effective_to < effective_from
    pub fn validate(catalog: &AdditionCatalog) -> ImportResult<()> {
        let mut revision_ids = HashSet::new();
        for revision in &catalog.law_revisions {
            if !revision_ids.insert(revision.revision_id.as_str()) {
                return Err(duplicate("法改正ID", &revision.revision_id));
            }
        }

        let mut codes = HashSet::new();
        for definition in &catalog.definitions {
            if !codes.insert(definition.code.as_str()) {
                return Err(duplicate("加算代码", &definition.code));
            }
        }

        let mut version_ids = HashSet::new();
        let mut version_numbers = HashSet::new();
        for version in &catalog.versions {
            if !version_ids.insert(version.version_id.as_str()) {
                return Err(duplicate("版本ID", &version.version_id));
            }
            if !version_numbers.insert((version.addition_code.as_str(), version.version_number)) {
                return Err(duplicate(
                    "版本号",
                    &format!("{}#{}", version.addition_code, version.version_number),
                ));
            }
            if !codes.contains(version.addition_code.as_str()) {
                return Err(ImportError::UnknownDefinition {
                    version_id: version.version_id.clone(),
                    addition_code: version.addition_code.clone(),
                });
            }
            if let Some(to) = version.effective_to {
                if to < version.effective_from {
                    return Err(ImportError::InvalidEffectiveRange {
                        version_id: version.version_id.clone(),
                        effective_from: version.effective_from.to_string(),
                        effective_to: to.to_string(),
                    });
                }
            }
            if let Some(revision_id) = &version.revision_id {
                if !revision_ids.contains(revision_id.as_str()) {
                    return Err(ImportError::UnknownRevision {
                        version_id: version.version_id.clone(),
                        revision_id: revision_id.clone(),
                    });
                }
            }
        }

        for anomaly in TemporalRuleResolver::check_open_versions(catalog) {
            warn!(anomaly = %anomaly, "加算目录 open 版本数异常");
        }

        Ok(())
    }
}

fn duplicate(kind: &str, value: &str) -> ImportError {
    ImportError::DuplicateKey {
        kind: kind.to_string(),
        value: value.to_string(),
    }
}
